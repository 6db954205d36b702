//! Typed response contracts for classification and answers.
//!
//! Everything the engine hands back to a caller is validated at
//! construction. Out-of-range values are rejected, never clamped, and
//! model output is parsed into payload structs that cannot carry
//! engine-stamped fields like `generated_at`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::SchemaError;

// ── Confidence ──────────────────────────────────────────────────────

/// A model self-assessment in the closed interval `[0.0, 1.0]`.
///
/// Construction and deserialization go through the same bounds check;
/// `Confidence::new(1.5)` is an error, not `1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Confidence(f64);

impl Confidence {
    /// The marker used by failure answers.
    pub const ZERO: Confidence = Confidence(0.0);

    pub fn new(value: f64) -> Result<Self, SchemaError> {
        if value.is_nan() || !(0.0..=1.0).contains(&value) {
            return Err(SchemaError::ConfidenceOutOfRange(value));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Confidence {
    type Error = SchemaError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Confidence> for f64 {
    fn from(c: Confidence) -> f64 {
        c.0
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

// ── Intent classification ───────────────────────────────────────────

/// The closed set of intents the classifier can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntentLabel {
    Qa,
    Summarization,
    Calculation,
    Unknown,
}

impl IntentLabel {
    /// Lenient parse: any string outside the known set maps to `Unknown`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "qa" => Self::Qa,
            "summarization" => Self::Summarization,
            "calculation" => Self::Calculation,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Qa => "qa",
            Self::Summarization => "summarization",
            Self::Calculation => "calculation",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for IntentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The classifier's verdict for one turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intent {
    pub label: IntentLabel,
    pub confidence: Confidence,
    pub rationale: String,
}

impl Intent {
    pub fn new(
        label: IntentLabel,
        confidence: f64,
        rationale: impl Into<String>,
    ) -> Result<Self, SchemaError> {
        Ok(Self {
            label,
            confidence: Confidence::new(confidence)?,
            rationale: rationale.into(),
        })
    }
}

// ── Answer objects ──────────────────────────────────────────────────

/// The base answer shape, and the full shape for qa turns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerResponse {
    /// The original user question, engine-supplied
    pub question: String,

    /// The answer text
    pub answer: String,

    /// Source ids cited by the answer, in citation order. Duplicates
    /// are allowed; a source cited twice appears twice.
    #[serde(default)]
    pub sources: Vec<String>,

    pub confidence: Confidence,

    /// Stamped by the handler when the answer is composed. Never
    /// accepted from model output or callers.
    pub generated_at: DateTime<Utc>,
}

/// Answer shape for calculation turns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationResponse {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<String>,
    pub confidence: Confidence,
    pub generated_at: DateTime<Utc>,

    /// The arithmetic expression that was evaluated
    pub expression: String,

    /// The evaluated result as text
    pub result: String,

    /// How the result was obtained
    pub explanation: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// Answer shape for summarization turns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizationResponse {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<String>,
    pub confidence: Confidence,
    pub generated_at: DateTime<Utc>,

    /// The condensed summary text
    pub summary: String,

    #[serde(default)]
    pub key_points: Vec<String>,

    /// Ids of the documents that were summarized
    #[serde(default)]
    pub document_ids: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_length: Option<u64>,
}

/// One validated answer, shaped by the intent that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Answer {
    Qa(AnswerResponse),
    Calculation(CalculationResponse),
    Summarization(SummarizationResponse),
}

impl Answer {
    pub fn question(&self) -> &str {
        match self {
            Self::Qa(a) => &a.question,
            Self::Calculation(a) => &a.question,
            Self::Summarization(a) => &a.question,
        }
    }

    /// The answer text shown to the user.
    pub fn text(&self) -> &str {
        match self {
            Self::Qa(a) => &a.answer,
            Self::Calculation(a) => &a.answer,
            Self::Summarization(a) => &a.answer,
        }
    }

    pub fn sources(&self) -> &[String] {
        match self {
            Self::Qa(a) => &a.sources,
            Self::Calculation(a) => &a.sources,
            Self::Summarization(a) => &a.sources,
        }
    }

    pub fn confidence(&self) -> Confidence {
        match self {
            Self::Qa(a) => a.confidence,
            Self::Calculation(a) => a.confidence,
            Self::Summarization(a) => a.confidence,
        }
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        match self {
            Self::Qa(a) => a.generated_at,
            Self::Calculation(a) => a.generated_at,
            Self::Summarization(a) => a.generated_at,
        }
    }

    /// Required-text rules, applied after composition. Numeric bounds
    /// are already enforced by [`Confidence`]; this rejects empty text
    /// in the fields each shape marks required.
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.text().trim().is_empty() {
            return Err(SchemaError::EmptyField("answer"));
        }
        match self {
            Self::Qa(_) => {}
            Self::Calculation(a) => {
                if a.expression.trim().is_empty() {
                    return Err(SchemaError::EmptyField("expression"));
                }
                if a.result.trim().is_empty() {
                    return Err(SchemaError::EmptyField("result"));
                }
                if a.explanation.trim().is_empty() {
                    return Err(SchemaError::EmptyField("explanation"));
                }
            }
            Self::Summarization(a) => {
                if a.summary.trim().is_empty() {
                    return Err(SchemaError::EmptyField("summary"));
                }
            }
        }
        Ok(())
    }
}

// ── Model-facing payloads ───────────────────────────────────────────
//
// What the model is asked to produce on a grounded call. `question`
// and `generated_at` are deliberately absent: the engine supplies both
// when the payload is promoted to an Answer.

#[derive(Debug, Clone, Deserialize)]
pub struct QaPayload {
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<String>,
    pub confidence: Confidence,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalculationPayload {
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<String>,
    pub confidence: Confidence,
    pub expression: String,
    pub result: String,
    pub explanation: String,
    #[serde(default)]
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SummarizationPayload {
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<String>,
    pub confidence: Confidence,
    pub summary: String,
    #[serde(default)]
    pub key_points: Vec<String>,
    #[serde(default)]
    pub document_ids: Vec<String>,
    #[serde(default)]
    pub original_length: Option<u64>,
}

/// What the classifier asks the model for. The raw label string is
/// parsed leniently with [`IntentLabel::parse`].
#[derive(Debug, Clone, Deserialize)]
pub struct ClassificationPayload {
    pub intent: String,
    pub confidence: Confidence,
    pub rationale: String,
}

/// What the memory updater asks the model for after each turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryDigest {
    pub summary: String,
    #[serde(default)]
    pub active_document_ids: Vec<String>,
}

// ── Output shapes ───────────────────────────────────────────────────

/// A JSON-schema constraint attached to a completion request.
///
/// Providers translate this into their structured-output mechanism.
/// The engine still re-validates whatever comes back; a provider's
/// claim of conformance is never trusted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputShape {
    pub name: String,
    pub schema: serde_json::Value,
}

impl OutputShape {
    pub fn qa() -> Self {
        Self {
            name: "qa_answer".into(),
            schema: json!({
                "type": "object",
                "properties": {
                    "answer": { "type": "string" },
                    "sources": { "type": "array", "items": { "type": "string" } },
                    "confidence": { "type": "number", "minimum": 0.0, "maximum": 1.0 }
                },
                "required": ["answer", "sources", "confidence"],
                "additionalProperties": false
            }),
        }
    }

    pub fn calculation() -> Self {
        Self {
            name: "calculation_answer".into(),
            schema: json!({
                "type": "object",
                "properties": {
                    "answer": { "type": "string" },
                    "sources": { "type": "array", "items": { "type": "string" } },
                    "confidence": { "type": "number", "minimum": 0.0, "maximum": 1.0 },
                    "expression": { "type": "string" },
                    "result": { "type": "string" },
                    "explanation": { "type": "string" },
                    "unit": { "type": ["string", "null"] }
                },
                "required": ["answer", "sources", "confidence", "expression", "result", "explanation", "unit"],
                "additionalProperties": false
            }),
        }
    }

    pub fn summarization() -> Self {
        Self {
            name: "summarization_answer".into(),
            schema: json!({
                "type": "object",
                "properties": {
                    "answer": { "type": "string" },
                    "sources": { "type": "array", "items": { "type": "string" } },
                    "confidence": { "type": "number", "minimum": 0.0, "maximum": 1.0 },
                    "summary": { "type": "string" },
                    "key_points": { "type": "array", "items": { "type": "string" } },
                    "document_ids": { "type": "array", "items": { "type": "string" } },
                    "original_length": { "type": ["integer", "null"] }
                },
                "required": ["answer", "sources", "confidence", "summary", "key_points", "document_ids", "original_length"],
                "additionalProperties": false
            }),
        }
    }

    pub fn classification() -> Self {
        Self {
            name: "intent_classification".into(),
            schema: json!({
                "type": "object",
                "properties": {
                    "intent": {
                        "type": "string",
                        "enum": ["qa", "summarization", "calculation", "unknown"]
                    },
                    "confidence": { "type": "number", "minimum": 0.0, "maximum": 1.0 },
                    "rationale": { "type": "string" }
                },
                "required": ["intent", "confidence", "rationale"],
                "additionalProperties": false
            }),
        }
    }

    pub fn memory_digest() -> Self {
        Self {
            name: "memory_digest".into(),
            schema: json!({
                "type": "object",
                "properties": {
                    "summary": { "type": "string" },
                    "active_document_ids": { "type": "array", "items": { "type": "string" } }
                },
                "required": ["summary", "active_document_ids"],
                "additionalProperties": false
            }),
        }
    }
}
