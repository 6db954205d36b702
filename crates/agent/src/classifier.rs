//! Intent classification — shape-constrained model call with a
//! deterministic keyword fallback.

use docent_core::message::Message;
use docent_core::provider::{Provider, ProviderRequest};
use docent_core::schema::{ClassificationPayload, Confidence, Intent, IntentLabel, OutputShape};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::graph::route;
use crate::prompts::classification_prompt;
use crate::state::{StateUpdate, Step, TurnState};

/// Confidence reported when the rule-based fallback classifies a turn.
/// A fixed low value; it signals "fallback", nothing more.
pub const FALLBACK_CONFIDENCE: f64 = 0.5;

const CALCULATION_KEYWORDS: &[&str] = &["calculate", "sum", "total", "average", "multiply"];
const SUMMARIZATION_KEYWORDS: &[&str] = &["summarize", "summary", "overview"];

/// Classify the current input and pick the handler to route to.
///
/// Any provider failure or malformed classification degrades to the
/// keyword fallback; classification never kills a turn.
pub async fn classify_intent(
    provider: Option<&Arc<dyn Provider>>,
    model: &str,
    state: &TurnState,
) -> StateUpdate {
    let intent = match provider {
        Some(provider) => {
            match classify_with_model(provider.as_ref(), model, &state.user_input, &state.messages)
                .await
            {
                Ok(intent) => intent,
                Err(reason) => {
                    warn!(reason = %reason, "Classification unavailable, using keyword fallback");
                    fallback_classify(&state.user_input)
                }
            }
        }
        None => fallback_classify(&state.user_input),
    };

    debug!(
        label = %intent.label,
        confidence = %intent.confidence,
        "Intent classified"
    );

    let next = route(intent.label);
    StateUpdate {
        intent: Some(intent),
        next_step: Some(next),
        actions_taken: vec![Step::ClassifyIntent.name().to_string()],
        ..StateUpdate::default()
    }
}

async fn classify_with_model(
    provider: &dyn Provider,
    model: &str,
    user_input: &str,
    history: &[Message],
) -> Result<Intent, String> {
    let prompt = classification_prompt(user_input, history);

    let mut request = ProviderRequest::text(model, vec![Message::user(prompt)]);
    request.output_shape = Some(OutputShape::classification());

    let response = provider.complete(request).await.map_err(|e| e.to_string())?;

    let payload: ClassificationPayload = serde_json::from_str(&response.message.content)
        .map_err(|e| format!("malformed classification payload: {e}"))?;

    Ok(Intent {
        label: IntentLabel::parse(&payload.intent),
        confidence: payload.confidence,
        rationale: payload.rationale,
    })
}

/// Deterministic keyword rules, used when no model is available.
pub fn fallback_classify(user_input: &str) -> Intent {
    let lowered = user_input.to_lowercase();

    let (label, rationale) = if CALCULATION_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        (
            IntentLabel::Calculation,
            "Rule-based classification: matched calculation keywords",
        )
    } else if SUMMARIZATION_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        (
            IntentLabel::Summarization,
            "Rule-based classification: matched summarization keywords",
        )
    } else {
        (
            IntentLabel::Qa,
            "Rule-based classification: no keyword match, defaulting to qa",
        )
    };

    Intent {
        label,
        confidence: Confidence::new(FALLBACK_CONFIDENCE).unwrap_or(Confidence::ZERO),
        rationale: rationale.into(),
    }
}
