//! The specialized handlers — one per intent, all behind one template.
//!
//! Every handler runs the same five-step flow:
//!
//! 1. Probe call with its tools bound (not force-invoked)
//! 2. Execute requested tools through the registry, in request order
//! 3. Discard the tool-calling exchange entirely
//! 4. Grounded call: one folded user message, tools disabled, output
//!    shape-constrained
//! 5. Parse, stamp, validate, and record the Answer
//!
//! The probe and grounded message lists are built by two separate
//! functions so the discard behavior is explicit and testable, not
//! implicit in message ordering.

use chrono::Utc;
use docent_core::error::{Error, SchemaError};
use docent_core::message::Message;
use docent_core::provider::{Provider, ProviderRequest};
use docent_core::schema::{
    Answer, AnswerResponse, CalculationPayload, CalculationResponse, Confidence, OutputShape,
    QaPayload, SummarizationPayload, SummarizationResponse,
};
use docent_core::tool::ToolRegistry;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::prompts::{
    grounding_prompt, trimmed_history, CALCULATION_SYSTEM_PROMPT, QA_SYSTEM_PROMPT,
    SUMMARIZATION_SYSTEM_PROMPT,
};
use crate::state::{StateUpdate, Step, TurnState};

use docent_tools::{EVALUATOR_TOOL_NAME, LOOKUP_TOOL_NAME};

/// What distinguishes one handler from another: its prompt, its tool
/// bindings, its output shape, and how a payload becomes an Answer.
pub trait Handler: Send + Sync {
    fn step(&self) -> Step;
    fn system_prompt(&self) -> &'static str;
    fn tool_names(&self) -> &'static [&'static str];
    fn output_shape(&self) -> OutputShape;

    /// Parse the grounded call's content and compose the final Answer.
    /// `question` and `generated_at` are supplied here, never by the
    /// model.
    fn finalize(&self, content: &str, question: &str) -> Result<Answer, SchemaError>;
}

pub struct QaHandler;

impl Handler for QaHandler {
    fn step(&self) -> Step {
        Step::QaAgent
    }

    fn system_prompt(&self) -> &'static str {
        QA_SYSTEM_PROMPT
    }

    fn tool_names(&self) -> &'static [&'static str] {
        &[LOOKUP_TOOL_NAME]
    }

    fn output_shape(&self) -> OutputShape {
        OutputShape::qa()
    }

    fn finalize(&self, content: &str, question: &str) -> Result<Answer, SchemaError> {
        let payload: QaPayload =
            serde_json::from_str(content).map_err(|e| malformed("qa_answer", e))?;
        let answer = Answer::Qa(AnswerResponse {
            question: question.to_string(),
            answer: payload.answer,
            sources: payload.sources,
            confidence: payload.confidence,
            generated_at: Utc::now(),
        });
        answer.validate()?;
        Ok(answer)
    }
}

pub struct SummarizationHandler;

impl Handler for SummarizationHandler {
    fn step(&self) -> Step {
        Step::SummarizationAgent
    }

    fn system_prompt(&self) -> &'static str {
        SUMMARIZATION_SYSTEM_PROMPT
    }

    fn tool_names(&self) -> &'static [&'static str] {
        &[LOOKUP_TOOL_NAME]
    }

    fn output_shape(&self) -> OutputShape {
        OutputShape::summarization()
    }

    fn finalize(&self, content: &str, question: &str) -> Result<Answer, SchemaError> {
        let payload: SummarizationPayload =
            serde_json::from_str(content).map_err(|e| malformed("summarization_answer", e))?;
        let answer = Answer::Summarization(SummarizationResponse {
            question: question.to_string(),
            answer: payload.answer,
            sources: payload.sources,
            confidence: payload.confidence,
            generated_at: Utc::now(),
            summary: payload.summary,
            key_points: payload.key_points,
            document_ids: payload.document_ids,
            original_length: payload.original_length,
        });
        answer.validate()?;
        Ok(answer)
    }
}

pub struct CalculationHandler;

impl Handler for CalculationHandler {
    fn step(&self) -> Step {
        Step::CalculationAgent
    }

    fn system_prompt(&self) -> &'static str {
        CALCULATION_SYSTEM_PROMPT
    }

    fn tool_names(&self) -> &'static [&'static str] {
        &[EVALUATOR_TOOL_NAME, LOOKUP_TOOL_NAME]
    }

    fn output_shape(&self) -> OutputShape {
        OutputShape::calculation()
    }

    fn finalize(&self, content: &str, question: &str) -> Result<Answer, SchemaError> {
        let payload: CalculationPayload =
            serde_json::from_str(content).map_err(|e| malformed("calculation_answer", e))?;
        let answer = Answer::Calculation(CalculationResponse {
            question: question.to_string(),
            answer: payload.answer,
            sources: payload.sources,
            confidence: payload.confidence,
            generated_at: Utc::now(),
            expression: payload.expression,
            result: payload.result,
            explanation: payload.explanation,
            unit: payload.unit,
        });
        answer.validate()?;
        Ok(answer)
    }
}

fn malformed(shape: &str, e: serde_json::Error) -> SchemaError {
    SchemaError::Malformed {
        shape: shape.to_string(),
        reason: e.to_string(),
    }
}

/// The message list for the probe call: system prompt, trimmed
/// history, current input. Tools are bound on the request, not here.
pub fn probe_messages(system_prompt: &str, history: &[Message], user_input: &str) -> Vec<Message> {
    let mut messages = vec![Message::system(system_prompt)];
    messages.extend(trimmed_history(history));
    messages.push(Message::user(user_input));
    messages
}

/// The message list for the grounded call: the system prompt plus one
/// user message folding trimmed history, tool results, and the
/// original question. Nothing from the probe exchange survives.
pub fn grounded_messages(
    system_prompt: &str,
    history: &[Message],
    tool_results: &str,
    question: &str,
) -> Vec<Message> {
    vec![
        Message::system(system_prompt),
        Message::user(grounding_prompt(history, tool_results, question)),
    ]
}

/// Run one handler through the shared template.
///
/// Model failures surface as a labeled failure answer with zero
/// confidence (single attempt, no retries); a final payload that fails
/// to parse or validate is fatal to the turn.
pub async fn run_handler(
    handler: &dyn Handler,
    provider: Option<&Arc<dyn Provider>>,
    tools: &ToolRegistry,
    model: &str,
    temperature: f32,
    state: &TurnState,
) -> Result<StateUpdate, Error> {
    let Some(provider) = provider else {
        return Ok(failure_update(
            handler,
            state,
            "No model provider is configured. Please configure a provider to use this feature.",
        ));
    };

    // ── Probe call: tools bound ──
    let mut request = ProviderRequest::text(
        model,
        probe_messages(handler.system_prompt(), &state.messages, &state.user_input),
    );
    request.temperature = temperature;
    request.tools = tools.definitions_for(handler.tool_names());

    let probe = match provider.complete(request).await {
        Ok(response) => response,
        Err(e) => {
            warn!(step = handler.step().name(), error = %e, "Probe call failed");
            return Ok(failure_update(
                handler,
                state,
                &format!("The model request failed: {e}"),
            ));
        }
    };

    // ── Execute requested tools, in request order ──
    let mut tools_used = Vec::new();
    let mut result_blocks = Vec::new();

    for call in &probe.message.tool_calls {
        let input = tool_input(tools, &call.name, &call.arguments);
        match tools.invoke(&call.name, &input).await {
            Ok(output) => result_blocks.push(format!("[{}]\n{}", call.name, output)),
            // folded into the results text, never propagated raw
            Err(e) => result_blocks.push(format!("[{}] error: {}", call.name, e)),
        }
        tools_used.push(call.name.clone());
    }

    debug!(
        step = handler.step().name(),
        tools = tools_used.len(),
        "Probe exchange complete"
    );

    // ── Grounded call: fresh messages, tools disabled, shaped output ──
    let mut request = ProviderRequest::text(
        model,
        grounded_messages(
            handler.system_prompt(),
            &state.messages,
            &result_blocks.join("\n\n"),
            &state.user_input,
        ),
    );
    request.temperature = temperature;
    request.output_shape = Some(handler.output_shape());

    let grounded = match provider.complete(request).await {
        Ok(response) => response,
        Err(e) => {
            warn!(step = handler.step().name(), error = %e, "Grounded call failed");
            return Ok(failure_update(
                handler,
                state,
                &format!("The model request failed: {e}"),
            ));
        }
    };

    let answer = handler.finalize(&grounded.message.content, &state.user_input)?;

    Ok(StateUpdate {
        messages: vec![
            Message::user(&state.user_input),
            Message::assistant(answer.text()),
        ],
        actions_taken: vec![handler.step().name().to_string()],
        current_response: Some(answer),
        tools_used: Some(tools_used),
        next_step: Some(Step::UpdateMemory),
        ..StateUpdate::default()
    })
}

/// Pull the tool's single text argument out of the model's JSON
/// arguments. Unknown tools and malformed arguments degrade to the raw
/// string; the registry reports the real error on invocation.
fn tool_input(tools: &ToolRegistry, name: &str, arguments: &str) -> String {
    let param = tools.get(name).map(|t| t.input_param()).unwrap_or("input");
    serde_json::from_str::<serde_json::Value>(arguments)
        .ok()
        .and_then(|v| v.get(param).and_then(|p| p.as_str()).map(String::from))
        .unwrap_or_else(|| arguments.to_string())
}

/// The degraded-but-valid answer for a turn whose model calls failed:
/// base shape, zero confidence, explanatory text.
fn failure_update(handler: &dyn Handler, state: &TurnState, detail: &str) -> StateUpdate {
    let answer = Answer::Qa(AnswerResponse {
        question: state.user_input.clone(),
        answer: detail.to_string(),
        sources: Vec::new(),
        confidence: Confidence::ZERO,
        generated_at: Utc::now(),
    });

    StateUpdate {
        messages: vec![
            Message::user(&state.user_input),
            Message::assistant(answer.text()),
        ],
        actions_taken: vec![handler.step().name().to_string()],
        current_response: Some(answer),
        tools_used: Some(Vec::new()),
        next_step: Some(Step::UpdateMemory),
        ..StateUpdate::default()
    }
}
