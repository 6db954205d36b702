//! Rolling memory — a digest of the conversation after each turn.
//!
//! The digest overwrites the summary and active-document list only on
//! success. On any failure the update carries neither field, so the
//! merge keeps whatever the previous turn established.

use docent_core::message::Message;
use docent_core::provider::{Provider, ProviderRequest};
use docent_core::schema::{MemoryDigest, OutputShape};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::prompts::memory_prompt;
use crate::state::{StateUpdate, Step, TurnState};

/// Digest the turn that just completed. Always routes to [`Step::Done`];
/// a failed digest degrades to retention, never to an error.
pub async fn update_memory(
    provider: Option<&Arc<dyn Provider>>,
    model: &str,
    state: &TurnState,
) -> StateUpdate {
    let mut update = StateUpdate::advance(Step::UpdateMemory.name(), Step::Done);

    let Some(provider) = provider else {
        return update;
    };

    match digest_with_model(provider.as_ref(), model, state).await {
        Ok(digest) => {
            debug!(
                summary_len = digest.summary.len(),
                active = digest.active_document_ids.len(),
                "Memory updated"
            );
            update.conversation_summary = Some(digest.summary);
            update.active_documents = Some(digest.active_document_ids);
        }
        Err(reason) => {
            warn!(reason = %reason, "Memory update unavailable, keeping previous summary");
        }
    }

    update
}

async fn digest_with_model(
    provider: &dyn Provider,
    model: &str,
    state: &TurnState,
) -> Result<MemoryDigest, String> {
    let answer_text = state
        .current_response
        .as_ref()
        .map(|a| a.text())
        .unwrap_or("");
    let prompt = memory_prompt(&state.messages, &state.user_input, answer_text);

    let mut request = ProviderRequest::text(model, vec![Message::user(prompt)]);
    request.output_shape = Some(OutputShape::memory_digest());

    let response = provider.complete(request).await.map_err(|e| e.to_string())?;

    serde_json::from_str(&response.message.content)
        .map_err(|e| format!("malformed memory digest: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{make_text_response, FailingProvider, ScriptedProvider};
    use chrono::Utc;
    use docent_core::message::SessionId;
    use docent_core::schema::{Answer, AnswerResponse, Confidence};

    fn finished_state() -> TurnState {
        let mut state = TurnState::new(
            SessionId::from("t1"),
            "What was the March figure?",
            vec![
                Message::user("Hello"),
                Message::assistant("Hi, ask me about your documents."),
            ],
            "Earlier small talk.".to_string(),
            vec!["old.txt".to_string()],
        );
        state.current_response = Some(Answer::Qa(AnswerResponse {
            question: "What was the March figure?".into(),
            answer: "March revenue was 1500.".into(),
            sources: vec!["revenue.txt".into()],
            confidence: Confidence::new(0.9).unwrap(),
            generated_at: Utc::now(),
        }));
        state
    }

    #[tokio::test]
    async fn digest_overwrites_summary_and_active_documents() {
        let provider: Arc<dyn Provider> = Arc::new(ScriptedProvider::new(vec![
            make_text_response(
                r#"{"summary": "User is reviewing March revenue.",
                    "active_document_ids": ["revenue.txt"]}"#,
            ),
        ]));
        let mut state = finished_state();

        let update = update_memory(Some(&provider), "gpt-4o-mini", &state).await;
        state.apply(update);

        assert_eq!(state.conversation_summary, "User is reviewing March revenue.");
        assert_eq!(state.active_documents, vec!["revenue.txt"]);
        assert_eq!(state.next_step, Step::Done);
        assert_eq!(state.actions_taken, vec!["update_memory"]);
    }

    #[tokio::test]
    async fn failed_digest_keeps_the_previous_memory() {
        let provider: Arc<dyn Provider> = Arc::new(FailingProvider::new());
        let mut state = finished_state();

        let update = update_memory(Some(&provider), "gpt-4o-mini", &state).await;
        assert!(update.conversation_summary.is_none());
        assert!(update.active_documents.is_none());

        state.apply(update);
        assert_eq!(state.conversation_summary, "Earlier small talk.");
        assert_eq!(state.active_documents, vec!["old.txt"]);
        assert_eq!(state.next_step, Step::Done);
    }

    #[tokio::test]
    async fn malformed_digest_keeps_the_previous_memory() {
        let provider: Arc<dyn Provider> =
            Arc::new(ScriptedProvider::new(vec![make_text_response("{oops")]));
        let mut state = finished_state();

        state.apply(update_memory(Some(&provider), "gpt-4o-mini", &state).await);
        assert_eq!(state.conversation_summary, "Earlier small talk.");
    }

    #[tokio::test]
    async fn no_provider_still_finishes_the_turn() {
        let mut state = finished_state();

        let update = update_memory(None, "gpt-4o-mini", &state).await;
        state.apply(update);

        assert_eq!(state.conversation_summary, "Earlier small talk.");
        assert_eq!(state.next_step, Step::Done);
        assert_eq!(state.actions_taken, vec!["update_memory"]);
    }

    #[tokio::test]
    async fn digest_request_covers_the_current_exchange() {
        let scripted = Arc::new(ScriptedProvider::new(vec![make_text_response(
            r#"{"summary": "ok", "active_document_ids": []}"#,
        )]));
        let provider: Arc<dyn Provider> = scripted.clone();
        let state = finished_state();

        update_memory(Some(&provider), "gpt-4o-mini", &state).await;

        let requests = scripted.recorded_requests();
        assert_eq!(requests.len(), 1);
        let shape = requests[0].output_shape.as_ref().unwrap();
        assert_eq!(shape.name, "memory_digest");

        let prompt = &requests[0].messages[0].content;
        assert!(prompt.contains("User: What was the March figure?"));
        assert!(prompt.contains("Assistant: March revenue was 1500."));
        assert!(prompt.contains("user: Hello"));
    }
}
