//! Assistant facade — session handling around the turn engine.
//!
//! One `Assistant` serves many threads. Per thread it keeps a
//! checkpoint (rolling summary, active documents, last run's actions)
//! so the next turn starts where the previous digest left off. Turns
//! for different threads share nothing beyond the store and that map;
//! concurrent turns for the same thread are not coordinated.

use docent_core::error::{Error, StoreError};
use docent_core::message::{Session, SessionId};
use docent_core::provider::Provider;
use docent_core::schema::Answer;
use docent_core::store::SessionStore;
use docent_core::tool::ToolRegistry;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::graph::TurnEngine;
use crate::state::TurnState;

const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// What the previous run left behind for a thread.
#[derive(Debug, Clone, Default)]
struct ThreadCheckpoint {
    summary: String,
    active_documents: Vec<String>,
    last_actions: Vec<String>,
}

/// The outcome of one turn.
///
/// A save failure is reported here rather than raised: the caller
/// already has a valid answer by the time persistence runs.
#[derive(Debug)]
pub struct TurnReport {
    pub answer: Answer,
    pub actions: Vec<String>,
    pub tools_used: Vec<String>,
    pub persist_error: Option<StoreError>,
}

pub struct Assistant {
    store: Arc<dyn SessionStore>,
    provider: Option<Arc<dyn Provider>>,
    tools: Arc<ToolRegistry>,
    model: String,
    temperature: f32,
    checkpoints: RwLock<HashMap<SessionId, ThreadCheckpoint>>,
}

impl Assistant {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            provider: None,
            tools: Arc::new(ToolRegistry::new()),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.0,
            checkpoints: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_tools(mut self, tools: Arc<ToolRegistry>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Process one user message on a thread.
    ///
    /// Loads (or creates) the session record, runs the pipeline over
    /// the persisted history, appends the turn's exchange, and saves.
    /// A load failure or a schema violation is fatal; a save failure
    /// is carried in the report.
    pub async fn run_turn(
        &self,
        thread_id: &SessionId,
        user_text: &str,
    ) -> Result<TurnReport, Error> {
        let mut session = match self.store.load(thread_id).await? {
            Some(session) => session,
            None => {
                info!(session_id = %thread_id, "Starting new session");
                Session::new(thread_id.clone())
            }
        };

        let checkpoint = {
            let checkpoints = self.checkpoints.read().await;
            checkpoints.get(thread_id).cloned().unwrap_or_default()
        };

        // History seen by the pipeline excludes the current input; the
        // turn's own exchange arrives through the merge policy.
        let seeded_len = session.messages.len();
        let mut state = TurnState::new(
            thread_id.clone(),
            user_text,
            session.messages.clone(),
            checkpoint.summary,
            checkpoint.active_documents,
        );

        let engine = TurnEngine::new(
            self.provider.clone(),
            self.tools.clone(),
            &self.model,
            self.temperature,
        );
        engine.run(&mut state).await?;

        let answer = state
            .current_response
            .take()
            .ok_or_else(|| Error::Internal("turn finished without an answer".into()))?;

        for message in state.messages.drain(seeded_len..) {
            session.push(message);
        }

        let persist_error = match self.store.save(&session).await {
            Ok(()) => None,
            Err(e) => {
                warn!(session_id = %thread_id, error = %e, "Failed to persist session");
                Some(e)
            }
        };

        {
            let mut checkpoints = self.checkpoints.write().await;
            checkpoints.insert(
                thread_id.clone(),
                ThreadCheckpoint {
                    summary: state.conversation_summary,
                    active_documents: state.active_documents,
                    last_actions: state.actions_taken.clone(),
                },
            );
        }

        Ok(TurnReport {
            answer,
            actions: state.actions_taken,
            tools_used: state.tools_used,
            persist_error,
        })
    }

    /// The component names visited during the last run for a thread,
    /// in order. Empty when no run has happened yet.
    pub async fn get_actions(&self, thread_id: &SessionId) -> Vec<String> {
        let checkpoints = self.checkpoints.read().await;
        checkpoints
            .get(thread_id)
            .map(|c| c.last_actions.clone())
            .unwrap_or_default()
    }
}
