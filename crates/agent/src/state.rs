//! Turn state and the merge policy applied between steps.
//!
//! One `TurnState` exists per workflow run. Steps never mutate it
//! directly; they return a [`StateUpdate`] delta and the engine merges
//! it through [`TurnState::apply`], so a step that forgets to append
//! cannot corrupt history.

use docent_core::message::{Message, SessionId};
use docent_core::schema::{Answer, Intent};

/// The workflow positions, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Classify the user's intent (always the entry point)
    ClassifyIntent,
    /// Answer a question from the documents
    QaAgent,
    /// Summarize document content
    SummarizationAgent,
    /// Compute over document data
    CalculationAgent,
    /// Refresh the rolling summary and active document set
    UpdateMemory,
    /// Terminal
    Done,
}

impl Step {
    /// The name recorded in `actions_taken` when this step runs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ClassifyIntent => "classify_intent",
            Self::QaAgent => "qa_agent",
            Self::SummarizationAgent => "summarization_agent",
            Self::CalculationAgent => "calculation_agent",
            Self::UpdateMemory => "update_memory",
            Self::Done => "done",
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The mutable record threaded through one workflow run.
#[derive(Debug, Clone)]
pub struct TurnState {
    /// The thread this run belongs to
    pub session_id: SessionId,

    /// Latest raw user text
    pub user_input: String,

    /// Conversation history. Seeded from the persisted session record
    /// (excluding the current input); the turn's own exchange is
    /// appended through the merge policy, never by a step directly.
    pub messages: Vec<Message>,

    /// The most recent classification result
    pub intent: Option<Intent>,

    /// Which step the engine runs next
    pub next_step: Step,

    /// Rolling digest maintained by the memory updater
    pub conversation_summary: String,

    /// Document ids currently in focus
    pub active_documents: Vec<String>,

    /// The validated answer produced this turn
    pub current_response: Option<Answer>,

    /// Tools invoked this turn, in invocation order
    pub tools_used: Vec<String>,

    /// Every component visited this run, in order
    pub actions_taken: Vec<String>,
}

impl TurnState {
    /// Seed a fresh run. `history` is the persisted conversation up to
    /// (but not including) the current input; `summary` and
    /// `active_documents` carry over from the previous run's digest.
    pub fn new(
        session_id: SessionId,
        user_input: impl Into<String>,
        history: Vec<Message>,
        summary: String,
        active_documents: Vec<String>,
    ) -> Self {
        Self {
            session_id,
            user_input: user_input.into(),
            messages: history,
            intent: None,
            next_step: Step::ClassifyIntent,
            conversation_summary: summary,
            active_documents,
            current_response: None,
            tools_used: Vec::new(),
            actions_taken: Vec::new(),
        }
    }

    /// Merge a step's delta into the state.
    ///
    /// The policy table, applied here and nowhere else:
    ///
    /// | field                  | policy                 |
    /// |------------------------|------------------------|
    /// | `messages`             | append                 |
    /// | `actions_taken`        | append                 |
    /// | everything else        | overwrite when present |
    pub fn apply(&mut self, update: StateUpdate) {
        self.messages.extend(update.messages);
        self.actions_taken.extend(update.actions_taken);

        if let Some(intent) = update.intent {
            self.intent = Some(intent);
        }
        if let Some(next_step) = update.next_step {
            self.next_step = next_step;
        }
        if let Some(summary) = update.conversation_summary {
            self.conversation_summary = summary;
        }
        if let Some(active) = update.active_documents {
            self.active_documents = active;
        }
        if let Some(response) = update.current_response {
            self.current_response = Some(response);
        }
        if let Some(tools) = update.tools_used {
            self.tools_used = tools;
        }
    }
}

/// A partial delta returned by one step.
///
/// Append-policy fields are plain vectors (empty means "nothing to
/// add"); overwrite-policy fields are options (`None` means "leave the
/// previous value alone").
#[derive(Debug, Default)]
pub struct StateUpdate {
    pub messages: Vec<Message>,
    pub actions_taken: Vec<String>,
    pub intent: Option<Intent>,
    pub next_step: Option<Step>,
    pub conversation_summary: Option<String>,
    pub active_documents: Option<Vec<String>>,
    pub current_response: Option<Answer>,
    pub tools_used: Option<Vec<String>>,
}

impl StateUpdate {
    /// A delta that only records the visit and moves the engine on.
    pub fn advance(step_name: &str, next: Step) -> Self {
        Self {
            actions_taken: vec![step_name.to_string()],
            next_step: Some(next),
            ..Self::default()
        }
    }
}
