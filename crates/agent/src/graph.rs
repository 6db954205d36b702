//! The turn engine — drives one state from classification to Done.
//!
//! Steps never call each other. The engine looks at `next_step`, runs
//! that step, merges the returned delta, and repeats. Routing is the
//! only place intent labels turn into steps.

use docent_core::error::Error;
use docent_core::provider::Provider;
use docent_core::schema::IntentLabel;
use docent_core::tool::ToolRegistry;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::classifier::classify_intent;
use crate::handlers::{run_handler, CalculationHandler, QaHandler, SummarizationHandler};
use crate::memory::update_memory;
use crate::state::{Step, TurnState};

/// Upper bound on steps per run. The pipeline is at most four
/// transitions long; reaching this limit means a routing bug.
const MAX_STEPS: usize = 8;

/// Map a classified intent to the step that handles it. Total over
/// the label set: unknown intents take the qa path.
pub fn route(label: IntentLabel) -> Step {
    match label {
        IntentLabel::Qa => Step::QaAgent,
        IntentLabel::Summarization => Step::SummarizationAgent,
        IntentLabel::Calculation => Step::CalculationAgent,
        IntentLabel::Unknown => Step::QaAgent,
    }
}

/// One configured pipeline, shared across turns.
pub struct TurnEngine {
    provider: Option<Arc<dyn Provider>>,
    tools: Arc<ToolRegistry>,
    model: String,
    temperature: f32,
}

impl TurnEngine {
    pub fn new(
        provider: Option<Arc<dyn Provider>>,
        tools: Arc<ToolRegistry>,
        model: impl Into<String>,
        temperature: f32,
    ) -> Self {
        Self {
            provider,
            tools,
            model: model.into(),
            temperature,
        }
    }

    /// Run the pipeline until `Done`.
    ///
    /// A schema violation while composing an answer aborts the run;
    /// provider and tool failures degrade inside their steps instead.
    pub async fn run(&self, state: &mut TurnState) -> Result<(), Error> {
        let provider = self.provider.as_ref();

        for _ in 0..MAX_STEPS {
            debug!(step = state.next_step.name(), "Running step");
            let update = match state.next_step {
                Step::ClassifyIntent => classify_intent(provider, &self.model, state).await,
                Step::QaAgent => {
                    run_handler(
                        &QaHandler,
                        provider,
                        &self.tools,
                        &self.model,
                        self.temperature,
                        state,
                    )
                    .await?
                }
                Step::SummarizationAgent => {
                    run_handler(
                        &SummarizationHandler,
                        provider,
                        &self.tools,
                        &self.model,
                        self.temperature,
                        state,
                    )
                    .await?
                }
                Step::CalculationAgent => {
                    run_handler(
                        &CalculationHandler,
                        provider,
                        &self.tools,
                        &self.model,
                        self.temperature,
                        state,
                    )
                    .await?
                }
                Step::UpdateMemory => update_memory(provider, &self.model, state).await,
                Step::Done => return Ok(()),
            };
            state.apply(update);
        }

        warn!(session_id = %state.session_id, "Step budget exhausted before Done");
        Ok(())
    }
}
