//! The Docent turn engine — one routed pipeline per user message.
//!
//! Every turn takes the same path:
//!
//! 1. **Classify** the intent (shape-constrained model call, keyword fallback)
//! 2. **Route** to the matching handler (qa, summarization, or calculation)
//! 3. **Probe** with that handler's tools bound, run what the model requested
//! 4. **Ground** the final answer in the tool results, tools disabled
//! 5. **Digest** the turn into the rolling memory
//!
//! Steps never mutate state directly; each returns a [`state::StateUpdate`]
//! delta that [`state::TurnState::apply`] merges. The [`Assistant`] facade
//! wraps the engine with session persistence and per-thread checkpoints.

pub mod assistant;
pub mod classifier;
pub mod graph;
pub mod handlers;
pub mod memory;
pub mod prompts;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;

pub use assistant::{Assistant, TurnReport};
pub use graph::{TurnEngine, route};
pub use state::{StateUpdate, Step, TurnState};
