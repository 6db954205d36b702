//! Built-in tool implementations for Docent.
//!
//! Two tools back the handlers: the evaluator does arithmetic so the
//! model never has to, and the lookup pulls relevant passages out of
//! the document collection.

pub mod evaluator;
pub mod lookup;

pub use evaluator::{EVALUATOR_TOOL_NAME, EvaluatorTool};
pub use lookup::{LOOKUP_TOOL_NAME, LookupTool};

use docent_core::retrieval::Retriever;
use docent_core::tool::ToolRegistry;
use std::sync::Arc;

/// Create the default tool registry: evaluator + document lookup over
/// the given retriever.
pub fn default_registry(retriever: Arc<dyn Retriever>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(evaluator::EvaluatorTool));
    registry.register(Box::new(lookup::LookupTool::new(retriever)));
    registry
}
