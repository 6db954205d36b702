//! # Docent Core
//!
//! Domain types, traits, and error definitions for the Docent document
//! assistant. This crate has **zero framework dependencies**: it
//! defines the domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every collaborator the engine talks to is a trait here: the model
//! ([`Provider`]), the document collection ([`Retriever`]), session
//! persistence ([`SessionStore`]), and tools ([`Tool`]).
//! Implementations live in their respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with scripted/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod message;
pub mod provider;
pub mod retrieval;
pub mod schema;
pub mod store;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{
    Error, ExecErrorKind, ProviderError, Result, RetrievalError, SchemaError, StoreError,
    ToolError,
};
pub use message::{Message, Role, Session, SessionId, ToolRequest};
pub use provider::{Provider, ProviderRequest, ProviderResponse, ToolDefinition, Usage};
pub use retrieval::{Retriever, ScoredDocument};
pub use schema::{
    Answer, AnswerResponse, CalculationResponse, ClassificationPayload, Confidence, Intent,
    IntentLabel, MemoryDigest, OutputShape, SummarizationResponse,
};
pub use store::SessionStore;
pub use tool::{Tool, ToolInvocation, ToolRegistry};
