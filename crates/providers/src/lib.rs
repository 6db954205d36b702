//! Model provider implementations for Docent.
//!
//! All providers implement the `docent_core::Provider` trait. The
//! engine holds one behind an `Arc<dyn Provider>` and never knows
//! which backend is answering.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatProvider;
