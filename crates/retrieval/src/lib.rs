//! # Docent Retrieval
//!
//! The retrieval collaborator: an in-memory document collection with
//! keyword scoring. Scores are summed term-occurrence counts; the
//! ordering contract (descending score, ties in insertion order) is
//! what the rest of the system relies on.

mod keyword;

pub use keyword::{Document, KeywordRetriever};
