//! Retriever trait — the seam to the document collection.

use crate::error::RetrievalError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One scored hit from the document collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredDocument {
    /// The matching chunk of text
    pub content: String,

    /// Identifier of the document it came from
    pub source_id: String,

    /// Relevance score, higher is better
    pub score: f32,
}

/// Searches the document collection.
///
/// Results come back ordered by descending score; ties keep the
/// collection's insertion order. Implementations decide the scoring
/// formula; callers only rely on the ordering contract.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn search(
        &self,
        query: &str,
        top_k: usize,
    ) -> std::result::Result<Vec<ScoredDocument>, RetrievalError>;
}
