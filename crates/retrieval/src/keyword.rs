//! In-memory keyword retriever.

use async_trait::async_trait;
use docent_core::error::RetrievalError;
use docent_core::retrieval::{Retriever, ScoredDocument};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// File extensions loaded as plain text by [`KeywordRetriever::load_directory`].
const TEXT_EXTENSIONS: [&str; 4] = ["txt", "md", "json", "csv"];

/// One document in the collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Identifier reported in search hits (file name for loaded files)
    pub source_id: String,

    /// Full text content
    pub content: String,
}

/// An in-memory document collection scored by keyword occurrence.
///
/// Score for a query is the sum of occurrence counts of each
/// whitespace-separated query term in the lowercased document text.
/// Zero-score documents never appear in results.
#[derive(Clone)]
pub struct KeywordRetriever {
    documents: Arc<RwLock<Vec<Document>>>,
}

impl KeywordRetriever {
    pub fn new() -> Self {
        Self {
            documents: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Add one document to the collection.
    pub async fn add_document(&self, source_id: impl Into<String>, content: impl Into<String>) {
        let doc = Document {
            source_id: source_id.into(),
            content: content.into(),
        };
        self.documents.write().await.push(doc);
    }

    /// Load every text file in a directory, in sorted name order so
    /// insertion order (and therefore tie-breaking) is deterministic.
    /// Unreadable files are skipped with a warning. Returns how many
    /// documents were loaded.
    pub async fn load_directory(&self, dir: impl AsRef<Path>) -> Result<usize, RetrievalError> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir)
            .map_err(|e| RetrievalError::Failed(format!("{}: {e}", dir.display())))?;

        let mut paths: Vec<std::path::PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| TEXT_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
            })
            .collect();
        paths.sort();

        let mut loaded = 0;
        for path in paths {
            let content = match std::fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable document");
                    continue;
                }
            };
            let source_id = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string());
            self.add_document(source_id, content).await;
            loaded += 1;
        }

        debug!(dir = %dir.display(), loaded, "documents loaded");
        Ok(loaded)
    }

    /// Number of documents in the collection.
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }

    /// Remove every document.
    pub async fn clear(&self) {
        self.documents.write().await.clear();
    }
}

impl Default for KeywordRetriever {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Retriever for KeywordRetriever {
    async fn search(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<ScoredDocument>, RetrievalError> {
        let terms: Vec<String> = query
            .to_lowercase()
            .split_whitespace()
            .map(str::to_string)
            .collect();
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let documents = self.documents.read().await;
        let mut results: Vec<ScoredDocument> = documents
            .iter()
            .filter_map(|doc| {
                let haystack = doc.content.to_lowercase();
                let occurrences: usize = terms
                    .iter()
                    .map(|term| haystack.matches(term.as_str()).count())
                    .sum();
                if occurrences == 0 {
                    return None;
                }
                Some(ScoredDocument {
                    content: doc.content.clone(),
                    source_id: doc.source_id.clone(),
                    score: occurrences as f32,
                })
            })
            .collect();

        // stable sort: equal scores keep insertion order
        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(top_k);

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> KeywordRetriever {
        let retriever = KeywordRetriever::new();
        retriever
            .add_document("q1_report.txt", "Revenue grew in Q1. Revenue was strong.")
            .await;
        retriever
            .add_document("q2_report.txt", "Revenue was flat in Q2.")
            .await;
        retriever
            .add_document("notes.txt", "Meeting notes with no financial data.")
            .await;
        retriever
    }

    #[tokio::test]
    async fn scores_by_occurrence_count() {
        let retriever = seeded().await;
        let hits = retriever.search("revenue", 10).await.unwrap();
        assert_eq!(hits.len(), 2);
        // q1_report mentions revenue twice, q2_report once
        assert_eq!(hits[0].source_id, "q1_report.txt");
        assert_eq!(hits[0].score, 2.0);
        assert_eq!(hits[1].source_id, "q2_report.txt");
    }

    #[tokio::test]
    async fn zero_score_documents_are_excluded() {
        let retriever = seeded().await;
        let hits = retriever.search("revenue", 10).await.unwrap();
        assert!(hits.iter().all(|h| h.source_id != "notes.txt"));
    }

    #[tokio::test]
    async fn ties_keep_insertion_order() {
        let retriever = KeywordRetriever::new();
        retriever.add_document("first.txt", "alpha beta").await;
        retriever.add_document("second.txt", "alpha gamma").await;
        retriever.add_document("third.txt", "alpha delta").await;

        let hits = retriever.search("alpha", 10).await.unwrap();
        let ids: Vec<&str> = hits.iter().map(|h| h.source_id.as_str()).collect();
        assert_eq!(ids, vec!["first.txt", "second.txt", "third.txt"]);
    }

    #[tokio::test]
    async fn top_k_truncates() {
        let retriever = seeded().await;
        let hits = retriever.search("revenue", 1).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].source_id, "q1_report.txt");
    }

    #[tokio::test]
    async fn empty_query_returns_nothing() {
        let retriever = seeded().await;
        let hits = retriever.search("   ", 10).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn loads_text_files_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "alpha content").unwrap();
        std::fs::write(dir.path().join("b.md"), "beta content").unwrap();
        std::fs::write(dir.path().join("c.bin"), "ignored").unwrap();

        let retriever = KeywordRetriever::new();
        let loaded = retriever.load_directory(dir.path()).await.unwrap();
        assert_eq!(loaded, 2);
        assert_eq!(retriever.len().await, 2);

        let hits = retriever.search("alpha", 10).await.unwrap();
        assert_eq!(hits[0].source_id, "a.txt");
    }

    #[tokio::test]
    async fn missing_directory_is_an_error() {
        let retriever = KeywordRetriever::new();
        let err = retriever.load_directory("/definitely/not/here").await;
        assert!(err.is_err());
    }
}
