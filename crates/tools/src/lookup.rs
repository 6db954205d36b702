//! Lookup tool — retrieves relevant passages from the document collection.

use async_trait::async_trait;
use docent_core::error::{ExecErrorKind, ToolError};
use docent_core::retrieval::Retriever;
use docent_core::tool::Tool;
use std::sync::Arc;

pub const LOOKUP_TOOL_NAME: &str = "document_lookup";

/// How many hits a lookup returns.
const TOP_K: usize = 3;

pub struct LookupTool {
    retriever: Arc<dyn Retriever>,
}

impl LookupTool {
    pub fn new(retriever: Arc<dyn Retriever>) -> Self {
        Self { retriever }
    }
}

#[async_trait]
impl Tool for LookupTool {
    fn name(&self) -> &str {
        LOOKUP_TOOL_NAME
    }

    fn description(&self) -> &str {
        "Search the loaded document collection for passages relevant to a query. Returns the top 3 matches tagged with their source ids."
    }

    fn input_param(&self) -> &str {
        "query"
    }

    async fn invoke(&self, input: &str) -> Result<String, ToolError> {
        let hits = self
            .retriever
            .search(input, TOP_K)
            .await
            .map_err(|e| ToolError::Execution {
                tool: LOOKUP_TOOL_NAME.into(),
                kind: ExecErrorKind::Upstream,
                reason: e.to_string(),
            })?;

        if hits.is_empty() {
            return Ok("No relevant documents found.".to_string());
        }

        let blocks: Vec<String> = hits
            .iter()
            .enumerate()
            .map(|(i, hit)| {
                format!(
                    "[Document {}] (Source: {})\n{}",
                    i + 1,
                    hit.source_id,
                    hit.content
                )
            })
            .collect();

        Ok(blocks.join("\n\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docent_core::error::RetrievalError;
    use docent_core::retrieval::ScoredDocument;
    use docent_retrieval::KeywordRetriever;

    async fn seeded() -> Arc<KeywordRetriever> {
        let retriever = Arc::new(KeywordRetriever::new());
        retriever
            .add_document("q1.txt", "Revenue grew 10% in Q1. Revenue beat the forecast.")
            .await;
        retriever
            .add_document("q2.txt", "Revenue was flat in Q2.")
            .await;
        retriever
            .add_document("q3.txt", "Revenue dipped in Q3.")
            .await;
        retriever
            .add_document("q4.txt", "Revenue recovered in Q4.")
            .await;
        retriever
    }

    #[tokio::test]
    async fn returns_at_most_three_tagged_blocks() {
        let tool = LookupTool::new(seeded().await);
        let output = tool.invoke("revenue").await.unwrap();

        assert_eq!(output.matches("[Document ").count(), 3);
        assert!(output.contains("(Source: q1.txt)"));
        // highest score first
        assert!(output.starts_with("[Document 1] (Source: q1.txt)"));
    }

    #[tokio::test]
    async fn empty_results_use_the_fixed_text() {
        let tool = LookupTool::new(seeded().await);
        let output = tool.invoke("zebra").await.unwrap();
        assert_eq!(output, "No relevant documents found.");
    }

    struct FailingRetriever;

    #[async_trait]
    impl Retriever for FailingRetriever {
        async fn search(
            &self,
            _query: &str,
            _top_k: usize,
        ) -> Result<Vec<ScoredDocument>, RetrievalError> {
            Err(RetrievalError::Failed("index offline".into()))
        }
    }

    #[tokio::test]
    async fn retriever_failure_maps_to_execution_error() {
        let tool = LookupTool::new(Arc::new(FailingRetriever));
        let err = tool.invoke("anything").await.unwrap_err();
        assert!(matches!(
            err,
            ToolError::Execution {
                kind: ExecErrorKind::Upstream,
                ..
            }
        ));
    }

    #[test]
    fn tool_definition_uses_query_param() {
        let tool = LookupTool::new(Arc::new(KeywordRetriever::new()));
        let def = tool.definition();
        assert_eq!(def.name, "document_lookup");
        assert_eq!(def.parameters["required"][0], "query");
    }
}
