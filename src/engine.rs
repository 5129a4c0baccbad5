//! Query engine - retrieval followed by one LLM completion

use std::fmt;

use tracing::{debug, info};

use crate::embedding::{normalize, Embedder};
use crate::error::Error;
use crate::index::{ScoredNode, VectorIndex};
use crate::llm::{Llm, QaPrompt};

/// Returned when retrieval finds nothing to answer from
pub const NO_RESULTS: &str = "No relevant passages found.";

/// Returned when the LLM produces no text
pub const EMPTY_RESPONSE: &str = "Empty Response";

/// Answer text plus the nodes it was generated from
#[derive(Debug, Clone)]
pub struct Response {
    pub text: String,
    pub source_nodes: Vec<ScoredNode>,
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Retrieval-augmented query engine over a loaded index
pub struct QueryEngine {
    index: VectorIndex,
    embedder: Box<dyn Embedder>,
    llm: Box<dyn Llm>,
    top_k: usize,
}

impl QueryEngine {
    /// The embedder must be the model the index was built with
    pub fn new(
        index: VectorIndex,
        embedder: Box<dyn Embedder>,
        llm: Box<dyn Llm>,
    ) -> anyhow::Result<Self> {
        let meta = index.meta();
        if embedder.model_name() != meta.embedding_model {
            anyhow::bail!(
                "Index was built with embedding model '{}' but '{}' was supplied",
                meta.embedding_model,
                embedder.model_name()
            );
        }
        if let Some(dims) = embedder.dimensions().filter(|d| *d != meta.dimensions) {
            return Err(Error::DimensionMismatch {
                expected: meta.dimensions,
                actual: dims,
            }
            .into());
        }

        Ok(Self {
            index,
            embedder,
            llm,
            top_k: 2,
        })
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    /// Nodes most similar to the query text
    pub async fn retrieve(&self, query: &str) -> anyhow::Result<Vec<ScoredNode>> {
        let mut embeddings = self.embedder.embed(&[query]).await?;
        let mut query_embedding = embeddings
            .pop()
            .ok_or_else(|| anyhow::anyhow!("Embedding provider returned no vector for the query"))?;
        normalize(&mut query_embedding);

        self.index.retrieve(&query_embedding, self.top_k)
    }

    /// Answer a query from the indexed documents
    pub async fn query(&self, query: &str) -> anyhow::Result<Response> {
        let source_nodes = self.retrieve(query).await?;
        debug!("Retrieved {} nodes", source_nodes.len());

        if source_nodes.is_empty() {
            return Ok(Response {
                text: NO_RESULTS.to_string(),
                source_nodes,
            });
        }

        let prompt = QaPrompt::new(
            source_nodes.iter().map(|n| n.node.text.clone()).collect(),
            query,
        );

        info!("Generating answer with {}", self.llm.model_name());
        let text = self.llm.complete(&prompt.render()).await?;
        let text = if text.trim().is_empty() {
            EMPTY_RESPONSE.to_string()
        } else {
            text
        };

        Ok(Response { text, source_nodes })
    }
}
