//! Embedding provider traits

use async_trait::async_trait;

/// Trait for embedding providers
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Model identifier recorded in the index metadata
    fn model_name(&self) -> &str;

    /// Output dimensions, if known before the first call
    fn dimensions(&self) -> Option<usize>;

    /// Compute one embedding per input text, in input order
    async fn embed(&self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>>;
}
