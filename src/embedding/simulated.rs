//! Simulated embeddings for testing
//!
//! Feature-hashed bag of words: deterministic across processes and needs no
//! external API. Texts sharing words land close together under inner product.

use std::hash::{Hash, Hasher};
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use rustc_hash::FxHasher;

use super::normalize;
use super::traits::Embedder;

static TOKEN_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[a-zA-Z0-9]+").unwrap());

/// Simulated embedding provider
pub struct SimulatedEmbedding {
    model_name: String,
    dimensions: usize,
}

impl SimulatedEmbedding {
    pub fn new(dimensions: usize) -> Self {
        Self {
            model_name: "simulated".to_string(),
            dimensions: dimensions.max(1),
        }
    }

    /// Embed one text synchronously
    pub fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];

        for token in TOKEN_REGEX.find_iter(text) {
            let token = token.as_str().to_lowercase();
            let mut hasher = FxHasher::default();
            token.hash(&mut hasher);
            let bucket = (hasher.finish() % self.dimensions as u64) as usize;
            vector[bucket] += 1.0;
        }

        normalize(&mut vector);
        vector
    }
}

impl Default for SimulatedEmbedding {
    fn default() -> Self {
        Self::new(256)
    }
}

#[async_trait]
impl Embedder for SimulatedEmbedding {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn dimensions(&self) -> Option<usize> {
        Some(self.dimensions)
    }

    async fn embed(&self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[test]
    fn test_deterministic_and_normalized() {
        let embedder = SimulatedEmbedding::new(64);
        let a = embedder.embed_one("The sky is blue.");
        let b = embedder.embed_one("the SKY is blue");
        assert_eq!(a, b);
        assert!((dot(&a, &a) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_overlap_scores_higher() {
        let embedder = SimulatedEmbedding::default();
        let query = embedder.embed_one("What color is the sky?");
        let sky = embedder.embed_one("The sky is blue.");
        let rust = embedder.embed_one("Cargo builds crates quickly.");
        assert!(dot(&query, &sky) > dot(&query, &rust));
    }

    #[tokio::test]
    async fn test_embed_batch() {
        let embedder = SimulatedEmbedding::new(32);
        let out = embedder.embed(&["one", "two", ""]).await.unwrap();
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|v| v.len() == 32));
        assert!(out[2].iter().all(|x| *x == 0.0));
    }
}
