//! Embedding module - compute embeddings from text

mod openai;
mod simulated;
mod traits;
mod truncate;

pub use openai::OpenAIEmbedding;
pub use simulated::SimulatedEmbedding;
pub use traits::Embedder;
pub use truncate::{get_token_limit, Truncator};

use crate::config::Settings;

/// Create the embedding provider for `model` from settings
pub fn create_embedder(settings: &Settings, model: &str) -> anyhow::Result<Box<dyn Embedder>> {
    let provider = OpenAIEmbedding::new(
        model.to_string(),
        &settings.credential,
        settings.api_base.clone(),
    )?;
    Ok(Box::new(provider))
}

/// L2-normalize a vector in place; zero vectors are left untouched
pub fn normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        vector.iter_mut().for_each(|x| *x /= norm);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        let mut v = vec![3.0, 4.0];
        normalize(&mut v);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);

        let mut zero = vec![0.0; 4];
        normalize(&mut zero);
        assert_eq!(zero, vec![0.0; 4]);
    }
}
