//! OpenAI embedding provider

use async_openai::{
    config::OpenAIConfig,
    types::{CreateEmbeddingRequestArgs, EmbeddingInput},
    Client,
};
use async_trait::async_trait;
use tracing::{debug, info};

use super::traits::Embedder;
use super::truncate::Truncator;
use crate::config::Credential;

/// Dimensions of known OpenAI embedding models
pub(crate) fn known_dimensions(model_name: &str) -> Option<usize> {
    match model_name {
        "text-embedding-3-small" => Some(1536),
        "text-embedding-3-large" => Some(3072),
        "text-embedding-ada-002" => Some(1536),
        _ => None,
    }
}

/// OpenAI embedding provider
pub struct OpenAIEmbedding {
    client: Client<OpenAIConfig>,
    model_name: String,
    dimensions: Option<usize>,
    truncator: Truncator,
}

impl OpenAIEmbedding {
    /// Create a new OpenAI embedding provider
    pub fn new(
        model_name: String,
        credential: &Credential,
        base_url: Option<String>,
    ) -> anyhow::Result<Self> {
        let mut config = OpenAIConfig::new().with_api_key(credential.expose());

        if let Some(base_url) = base_url {
            config = config.with_api_base(base_url);
        }

        let client = Client::with_config(config);
        let dimensions = known_dimensions(&model_name);
        let truncator = Truncator::for_model(&model_name)?;

        info!(
            "OpenAI embedding provider: {} ({} dims)",
            model_name,
            dimensions.map_or_else(|| "auto".to_string(), |d| d.to_string())
        );

        Ok(Self {
            client,
            model_name,
            dimensions,
            truncator,
        })
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedding {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn dimensions(&self) -> Option<usize> {
        self.dimensions
    }

    async fn embed(&self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let input = self.truncator.truncate(texts);
        debug!("Requesting {} embeddings from {}", input.len(), self.model_name);

        let request = CreateEmbeddingRequestArgs::default()
            .model(&self.model_name)
            .input(EmbeddingInput::StringArray(input))
            .build()?;

        let response = self.client.embeddings().create(request).await?;

        if response.data.len() != texts.len() {
            anyhow::bail!(
                "Embedding API returned {} vectors for {} inputs",
                response.data.len(),
                texts.len()
            );
        }

        let mut data = response.data;
        data.sort_by_key(|d| d.index);

        Ok(data.into_iter().map(|d| d.embedding).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_dimensions() {
        assert_eq!(known_dimensions("text-embedding-3-small"), Some(1536));
        assert_eq!(known_dimensions("text-embedding-3-large"), Some(3072));
        assert_eq!(known_dimensions("my-local-model"), None);
    }

    #[test]
    fn test_new_does_not_call_the_api() {
        let credential = Credential::from_value(Some("sk-test".to_string())).unwrap();
        let provider = OpenAIEmbedding::new(
            "text-embedding-3-small".to_string(),
            &credential,
            Some("http://127.0.0.1:9/v1".to_string()),
        )
        .unwrap();
        assert_eq!(provider.model_name(), "text-embedding-3-small");
        assert_eq!(provider.dimensions(), Some(1536));
    }
}
