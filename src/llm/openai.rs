//! OpenAI LLM provider

use async_openai::{
    config::OpenAIConfig,
    types::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs},
    Client,
};
use async_trait::async_trait;
use tracing::info;

use super::Llm;
use crate::config::Credential;

/// OpenAI chat completion provider
pub struct OpenAILlm {
    client: Client<OpenAIConfig>,
    model_name: String,
    max_tokens: u32,
    temperature: f32,
}

impl OpenAILlm {
    /// Create a new OpenAI LLM provider
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

        info!("OpenAI LLM provider: {}", model_name);

        Ok(Self {
            client,
            model_name,
            max_tokens: 512,
            temperature: 0.1,
        })
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

#[async_trait]
impl Llm for OpenAILlm {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn complete(&self, prompt: &str) -> anyhow::Result<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages([ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()?
                .into()])
            .max_tokens(self.max_tokens)
            .temperature(self.temperature)
            .build()?;

        let response = self.client.chat().create(request).await?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .map(|s| s.trim().to_string())
            .unwrap_or_default();

        Ok(content)
    }
}
