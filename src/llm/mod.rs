//! LLM module - language model providers for RAG

mod openai;
mod prompt;
mod simulated;

pub use openai::OpenAILlm;
pub use prompt::QaPrompt;
pub use simulated::SimulatedLlm;

use async_trait::async_trait;

use crate::config::Settings;

/// Trait for completion providers
#[async_trait]
pub trait Llm: Send + Sync {
    fn model_name(&self) -> &str;

    /// Generate a response for a single prompt
    async fn complete(&self, prompt: &str) -> anyhow::Result<String>;
}

/// Create the completion provider for `model` from settings
pub fn create_llm(settings: &Settings, model: &str) -> anyhow::Result<Box<dyn Llm>> {
    let llm = OpenAILlm::new(
        model.to_string(),
        &settings.credential,
        settings.api_base.clone(),
    )?
    .with_max_tokens(settings.llm.max_tokens)
    .with_temperature(settings.llm.temperature);
    Ok(Box::new(llm))
}
