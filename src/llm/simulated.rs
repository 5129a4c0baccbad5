//! Simulated LLM for testing
//!
//! Answers extractively: returns the context sentence sharing the most words
//! with the query, without requiring external API calls.

use async_trait::async_trait;
use rustc_hash::FxHashSet;

use super::prompt::QaPrompt;
use super::Llm;

/// Simulated LLM provider for testing
pub struct SimulatedLlm {
    model_name: String,
}

impl SimulatedLlm {
    pub fn new() -> Self {
        Self {
            model_name: "simulated".to_string(),
        }
    }

    fn answer(prompt: &QaPrompt) -> Option<String> {
        let query_words = words(&prompt.query);

        // First sentence wins ties
        let mut best: Option<(usize, &str)> = None;
        for passage in &prompt.context {
            for sentence in split_sentences(passage) {
                let overlap = words(sentence).intersection(&query_words).count();
                if overlap > best.map_or(0, |(b, _)| b) {
                    best = Some((overlap, sentence));
                }
            }
        }

        best.map(|(_, sentence)| sentence.to_string())
    }
}

impl Default for SimulatedLlm {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Llm for SimulatedLlm {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn complete(&self, prompt: &str) -> anyhow::Result<String> {
        let response = QaPrompt::parse(prompt)
            .and_then(|p| Self::answer(&p))
            .unwrap_or_else(|| {
                "I could not find an answer in the provided context.".to_string()
            });
        Ok(response)
    }
}

fn words(text: &str) -> FxHashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn split_sentences(text: &str) -> Vec<&str> {
    text.split_inclusive(&['.', '!', '?', '\n'][..])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_extracts_best_sentence() {
        let llm = SimulatedLlm::new();
        let prompt = QaPrompt::new(
            vec!["Grass is green. The sky is blue.".into(), "Rust is fast.".into()],
            "What color is the sky?",
        );
        let answer = llm.complete(&prompt.render()).await.unwrap();
        assert_eq!(answer, "The sky is blue.");
    }

    #[tokio::test]
    async fn test_no_context_fallback() {
        let llm = SimulatedLlm::new();
        let answer = llm.complete("hello").await.unwrap();
        assert!(!answer.is_empty());
    }
}
