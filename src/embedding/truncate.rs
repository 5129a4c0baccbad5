//! Token truncation using tiktoken

use tiktoken_rs::{cl100k_base, CoreBPE};
use tracing::warn;

/// Token limits for OpenAI embedding models
pub fn get_token_limit(model_name: &str) -> usize {
    match model_name {
        "text-embedding-3-small" | "text-embedding-3-large" | "text-embedding-ada-002" => 8191,
        // Conservative default for OpenAI-compatible servers
        _ => 2048,
    }
}

/// Truncates texts to a model's token limit before embedding
pub struct Truncator {
    bpe: CoreBPE,
    token_limit: usize,
}

impl Truncator {
    pub fn new(token_limit: usize) -> anyhow::Result<Self> {
        Ok(Self {
            bpe: cl100k_base()?,
            token_limit,
        })
    }

    pub fn for_model(model_name: &str) -> anyhow::Result<Self> {
        Self::new(get_token_limit(model_name))
    }

    /// Truncate texts to fit within the token limit
    pub fn truncate(&self, texts: &[&str]) -> Vec<String> {
        let mut truncated = Vec::with_capacity(texts.len());
        let mut truncation_count = 0;
        let mut total_tokens_removed = 0;

        for (i, text) in texts.iter().enumerate() {
            let tokens = self.bpe.encode_with_special_tokens(text);
            let original_length = tokens.len();

            if original_length <= self.token_limit {
                truncated.push(text.to_string());
                continue;
            }

            let kept: Vec<_> = tokens.into_iter().take(self.token_limit).collect();
            let truncated_text = self.bpe.decode(kept).unwrap_or_else(|_| {
                let mut end = text.len().min(self.token_limit * 4);
                while !text.is_char_boundary(end) {
                    end -= 1;
                }
                text[..end].to_string()
            });
            truncated.push(truncated_text);

            truncation_count += 1;
            total_tokens_removed += original_length - self.token_limit;

            if truncation_count <= 3 {
                warn!(
                    "Text {} truncated: {} → {} tokens ({} removed)",
                    i + 1,
                    original_length,
                    self.token_limit,
                    original_length - self.token_limit
                );
            }
        }

        if truncation_count > 3 {
            warn!(
                "Truncation summary: {}/{} texts truncated ({} tokens removed total)",
                truncation_count,
                texts.len(),
                total_tokens_removed
            );
        }

        truncated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_limit_lookup() {
        assert_eq!(get_token_limit("text-embedding-3-small"), 8191);
        assert_eq!(get_token_limit("unknown-model"), 2048);
    }

    #[test]
    fn test_short_text_untouched() {
        let truncator = Truncator::new(100).unwrap();
        let result = truncator.truncate(&["Hello world"]);
        assert_eq!(result, vec!["Hello world".to_string()]);
    }

    #[test]
    fn test_long_text_truncated() {
        let truncator = Truncator::new(10).unwrap();
        let long = "alpha beta gamma delta ".repeat(50);
        let result = truncator.truncate(&[long.as_str()]);
        assert!(result[0].len() < long.len());
        assert!(long.starts_with(&result[0]));
    }
}
