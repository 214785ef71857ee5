use crate::error::Result;
use crate::llm::models::LlmMessage;
use async_trait::async_trait;
use futures::stream::Stream;
use std::pin::Pin;

/// Configuration for LLM completion
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionConfig {
    pub temperature: f32,
    pub max_tokens: Option<usize>,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: Some(2000),
        }
    }
}

/// Stream of content fragments produced by a streamed completion.
pub type ContentStream<'a> = Pin<Box<dyn Stream<Item = Result<String>> + Send + 'a>>;

/// Abstract interface for chat completion providers
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Complete an LLM request and return the full text response
    async fn complete(
        &self,
        model: &str,
        messages: &[LlmMessage],
        config: &CompletionConfig,
    ) -> Result<String>;

    /// Complete an LLM request, yielding content fragments as they arrive
    fn complete_stream<'a>(
        &'a self,
        model: &'a str,
        messages: &'a [LlmMessage],
        config: &'a CompletionConfig,
    ) -> ContentStream<'a>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_config_default() {
        let config = CompletionConfig::default();

        assert_eq!(config.temperature, 0.7);
        assert_eq!(config.max_tokens, Some(2000));
    }

    #[test]
    fn test_completion_config_custom() {
        let config = CompletionConfig {
            temperature: 0.0,
            max_tokens: None,
        };

        assert_eq!(config.temperature, 0.0);
        assert_eq!(config.max_tokens, None);
    }
}
