use crate::error::{AgentError, Result};
use crate::llm::gateway::{CompletionConfig, ContentStream, LlmGateway};
use crate::llm::gateways::openai::{required_env, OpenAIGateway};
use crate::llm::models::LlmMessage;
use futures::stream::StreamExt;
use std::sync::Arc;
use tracing::{error, info};

/// Prefix marking a completion that is really a transport failure.
pub const ERROR_PREFIX: &str = "Error:";

/// Main interface for LLM interactions.
///
/// Binds a model id to a gateway. [`LlmBroker::generate_text`] is the boundary used by
/// the ReAct loop: it never fails, and reports transport problems as plain text so they
/// can be appended to a transcript like any other model turn.
pub struct LlmBroker {
    model: String,
    gateway: Arc<dyn LlmGateway>,
}

impl LlmBroker {
    /// Create a new LLM broker
    pub fn new(model: impl Into<String>, gateway: Arc<dyn LlmGateway>) -> Self {
        Self {
            model: model.into(),
            gateway,
        }
    }

    /// Build a broker over an [`OpenAIGateway`] configured from the environment.
    ///
    /// Reads `LLM_MODEL_ID` plus the variables documented on
    /// [`OpenAIConfig::from_env`](crate::llm::gateways::OpenAIConfig::from_env).
    pub fn from_env() -> Result<Self> {
        let model = required_env("LLM_MODEL_ID")?;
        let gateway = OpenAIGateway::from_env()?;
        Ok(Self::new(model, Arc::new(gateway)))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generate a text response from the LLM
    pub async fn generate(
        &self,
        messages: &[LlmMessage],
        config: Option<CompletionConfig>,
    ) -> Result<String> {
        let config = config.unwrap_or_default();
        self.gateway.complete(&self.model, messages, &config).await
    }

    /// Generate a streaming text response from the LLM
    ///
    /// # Example
    ///
    /// ```ignore
    /// use futures::stream::StreamExt;
    ///
    /// let messages = vec![LlmMessage::user("Write a quicksort in Rust")];
    /// let config = CompletionConfig::default();
    /// let mut stream = broker.generate_stream(&messages, &config);
    /// while let Some(chunk) = stream.next().await {
    ///     print!("{}", chunk?);
    /// }
    /// ```
    pub fn generate_stream<'a>(
        &'a self,
        messages: &'a [LlmMessage],
        config: &'a CompletionConfig,
    ) -> ContentStream<'a> {
        self.gateway.complete_stream(&self.model, messages, config)
    }

    /// Run a streamed completion to the end and return the concatenated content.
    pub async fn generate_drained(
        &self,
        messages: &[LlmMessage],
        config: Option<CompletionConfig>,
    ) -> Result<String> {
        let config = config.unwrap_or_default();
        let mut stream = self.generate_stream(messages, &config);
        let mut content = String::new();

        while let Some(chunk) = stream.next().await {
            content.push_str(&chunk?);
        }

        Ok(content)
    }

    /// Send a system prompt and a user prompt, returning the completion text.
    ///
    /// Failures are returned as text starting with [`ERROR_PREFIX`] rather than as `Err`.
    pub async fn generate_text(
        &self,
        system_prompt: &str,
        prompt: &str,
        config: Option<CompletionConfig>,
        stream: bool,
    ) -> String {
        let messages = vec![LlmMessage::system(system_prompt), LlmMessage::user(prompt)];
        info!(model = %self.model, stream, "Calling language model");

        let result = if stream {
            self.generate_drained(&messages, config).await
        } else {
            self.generate(&messages, config).await
        };

        match result {
            Ok(content) => content,
            Err(e) => {
                error!(model = %self.model, "Language model call failed: {}", e);
                describe_failure(&e)
            }
        }
    }
}

fn describe_failure(err: &AgentError) -> String {
    format!("{} failed to call the language model service - {}", ERROR_PREFIX, err)
}
