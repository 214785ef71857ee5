//! OpenAI-compatible gateway for chat completions.
//!
//! Works against any service exposing the `/chat/completions` endpoint
//! (OpenAI, Volcengine Ark, DeepSeek, local vLLM and so on), with both blocking and
//! server-sent-event streamed responses.

use crate::error::{AgentError, Result};
use crate::llm::gateway::{CompletionConfig, ContentStream, LlmGateway};
use crate::llm::models::LlmMessage;
use async_trait::async_trait;
use futures::stream::StreamExt;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info, warn};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Configuration for connecting to an OpenAI-compatible API.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenAIConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Option<Duration>,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        }
    }
}

impl OpenAIConfig {
    /// Load configuration from `LLM_API_KEY`, `LLM_BASE_URL` and `LLM_TIMEOUT`.
    ///
    /// The API key and base URL are required. `LLM_TIMEOUT` is in seconds and
    /// defaults to 60.
    pub fn from_env() -> Result<Self> {
        let api_key = required_env("LLM_API_KEY")?;
        let base_url = required_env("LLM_BASE_URL")?;

        let timeout_secs = match std::env::var("LLM_TIMEOUT") {
            Ok(raw) => raw.trim().parse::<u64>().map_err(|_| {
                AgentError::ConfigError(format!("LLM_TIMEOUT must be a number of seconds, got '{}'", raw))
            })?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            api_key,
            base_url: normalize_base_url(&base_url),
            timeout: Some(Duration::from_secs(timeout_secs)),
        })
    }

    fn chat_url(&self) -> String {
        format!("{}/chat/completions", normalize_base_url(&self.base_url))
    }
}

/// Reads a non-empty environment variable.
pub(crate) fn required_env(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(AgentError::ConfigError(format!("{} must be set", name))),
    }
}

/// Strip trailing slashes and a trailing `/chat/completions` so callers may
/// pass either the API root or the full endpoint URL.
pub fn normalize_base_url(base_url: &str) -> String {
    let trimmed = base_url.trim().trim_end_matches('/');
    let trimmed = trimmed.strip_suffix("/chat/completions").unwrap_or(trimmed);
    trimmed.trim_end_matches('/').to_string()
}

/// Gateway for OpenAI-compatible chat completion services.
pub struct OpenAIGateway {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIGateway {
    /// Create a new gateway with the given configuration.
    ///
    /// The configured timeout bounds connecting and each read. Blocking
    /// completions are additionally bounded as a whole; streamed completions
    /// may run longer as long as chunks keep arriving.
    pub fn with_config(config: OpenAIConfig) -> Result<Self> {
        let mut client_builder = Client::builder();

        if let Some(timeout) = config.timeout {
            client_builder = client_builder.connect_timeout(timeout).read_timeout(timeout);
        }

        let client = client_builder.build()?;

        Ok(Self { client, config })
    }

    /// Create gateway with custom API key and base URL.
    pub fn with_api_key_and_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self> {
        Self::with_config(OpenAIConfig {
            api_key: api_key.into(),
            base_url: base_url.into(),
            ..Default::default()
        })
    }

    /// Create gateway from the `LLM_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::with_config(OpenAIConfig::from_env()?)
    }

    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }

    fn request_body(
        &self,
        model: &str,
        messages: &[LlmMessage],
        config: &CompletionConfig,
        stream: bool,
    ) -> Result<Value> {
        let mut body = json!({
            "model": model,
            "messages": serde_json::to_value(messages)?,
            "temperature": config.temperature,
            "stream": stream,
        });

        if let Some(max_tokens) = config.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }

        Ok(body)
    }

    async fn send(&self, body: &Value, stream: bool) -> Result<reqwest::Response> {
        let url = self.config.chat_url();
        debug!(url = %url, stream, "Sending chat completion request");

        let mut request = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(body);

        if let (false, Some(timeout)) = (stream, self.config.timeout) {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;

        let status = response.status();
        info!(status = status.as_u16(), "Chat completion response received");

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(status_error(status, &error_text));
        }

        Ok(response)
    }
}

fn status_error(status: StatusCode, body: &str) -> AgentError {
    let hint = match status {
        StatusCode::UNAUTHORIZED => " (API key is invalid or unauthorized)",
        StatusCode::NOT_FOUND => " (model or endpoint does not exist)",
        _ => "",
    };
    AgentError::GatewayError(format!("API returned {}{} - {}", status, hint, body))
}

/// One parsed line of a server-sent-event completion stream.
#[derive(Debug, PartialEq)]
enum SseLine {
    Content(String),
    Done,
    Skip,
}

fn parse_sse_line(line: &str) -> SseLine {
    let Some(data) = line.trim().strip_prefix("data:") else {
        return SseLine::Skip;
    };
    let data = data.trim();

    if data == "[DONE]" {
        return SseLine::Done;
    }

    match serde_json::from_str::<Value>(data) {
        Ok(chunk) => match chunk["choices"][0]["delta"]["content"].as_str() {
            Some(content) if !content.is_empty() => SseLine::Content(content.to_string()),
            _ => SseLine::Skip,
        },
        Err(e) => {
            warn!("Failed to parse streaming chunk: {}", e);
            SseLine::Skip
        }
    }
}

#[async_trait]
impl LlmGateway for OpenAIGateway {
    async fn complete(
        &self,
        model: &str,
        messages: &[LlmMessage],
        config: &CompletionConfig,
    ) -> Result<String> {
        info!(model = model, "Requesting chat completion");
        debug!("Message count: {}", messages.len());

        let body = self.request_body(model, messages, config, false)?;
        let response = self.send(&body, false).await?;
        let response_body: Value = response.json().await?;

        let content = response_body["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| AgentError::GatewayError("No content in response".to_string()))?;

        Ok(content.to_string())
    }

    fn complete_stream<'a>(
        &'a self,
        model: &'a str,
        messages: &'a [LlmMessage],
        config: &'a CompletionConfig,
    ) -> ContentStream<'a> {
        Box::pin(async_stream::stream! {
            info!(model = model, "Starting streamed chat completion");

            let body = match self.request_body(model, messages, config, true) {
                Ok(body) => body,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };

            let response = match self.send(&body, true).await {
                Ok(r) => r,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };

            // Bytes are buffered until a full line arrives so multi-byte
            // characters split across network chunks decode intact.
            let mut stream = response.bytes_stream();
            let mut buffer: Vec<u8> = Vec::new();

            while let Some(chunk_result) = stream.next().await {
                let bytes = match chunk_result {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        yield Err(e.into());
                        return;
                    }
                };
                buffer.extend_from_slice(&bytes);

                while let Some(line_end) = buffer.iter().position(|b| *b == b'\n') {
                    let line: Vec<u8> = buffer.drain(..=line_end).collect();
                    let line = String::from_utf8_lossy(&line);

                    match parse_sse_line(&line) {
                        SseLine::Content(content) => {
                            yield Ok(content);
                        }
                        SseLine::Done => return,
                        SseLine::Skip => {}
                    }
                }
            }

            // A final line may arrive without a trailing newline
            if let SseLine::Content(content) = parse_sse_line(&String::from_utf8_lossy(&buffer)) {
                yield Ok(content);
            }
        })
    }
}
