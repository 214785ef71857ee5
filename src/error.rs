//! Error types and result aliases for the hello-agents library.
//!
//! This module defines the core error type [`AgentError`] and the [`Result`] type alias
//! used throughout the library. Gateways and tools return `Result<T>`; the broker and the
//! tool registry are the boundaries where errors are turned into plain-text observations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("LLM gateway error: {0}")]
    GatewayError(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Tool error: {0}")]
    ToolError(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

pub type Result<T> = std::result::Result<T, AgentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_error_display() {
        let err = AgentError::GatewayError("connection failed".to_string());
        assert_eq!(err.to_string(), "LLM gateway error: connection failed");
    }

    #[test]
    fn test_tool_error_display() {
        let err = AgentError::ToolError("invalid parameters".to_string());
        assert_eq!(err.to_string(), "Tool error: invalid parameters");
    }

    #[test]
    fn test_invalid_argument_display() {
        let err = AgentError::InvalidArgument("city is required".to_string());
        assert_eq!(err.to_string(), "Invalid argument: city is required");
    }

    #[test]
    fn test_config_error_display() {
        let err = AgentError::ConfigError("missing API key".to_string());
        assert_eq!(err.to_string(), "Invalid configuration: missing API key");
    }

    #[test]
    fn test_serialization_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: AgentError = json_err.into();

        match err {
            AgentError::SerializationError(_) => {}
            _ => panic!("Expected SerializationError"),
        }
    }

    #[test]
    fn test_result_type() {
        let ok_result: Result<i32> = Ok(42);
        assert!(ok_result.is_ok());

        let err_result: Result<i32> = Err(AgentError::ApiError("rate limited".to_string()));
        assert!(err_result.is_err());
    }
}
