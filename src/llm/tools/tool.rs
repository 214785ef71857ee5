use crate::error::{AgentError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Named string arguments passed to a tool, as written in an `Action:` line.
pub type ToolArguments = HashMap<String, String>;

/// Describes one named parameter of a tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    pub name: String,
    pub description: String,
}

impl ParameterDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Descriptor for a tool, rendered into the system prompt so the model knows how to call it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub parameters: Vec<ParameterDescriptor>,
}

impl ToolDescriptor {
    /// Call signature in the action syntax, e.g. `get_weather(city: str)`.
    pub fn signature(&self) -> String {
        let params: Vec<String> =
            self.parameters.iter().map(|p| format!("{}: str", p.name)).collect();
        format!("{}({})", self.name, params.join(", "))
    }
}

/// Trait for tools the ReAct loop can invoke
#[async_trait]
pub trait LlmTool: Send + Sync {
    /// Execute the tool with given arguments
    async fn run(&self, args: &ToolArguments) -> Result<String>;

    /// Get tool descriptor for the system prompt
    fn descriptor(&self) -> ToolDescriptor;

    /// Check if this tool matches the given name
    fn matches(&self, name: &str) -> bool {
        self.descriptor().name == name
    }
}

/// Fetch a required argument, rejecting missing or blank values.
pub fn required_arg<'a>(args: &'a ToolArguments, name: &str) -> Result<&'a str> {
    match args.get(name).map(|v| v.trim()) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(AgentError::InvalidArgument(format!("missing required argument '{}'", name))),
    }
}
