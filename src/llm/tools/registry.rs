//! Name-indexed collection of tools available to the ReAct loop.

use crate::error::{AgentError, Result};
use crate::llm::broker::ERROR_PREFIX;
use crate::llm::tools::{LlmTool, ToolArguments, ToolDescriptor};
use std::sync::Arc;
use tracing::{info, warn};

/// Tools registered once at startup and looked up by name.
///
/// [`ToolRegistry::invoke`] is the dispatch boundary: unknown names and tool failures
/// come back as `Error: ...` observations instead of errors.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn LlmTool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Names must be unique.
    pub fn register(&mut self, tool: impl LlmTool + 'static) -> Result<()> {
        self.register_arc(Arc::new(tool))
    }

    pub fn register_arc(&mut self, tool: Arc<dyn LlmTool>) -> Result<()> {
        let name = tool.descriptor().name;
        if self.get(&name).is_some() {
            return Err(AgentError::ConfigError(format!("tool '{}' is already registered", name)));
        }
        self.tools.push(tool);
        Ok(())
    }

    /// Builder-style registration for setup code.
    pub fn with_tool(mut self, tool: impl LlmTool + 'static) -> Result<Self> {
        self.register(tool)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn LlmTool>> {
        self.tools.iter().find(|t| t.matches(name))
    }

    /// Descriptors in registration order.
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.tools.iter().map(|t| t.descriptor()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Dispatch a call and return the observation text.
    pub async fn invoke(&self, name: &str, args: &ToolArguments) -> String {
        let Some(tool) = self.get(name) else {
            let observation = undefined_tool(name);
            warn!(tool = name, "{}", observation);
            return observation;
        };

        info!(tool = name, ?args, "Invoking tool");
        match tool.run(args).await {
            Ok(output) => {
                info!(tool = name, "Tool returned: {}", output);
                output
            }
            Err(e) => {
                warn!(tool = name, "Tool failed: {}", e);
                format!("{} tool '{}' failed - {}", ERROR_PREFIX, name, e)
            }
        }
    }
}

/// Observation reported when the model names a tool nobody registered.
pub fn undefined_tool(name: &str) -> String {
    format!("{} undefined tool '{}'", ERROR_PREFIX, name)
}
