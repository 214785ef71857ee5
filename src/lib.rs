pub mod error;
pub mod llm;
pub mod react;

pub use error::{AgentError, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{AgentError, Result};
    pub use crate::llm::gateways::{OpenAIConfig, OpenAIGateway};
    pub use crate::llm::tools::{
        AttractionTool, FnTool, LlmTool, TavilyConfig, ToolArguments, ToolDescriptor,
        ToolRegistry, WeatherTool,
    };
    pub use crate::llm::{CompletionConfig, LlmBroker, LlmGateway, LlmMessage, MessageRole};
    pub use crate::react::{ReactAgent, ReactConfig, ReactOutcome, ReactRun};
}
