pub mod broker;
pub mod gateway;
pub mod gateways;
pub mod models;
pub mod tools;

pub use broker::LlmBroker;
pub use gateway::{CompletionConfig, ContentStream, LlmGateway};
pub use models::{LlmMessage, MessageRole};
pub use tools::{LlmTool, ToolArguments, ToolDescriptor, ToolRegistry};
