use crate::error::Result;
use crate::llm::tools::{LlmTool, ParameterDescriptor, ToolArguments, ToolDescriptor};
use async_trait::async_trait;

type ToolFn = dyn Fn(&ToolArguments) -> Result<String> + Send + Sync;

/// Wraps a plain closure as an [`LlmTool`].
///
/// Handy for small local capabilities and for scripting tool behaviour in tests.
///
/// ```ignore
/// let echo = FnTool::new("echo", "Repeat the text back", |args| {
///     Ok(required_arg(args, "text")?.to_string())
/// })
/// .with_parameter("text", "Text to repeat");
/// ```
pub struct FnTool {
    descriptor: ToolDescriptor,
    func: Box<ToolFn>,
}

impl FnTool {
    pub fn new<F>(name: impl Into<String>, description: impl Into<String>, func: F) -> Self
    where
        F: Fn(&ToolArguments) -> Result<String> + Send + Sync + 'static,
    {
        Self {
            descriptor: ToolDescriptor {
                name: name.into(),
                description: description.into(),
                parameters: vec![],
            },
            func: Box::new(func),
        }
    }

    /// Declare a parameter for the prompt's tool listing
    pub fn with_parameter(
        mut self,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        self.descriptor.parameters.push(ParameterDescriptor::new(name, description));
        self
    }
}

#[async_trait]
impl LlmTool for FnTool {
    async fn run(&self, args: &ToolArguments) -> Result<String> {
        (self.func)(args)
    }

    fn descriptor(&self) -> ToolDescriptor {
        self.descriptor.clone()
    }
}
