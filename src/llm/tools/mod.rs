pub mod attraction_tool;
pub mod fn_tool;
pub mod registry;
mod tool;
pub mod weather_tool;

pub use attraction_tool::{AttractionTool, TavilyConfig};
pub use fn_tool::FnTool;
pub use registry::ToolRegistry;
pub use tool::{required_arg, LlmTool, ParameterDescriptor, ToolArguments, ToolDescriptor};
pub use weather_tool::{WeatherConfig, WeatherTool};
