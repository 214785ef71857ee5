pub mod openai;

pub use openai::{normalize_base_url, OpenAIConfig, OpenAIGateway};
