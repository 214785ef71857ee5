use crate::error::{AgentError, Result};
use crate::llm::tools::{required_arg, LlmTool, ParameterDescriptor, ToolArguments, ToolDescriptor};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://wttr.in";
const TIMEOUT_SECONDS: u64 = 10;

/// Where to fetch weather reports from.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherConfig {
    pub base_url: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// Looks up the current weather for a city using the wttr.in JSON API.
///
/// Exposed to the model as `get_weather(city: str)`.
#[derive(Clone)]
pub struct WeatherTool {
    client: reqwest::Client,
    config: WeatherConfig,
}

impl WeatherTool {
    pub fn new() -> Result<Self> {
        Self::with_config(WeatherConfig::default())
    }

    pub fn with_config(config: WeatherConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECONDS))
            .build()?;

        Ok(Self { client, config })
    }

    async fn fetch_report(&self, city: &str) -> Result<Value> {
        let url = format!(
            "{}/{}?format=j1",
            self.config.base_url.trim_end_matches('/'),
            urlencoding::encode(city)
        );
        debug!(url = %url, "Fetching weather report");

        let response = self.client.get(&url).send().await.map_err(|e| {
            AgentError::ToolError(format!("network problem while querying the weather - {}", e))
        })?;

        if !response.status().is_success() {
            return Err(AgentError::ToolError(format!(
                "weather service returned status {}",
                response.status()
            )));
        }

        Ok(response.json().await?)
    }
}

/// Turn a wttr.in `format=j1` document into a one-line description.
fn describe_weather(city: &str, report: &Value) -> Result<String> {
    let current = &report["current_condition"][0];
    let description = current["weatherDesc"][0]["value"].as_str();
    let temp_c = current["temp_C"].as_str();

    match (description, temp_c) {
        (Some(description), Some(temp_c)) => Ok(format!(
            "{} current weather: {}, temperature {}°C",
            city, description, temp_c
        )),
        _ => Err(AgentError::ToolError(
            "failed to parse weather data, the city name may be invalid".to_string(),
        )),
    }
}

#[async_trait]
impl LlmTool for WeatherTool {
    async fn run(&self, args: &ToolArguments) -> Result<String> {
        let city = required_arg(args, "city")?;
        let report = self.fetch_report(city).await?;
        describe_weather(city, &report)
    }

    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "get_weather".to_string(),
            description: "Look up the real-time weather for the given city.".to_string(),
            parameters: vec![ParameterDescriptor::new("city", "Name of the city, e.g. London")],
        }
    }
}
