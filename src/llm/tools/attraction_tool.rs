use crate::error::{AgentError, Result};
use crate::llm::tools::{required_arg, LlmTool, ParameterDescriptor, ToolArguments, ToolDescriptor};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://api.tavily.com";
const TIMEOUT_SECONDS: u64 = 30;

/// Credentials and endpoint for the Tavily search API.
#[derive(Debug, Clone, PartialEq)]
pub struct TavilyConfig {
    pub api_key: Option<String>,
    pub base_url: String,
}

impl Default for TavilyConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl TavilyConfig {
    /// Read `TAVILY_API_KEY`. A missing key is not an error here; the tool reports it when called.
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("TAVILY_API_KEY").ok().filter(|k| !k.trim().is_empty()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: String,
}

/// Recommends attractions for a city given its current weather, via Tavily web search.
///
/// Exposed to the model as `get_attraction(city: str, weather: str)`.
#[derive(Clone)]
pub struct AttractionTool {
    client: reqwest::Client,
    config: TavilyConfig,
}

impl AttractionTool {
    pub fn with_config(config: TavilyConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECONDS))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self> {
        Self::with_config(TavilyConfig::from_env())
    }

    async fn search(&self, api_key: &str, query: &str) -> Result<SearchResponse> {
        let url = format!("{}/search", self.config.base_url.trim_end_matches('/'));
        debug!(url = %url, query, "Searching for attractions");

        let response = self
            .client
            .post(&url)
            .json(&json!({
                "api_key": api_key,
                "query": query,
                "search_depth": "basic",
                "include_answer": true,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AgentError::ApiError(format!(
                "search request failed with status {}",
                response.status()
            )));
        }

        Ok(response.json().await?)
    }
}

fn build_query(city: &str, weather: &str) -> String {
    format!(
        "Best tourist attractions to visit in '{}' when the weather is '{}', with reasons",
        city, weather
    )
}

fn summarize(response: SearchResponse) -> String {
    if let Some(answer) = response.answer.filter(|a| !a.trim().is_empty()) {
        return answer;
    }

    let lines: Vec<String> = response
        .results
        .iter()
        .map(|r| format!("- {}: {}", r.title, r.content))
        .collect();

    if lines.is_empty() {
        return "Sorry, no attraction recommendations were found.".to_string();
    }

    format!("Here is what the search found:\n{}", lines.join("\n"))
}

#[async_trait]
impl LlmTool for AttractionTool {
    async fn run(&self, args: &ToolArguments) -> Result<String> {
        let city = required_arg(args, "city")?;
        let weather = required_arg(args, "weather")?;

        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| AgentError::ConfigError("TAVILY_API_KEY is not configured".to_string()))?;

        let response = self.search(api_key, &build_query(city, weather)).await?;
        Ok(summarize(response))
    }

    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "get_attraction".to_string(),
            description: "Search for recommended tourist attractions based on the city and its weather."
                .to_string(),
            parameters: vec![
                ParameterDescriptor::new("city", "Name of the city"),
                ParameterDescriptor::new("weather", "Current weather in that city"),
            ],
        }
    }
}
