//! Travel Assistant Example
//!
//! Runs the ReAct loop against a real OpenAI-compatible endpoint with two tools:
//! `get_weather` (wttr.in) and `get_attraction` (Tavily search).
//!
//! # Usage
//!
//! ```bash
//! cargo run --example travel_assistant -- "What's the weather in London today, and where should I go?"
//! ```
//!
//! # Requirements
//!
//! - `LLM_MODEL_ID`, `LLM_API_KEY` and `LLM_BASE_URL` set (a `.env` file works)
//! - `TAVILY_API_KEY` for attraction recommendations

use hello_agents::prelude::*;
use hello_agents::react::TranscriptEntry;
use std::sync::Arc;

const DEFAULT_REQUEST: &str =
    "Hi, please check today's weather in London, then recommend a suitable tourist attraction.";

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("hello_agents=info".parse()?),
        )
        .init();

    let llm = Arc::new(LlmBroker::from_env()?);

    let mut tools = ToolRegistry::new();
    tools.register(WeatherTool::new()?)?;
    tools.register(AttractionTool::from_env()?)?;

    let agent = ReactAgent::new(llm, tools, ReactConfig::default())?;

    let request = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_REQUEST.to_string());
    println!("User request: {}\n{}", request, "=".repeat(40));

    let run = agent.run(&request).await;

    for entry in run.transcript.entries().iter().skip(1) {
        match entry {
            TranscriptEntry::ModelTurn(text) => println!("Model output:\n{}\n", text),
            TranscriptEntry::Observation(text) => {
                println!("Observation: {}\n{}", text, "=".repeat(40))
            }
            TranscriptEntry::UserRequest(_) => {}
        }
    }

    match run.answer() {
        Some(answer) => println!("Task complete, final answer: {}", answer),
        None => println!("Run ended without an answer: {}", run.outcome),
    }

    Ok(())
}
