//! Streaming LLM Client Example
//!
//! Sends one chat request to an OpenAI-compatible endpoint and prints the
//! response as it streams in.
//!
//! Run with: cargo run --example llm_client

use futures::stream::StreamExt;
use hello_agents::prelude::*;
use std::io::Write;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let broker = LlmBroker::from_env()?;

    let messages = vec![
        LlmMessage::system("You are a helpful assistant that writes Rust code."),
        LlmMessage::user("Write a quicksort function."),
    ];
    let config = CompletionConfig {
        temperature: 0.0,
        max_tokens: None,
    };

    println!("Calling {} ...", broker.model());

    let mut stream = broker.generate_stream(&messages, &config);
    while let Some(chunk) = stream.next().await {
        match chunk {
            Ok(text) => {
                print!("{}", text);
                std::io::stdout().flush()?;
            }
            Err(e) => {
                eprintln!("\nError: {}", e);
                break;
            }
        }
    }

    println!();
    Ok(())
}
