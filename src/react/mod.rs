//! ReAct pattern implementation module.
//!
//! A text-protocol Reason-Act-Observe loop: the model answers each prompt with one
//! `Thought:`/`Action:` pair, the loop dispatches the action to a registered tool, and
//! the result is fed back as an `Observation:` line until the model calls `finish`.
//!
//! # Components
//!
//! - **Models**: transcript, actions, loop states and the run report
//! - **Parser**: truncation of over-long model turns and action decoding
//! - **Formatters**: the system prompt describing tools and the action format
//! - **Agent**: the loop controller
//!
//! # Example
//!
//! See `demos/travel_assistant.rs` for a complete working example.

pub mod agent;
pub mod formatters;
pub mod models;
pub mod parser;

pub use agent::{ReactAgent, ReactConfig};
pub use formatters::{format_available_tools, format_system_prompt};
pub use models::{Action, LoopState, ReactOutcome, ReactRun, Transcript, TranscriptEntry};
pub use parser::{parse_action, parse_turn, truncate_turn, ActionParseError, ParsedTurn};
