//! Parsing of model turns in the `Thought:` / `Action:` text protocol.
//!
//! Models are not trusted to stop after one turn: they often continue with an invented
//! `Observation:` and further pairs. [`truncate_turn`] keeps only the first
//! `Thought:`/`Action:` unit, and [`parse_action`] decodes its action expression into an
//! [`Action`].

use crate::llm::tools::ToolArguments;
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

use super::models::Action;

const THOUGHT: &str = "Thought:";
const ACTION: &str = "Action:";
const FINISH: &str = "finish";

/// Why a model turn could not be turned into an [`Action`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionParseError {
    #[error("no Action found in model output")]
    MissingAction,

    #[error("malformed finish action: {expression}")]
    MalformedFinish { expression: String },

    #[error("malformed action '{expression}'")]
    MalformedCall { expression: String },
}

/// A model turn after truncation, with its decoded parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTurn {
    /// The turn as it goes into the transcript.
    pub text: String,
    pub thought: Option<String>,
    pub action: Result<Action, ActionParseError>,
}

fn boundary_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\n\s*(?:Thought:|Action:|Observation:)").expect("valid boundary regex")
    })
}

fn finish_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?s)^finish\s*\(\s*answer\s*=\s*"(.*)"\s*\)"#).expect("valid finish regex")
    })
}

fn call_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)^(\w+)\s*\((.*)\)").expect("valid call regex"))
}

fn argument_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(\w+)\s*=\s*"([^"]*)""#).expect("valid argument regex"))
}

/// Byte offset where the segment starting at `from` ends: the next line that opens
/// with `Thought:`, `Action:` or `Observation:`, or the end of the text.
fn segment_end(text: &str, from: usize) -> usize {
    boundary_regex().find(&text[from..]).map(|m| from + m.start()).unwrap_or(text.len())
}

/// Keep only the first `Thought:` ... `Action:` unit of a raw completion.
///
/// Text before the first `Thought:` and everything after the unit's boundary is dropped,
/// and the result is trimmed. Without a `Thought:`/`Action:` pair the whole text is kept.
pub fn truncate_turn(raw: &str) -> &str {
    let Some(thought_start) = raw.find(THOUGHT) else {
        return raw.trim();
    };
    let Some(action_offset) = raw[thought_start..].find(ACTION) else {
        return raw.trim();
    };

    let action_body = thought_start + action_offset + ACTION.len();
    raw[thought_start..segment_end(raw, action_body)].trim()
}

/// The free text after the first `Thought:`, up to the next marker line.
pub fn extract_thought(turn: &str) -> Option<&str> {
    let start = turn.find(THOUGHT)? + THOUGHT.len();
    let end = segment_end(turn, start);
    let thought = turn[start..end].trim();
    (!thought.is_empty()).then_some(thought)
}

/// The action expression after the first `Action:`, up to the next marker line.
pub fn extract_action(turn: &str) -> Option<&str> {
    let start = turn.find(ACTION)? + ACTION.len();
    let end = segment_end(turn, start);
    let expression = turn[start..end].trim().trim_matches('`').trim();
    (!expression.is_empty()).then_some(expression)
}

fn leading_identifier(expression: &str) -> &str {
    let end = expression
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(expression.len());
    &expression[..end]
}

/// Decode an action expression such as `get_weather(city="London")`.
pub fn parse_action(expression: &str) -> Result<Action, ActionParseError> {
    let expression = expression.trim();

    if leading_identifier(expression) == FINISH {
        return finish_regex()
            .captures(expression)
            .map(|caps| Action::Finish {
                answer: caps[1].to_string(),
            })
            .ok_or_else(|| ActionParseError::MalformedFinish {
                expression: expression.to_string(),
            });
    }

    let caps = call_regex()
        .captures(expression)
        .ok_or_else(|| ActionParseError::MalformedCall {
            expression: expression.to_string(),
        })?;

    let arguments: ToolArguments = argument_regex()
        .captures_iter(&caps[2])
        .map(|arg| (arg[1].to_string(), arg[2].to_string()))
        .collect();

    Ok(Action::Invoke {
        tool_name: caps[1].to_string(),
        arguments,
    })
}

/// Truncate a raw completion and decode its thought and action.
pub fn parse_turn(raw: &str) -> ParsedTurn {
    let text = truncate_turn(raw);
    let action = extract_action(text)
        .ok_or(ActionParseError::MissingAction)
        .and_then(parse_action);

    ParsedTurn {
        text: text.to_string(),
        thought: extract_thought(text).map(str::to_string),
        action,
    }
}
