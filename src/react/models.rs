//! Data models for the ReAct loop.
//!
//! This module defines the transcript that drives each model call, the loop's states,
//! and the report returned at the end of a run.

use crate::llm::tools::ToolArguments;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// An action decoded from a model turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    /// `finish(answer="...")`
    Finish { answer: String },
    /// `tool_name(key="value", ...)`
    Invoke {
        tool_name: String,
        arguments: ToolArguments,
    },
}

/// States of the ReAct control loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LoopState {
    Thinking,
    Acting,
    Observing,
    Done,
    Failed,
}

impl LoopState {
    /// Whether the loop may move from `self` to `next`.
    pub fn allows(self, next: LoopState) -> bool {
        matches!(
            (self, next),
            (LoopState::Thinking, LoopState::Acting)
                | (LoopState::Acting, LoopState::Done)
                | (LoopState::Acting, LoopState::Failed)
                | (LoopState::Acting, LoopState::Observing)
                | (LoopState::Observing, LoopState::Thinking)
                | (LoopState::Observing, LoopState::Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, LoopState::Done | LoopState::Failed)
    }
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoopState::Thinking => "THINKING",
            LoopState::Acting => "ACTING",
            LoopState::Observing => "OBSERVING",
            LoopState::Done => "DONE",
            LoopState::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

/// One entry of the transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum TranscriptEntry {
    UserRequest(String),
    ModelTurn(String),
    Observation(String),
}

impl TranscriptEntry {
    /// The line(s) this entry contributes to the prompt.
    pub fn render(&self) -> String {
        match self {
            TranscriptEntry::UserRequest(text) => format!("User request: {}", text),
            TranscriptEntry::ModelTurn(text) => text.clone(),
            TranscriptEntry::Observation(text) => format!("Observation: {}", text),
        }
    }
}

/// Append-only history of one run.
///
/// Starts with the user request, then alternates model turn and observation.
/// Only the push methods build one, so the alternation holds for every instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new(user_request: impl Into<String>) -> Self {
        Self {
            entries: vec![TranscriptEntry::UserRequest(user_request.into())],
        }
    }

    pub fn push_model_turn(&mut self, text: impl Into<String>) {
        debug_assert!(
            !matches!(self.entries.last(), Some(TranscriptEntry::ModelTurn(_))),
            "two model turns in a row"
        );
        self.entries.push(TranscriptEntry::ModelTurn(text.into()));
    }

    pub fn push_observation(&mut self, text: impl Into<String>) {
        debug_assert!(
            matches!(self.entries.last(), Some(TranscriptEntry::ModelTurn(_))),
            "observation without a preceding model turn"
        );
        self.entries.push(TranscriptEntry::Observation(text.into()));
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn observations(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(|e| match e {
            TranscriptEntry::Observation(text) => Some(text.as_str()),
            _ => None,
        })
    }

    /// Newline-joined prompt text sent to the model.
    pub fn render(&self) -> String {
        self.entries.iter().map(TranscriptEntry::render).collect::<Vec<_>>().join("\n")
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReactOutcome {
    /// The model emitted `finish(answer="...")`.
    Finished { answer: String },
    /// No `Action:` could be found; carries the untruncated model output.
    ParseFailed { raw_output: String },
    /// The action started with `finish` but did not match `finish(answer="...")`.
    MalformedFinish { action: String },
    /// The iteration ceiling was reached without a `finish`.
    BudgetExhausted { iterations: usize },
}

impl fmt::Display for ReactOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReactOutcome::Finished { answer } => write!(f, "finished: {}", answer),
            ReactOutcome::ParseFailed { raw_output } => {
                write!(f, "parse error, no Action found in model output: {}", raw_output)
            }
            ReactOutcome::MalformedFinish { action } => {
                write!(f, "malformed finish action: {}", action)
            }
            ReactOutcome::BudgetExhausted { iterations } => {
                write!(f, "incomplete, no answer after {} iterations", iterations)
            }
        }
    }
}

/// Report of a single ReAct run.
#[derive(Debug, Clone, Serialize)]
pub struct ReactRun {
    pub run_id: Uuid,
    pub outcome: ReactOutcome,
    pub final_state: LoopState,
    pub iterations: usize,
    pub transcript: Transcript,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
}

impl ReactRun {
    pub fn answer(&self) -> Option<&str> {
        match &self.outcome {
            ReactOutcome::Finished { answer } => Some(answer),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.final_state == LoopState::Done
    }
}
