//! The ReAct loop controller.
//!
//! Each iteration renders the transcript, asks the model for one `Thought:`/`Action:`
//! turn, and either finishes, fails, or dispatches a tool and appends its observation.

use crate::error::{AgentError, Result};
use crate::llm::broker::ERROR_PREFIX;
use crate::llm::{CompletionConfig, LlmBroker, ToolRegistry};
use chrono::Local;
use std::sync::Arc;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::formatters::{format_system_prompt, DEFAULT_ROLE};
use super::models::{Action, LoopState, ReactOutcome, ReactRun, Transcript};
use super::parser::{parse_turn, ActionParseError};

/// Settings for a [`ReactAgent`].
#[derive(Debug, Clone)]
pub struct ReactConfig {
    /// Upper bound on model calls per run
    pub max_iterations: usize,
    /// Overrides the generated system prompt
    pub system_prompt: Option<String>,
    /// Consume the completion as a stream, drained before parsing
    pub stream: bool,
    pub completion: CompletionConfig,
}

impl Default for ReactConfig {
    fn default() -> Self {
        Self {
            max_iterations: 5,
            system_prompt: None,
            stream: false,
            completion: CompletionConfig::default(),
        }
    }
}

/// Runs the Reason-Act-Observe loop against one broker and one tool registry.
///
/// Runs are strictly sequential: one model call or tool call is outstanding at a time.
pub struct ReactAgent {
    llm: Arc<LlmBroker>,
    tools: ToolRegistry,
    config: ReactConfig,
    system_prompt: String,
}

impl ReactAgent {
    pub fn new(llm: Arc<LlmBroker>, tools: ToolRegistry, config: ReactConfig) -> Result<Self> {
        if config.max_iterations == 0 {
            return Err(AgentError::ConfigError("max_iterations must be at least 1".to_string()));
        }

        let system_prompt = config
            .system_prompt
            .clone()
            .unwrap_or_else(|| format_system_prompt(DEFAULT_ROLE, &tools.descriptors()));

        Ok(Self {
            llm,
            tools,
            config,
            system_prompt,
        })
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn config(&self) -> &ReactConfig {
        &self.config
    }

    /// Answer a user request, returning a report of how the run went.
    ///
    /// Parse failures and budget exhaustion are reported in [`ReactRun::outcome`];
    /// they never surface as errors.
    pub async fn run(&self, user_request: &str) -> ReactRun {
        let run_id = Uuid::new_v4();
        let span = info_span!("react_run", %run_id);
        self.run_loop(run_id, user_request).instrument(span).await
    }

    async fn run_loop(&self, run_id: Uuid, user_request: &str) -> ReactRun {
        let started_at = Local::now();
        let mut transcript = Transcript::new(user_request);
        let mut state = LoopState::Thinking;
        let mut iterations = 0;

        info!(user_request, "Starting ReAct run");

        let outcome = loop {
            iterations += 1;
            info!(iteration = iterations, max = self.config.max_iterations, "Thinking");

            let prompt = transcript.render();
            debug!("Prompt:\n{}", prompt);

            let raw = self
                .llm
                .generate_text(
                    &self.system_prompt,
                    &prompt,
                    Some(self.config.completion.clone()),
                    self.config.stream,
                )
                .await;
            debug!("Raw model output:\n{}", raw);

            advance(&mut state, LoopState::Acting);
            let turn = parse_turn(&raw);
            if turn.text != raw.trim() {
                info!("Truncated extra Thought-Action pairs from model output");
            }
            if let Some(thought) = &turn.thought {
                info!(thought = %thought, "Model thought");
            }
            transcript.push_model_turn(turn.text);

            let observation = match turn.action {
                Ok(Action::Finish { answer }) => {
                    advance(&mut state, LoopState::Done);
                    info!(answer = %answer, "Task complete");
                    break ReactOutcome::Finished { answer };
                }
                Ok(Action::Invoke {
                    tool_name,
                    arguments,
                }) => {
                    advance(&mut state, LoopState::Observing);
                    self.tools.invoke(&tool_name, &arguments).await
                }
                Err(ActionParseError::MalformedCall { expression }) => {
                    advance(&mut state, LoopState::Observing);
                    warn!(action = %expression, "Could not decode tool call");
                    format!("{} malformed action '{}'", ERROR_PREFIX, expression)
                }
                Err(ActionParseError::MalformedFinish { expression }) => {
                    advance(&mut state, LoopState::Failed);
                    warn!(action = %expression, "finish action is malformed");
                    break ReactOutcome::MalformedFinish { action: expression };
                }
                Err(ActionParseError::MissingAction) => {
                    advance(&mut state, LoopState::Failed);
                    error!(output = %raw, "Parse error: no Action found in model output");
                    break ReactOutcome::ParseFailed { raw_output: raw };
                }
            };

            info!(observation = %observation, "Observation");
            transcript.push_observation(observation);

            if iterations >= self.config.max_iterations {
                advance(&mut state, LoopState::Failed);
                warn!(iterations, "Iteration budget exhausted without a final answer");
                break ReactOutcome::BudgetExhausted { iterations };
            }
            advance(&mut state, LoopState::Thinking);
        };

        ReactRun {
            run_id,
            outcome,
            final_state: state,
            iterations,
            transcript,
            started_at,
            finished_at: Local::now(),
        }
    }
}

fn advance(state: &mut LoopState, next: LoopState) {
    debug_assert!(state.allows(next), "illegal transition {} -> {}", state, next);
    debug!(from = %state, to = %next, "State transition");
    *state = next;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::gateway::{ContentStream, LlmGateway};
    use crate::llm::models::LlmMessage;
    use crate::llm::tools::{required_arg, FnTool};
    use crate::react::models::TranscriptEntry;
    use async_trait::async_trait;
    use futures::stream;
    use std::sync::Mutex;

    /// Replies with scripted completions in order, repeating the last one.
    struct ScriptedGateway {
        replies: Vec<Result<String>>,
        prompts: Mutex<Vec<Vec<LlmMessage>>>,
    }

    impl ScriptedGateway {
        fn new(replies: &[&str]) -> Self {
            Self {
                replies: replies.iter().map(|r| Ok(r.to_string())).collect(),
                prompts: Mutex::new(vec![]),
            }
        }

        fn failing() -> Self {
            Self {
                replies: vec![Err(AgentError::GatewayError("connection refused".to_string()))],
                prompts: Mutex::new(vec![]),
            }
        }

        fn next_reply(&self, messages: &[LlmMessage]) -> Result<String> {
            let mut prompts = self.prompts.lock().unwrap();
            let idx = prompts.len().min(self.replies.len() - 1);
            prompts.push(messages.to_vec());
            match &self.replies[idx] {
                Ok(text) => Ok(text.clone()),
                Err(e) => Err(AgentError::GatewayError(e.to_string())),
            }
        }

        fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }

        fn user_prompt(&self, call: usize) -> String {
            self.prompts.lock().unwrap()[call][1].content.clone()
        }
    }

    #[async_trait]
    impl LlmGateway for ScriptedGateway {
        async fn complete(
            &self,
            _model: &str,
            messages: &[LlmMessage],
            _config: &CompletionConfig,
        ) -> Result<String> {
            self.next_reply(messages)
        }

        fn complete_stream<'a>(
            &'a self,
            _model: &'a str,
            messages: &'a [LlmMessage],
            _config: &'a CompletionConfig,
        ) -> ContentStream<'a> {
            let reply = self.next_reply(messages);
            Box::pin(stream::iter(vec![reply]))
        }
    }

    fn weather_registry() -> ToolRegistry {
        ToolRegistry::new()
            .with_tool(
                FnTool::new("get_weather", "Look up the weather", |args| {
                    let city = required_arg(args, "city")?;
                    Ok(format!("{} current weather: Sunny, temperature 21°C", city))
                })
                .with_parameter("city", "City name"),
            )
            .unwrap()
    }

    fn agent_with(gateway: Arc<ScriptedGateway>, config: ReactConfig) -> ReactAgent {
        let broker = Arc::new(LlmBroker::new("test-model", gateway));
        ReactAgent::new(broker, weather_registry(), config).unwrap()
    }

    #[tokio::test]
    async fn test_weather_then_finish_scenario() {
        let gateway = Arc::new(ScriptedGateway::new(&[
            "Thought: I need London's weather.\nAction: get_weather(city=\"London\")",
            "Thought: I have the weather.\nAction: finish(answer=\"London is sunny at 21°C\")",
        ]));
        let agent = agent_with(gateway.clone(), ReactConfig::default());

        let run = agent.run("Check today's weather in London").await;

        assert_eq!(run.final_state, LoopState::Done);
        assert_eq!(run.answer(), Some("London is sunny at 21°C"));
        assert!(run.is_success());
        assert_eq!(run.iterations, 2);
        assert_eq!(gateway.calls(), 2);

        let entries = run.transcript.entries();
        assert_eq!(entries.len(), 4);
        assert_eq!(
            entries[2],
            TranscriptEntry::Observation("London current weather: Sunny, temperature 21°C".to_string())
        );
        assert!(gateway
            .user_prompt(1)
            .ends_with("Observation: London current weather: Sunny, temperature 21°C"));
        assert!(gateway.user_prompt(0).starts_with("User request: Check today's weather in London"));
    }

    #[tokio::test]
    async fn test_chinese_request_weather_then_bare_finish() {
        let gateway = Arc::new(ScriptedGateway::new(&[
            "Thought: 需要先查询伦敦的天气。\nAction: get_weather(city=\"London\")",
            "Action: finish(answer=\"伦敦今天晴，21°C\")",
        ]));
        let agent = agent_with(gateway.clone(), ReactConfig::default());

        let run = agent.run("查询伦敦天气").await;

        assert_eq!(run.final_state, LoopState::Done);
        assert_eq!(run.answer(), Some("伦敦今天晴，21°C"));
        assert_eq!(run.iterations, 2);
        assert_eq!(
            run.transcript.observations().collect::<Vec<_>>(),
            vec!["London current weather: Sunny, temperature 21°C"]
        );
        assert!(gateway.user_prompt(0).starts_with("User request: 查询伦敦天气"));
        assert!(gateway
            .user_prompt(1)
            .ends_with("Observation: London current weather: Sunny, temperature 21°C"));
    }

    #[tokio::test]
    async fn test_extra_pairs_are_truncated_before_dispatch() {
        let gateway = Arc::new(ScriptedGateway::new(&[
            "Thought: weather first.\nAction: get_weather(city=\"Paris\")\nObservation: Paris is snowing\nThought: done\nAction: finish(answer=\"snow\")",
            "Thought: ok\nAction: finish(answer=\"Paris is sunny\")",
        ]));
        let agent = agent_with(gateway.clone(), ReactConfig::default());

        let run = agent.run("Weather in Paris?").await;

        assert_eq!(run.answer(), Some("Paris is sunny"));
        assert_eq!(
            run.transcript.entries()[1],
            TranscriptEntry::ModelTurn(
                "Thought: weather first.\nAction: get_weather(city=\"Paris\")".to_string()
            )
        );
        assert!(!gateway.user_prompt(1).contains("snowing"));
    }

    #[tokio::test]
    async fn test_unknown_tool_becomes_observation_and_loop_continues() {
        let gateway = Arc::new(ScriptedGateway::new(&[
            "Thought: book it.\nAction: book_hotel(city=\"London\")",
            "Thought: cannot book.\nAction: finish(answer=\"I cannot book hotels\")",
        ]));
        let agent = agent_with(gateway.clone(), ReactConfig::default());

        let run = agent.run("Book me a hotel").await;

        assert_eq!(run.final_state, LoopState::Done);
        let observations: Vec<&str> = run.transcript.observations().collect();
        assert_eq!(observations, vec!["Error: undefined tool 'book_hotel'"]);
        assert_eq!(gateway.calls(), 2);
    }

    #[tokio::test]
    async fn test_malformed_call_becomes_observation() {
        let gateway = Arc::new(ScriptedGateway::new(&[
            "Thought: hmm\nAction: search the web",
            "Thought: retry\nAction: finish(answer=\"done\")",
        ]));
        let agent = agent_with(gateway, ReactConfig::default());

        let run = agent.run("Anything").await;

        assert_eq!(run.answer(), Some("done"));
        let observations: Vec<&str> = run.transcript.observations().collect();
        assert_eq!(observations, vec!["Error: malformed action 'search the web'"]);
    }

    #[tokio::test]
    async fn test_loop_halts_when_model_never_finishes() {
        let gateway = Arc::new(ScriptedGateway::new(&[
            "Thought: again\nAction: get_weather(city=\"London\")",
        ]));
        let config = ReactConfig {
            max_iterations: 3,
            ..Default::default()
        };
        let agent = agent_with(gateway.clone(), config);

        let run = agent.run("Loop forever").await;

        assert_eq!(run.outcome, ReactOutcome::BudgetExhausted { iterations: 3 });
        assert_eq!(run.final_state, LoopState::Failed);
        assert_eq!(gateway.calls(), 3);
        assert_eq!(run.transcript.observations().count(), 3);
        assert!(run.answer().is_none());
    }

    #[tokio::test]
    async fn test_missing_action_fails_with_raw_output() {
        let raw = "I think London is nice.\nObservation: made up";
        let gateway = Arc::new(ScriptedGateway::new(&[raw]));
        let agent = agent_with(gateway.clone(), ReactConfig::default());

        let run = agent.run("Weather?").await;

        assert_eq!(
            run.outcome,
            ReactOutcome::ParseFailed {
                raw_output: raw.to_string()
            }
        );
        assert_eq!(run.final_state, LoopState::Failed);
        assert_eq!(gateway.calls(), 1);
        assert_eq!(run.transcript.entries().len(), 2);
    }

    #[tokio::test]
    async fn test_malformed_finish_ends_run() {
        let gateway = Arc::new(ScriptedGateway::new(&["Thought: done\nAction: finish(42)"]));
        let agent = agent_with(gateway, ReactConfig::default());

        let run = agent.run("Weather?").await;

        assert_eq!(
            run.outcome,
            ReactOutcome::MalformedFinish {
                action: "finish(42)".to_string()
            }
        );
        assert_eq!(run.final_state, LoopState::Failed);
    }

    #[tokio::test]
    async fn test_transport_failure_is_recorded_in_transcript() {
        let gateway = Arc::new(ScriptedGateway::failing());
        let agent = agent_with(gateway, ReactConfig::default());

        let run = agent.run("Weather?").await;

        match &run.outcome {
            ReactOutcome::ParseFailed { raw_output } => {
                assert!(raw_output.starts_with("Error:"));
                assert!(raw_output.contains("connection refused"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(matches!(&run.transcript.entries()[1], TranscriptEntry::ModelTurn(t) if t.starts_with("Error:")));
    }

    #[tokio::test]
    async fn test_streamed_completion_is_drained() {
        let gateway = Arc::new(ScriptedGateway::new(&[
            "Thought: easy\nAction: finish(answer=\"streamed\")",
        ]));
        let config = ReactConfig {
            stream: true,
            ..Default::default()
        };
        let agent = agent_with(gateway, config);

        let run = agent.run("Stream it").await;

        assert_eq!(run.answer(), Some("streamed"));
    }

    #[tokio::test]
    async fn test_custom_system_prompt_is_sent() {
        let gateway = Arc::new(ScriptedGateway::new(&["Thought: t\nAction: finish(answer=\"a\")"]));
        let config = ReactConfig {
            system_prompt: Some("Custom rules".to_string()),
            ..Default::default()
        };
        let agent = agent_with(gateway.clone(), config);

        agent.run("Hi").await;

        assert_eq!(agent.system_prompt(), "Custom rules");
        assert_eq!(gateway.prompts.lock().unwrap()[0][0], LlmMessage::system("Custom rules"));
    }

    #[test]
    fn test_default_system_prompt_lists_registered_tools() {
        let gateway = Arc::new(ScriptedGateway::new(&["unused"]));
        let agent = agent_with(gateway, ReactConfig::default());

        assert!(agent.system_prompt().contains("`get_weather(city: str)`"));
    }

    #[test]
    fn test_zero_iteration_budget_is_rejected() {
        let broker = Arc::new(LlmBroker::new("m", Arc::new(ScriptedGateway::new(&["x"]))));
        let config = ReactConfig {
            max_iterations: 0,
            ..Default::default()
        };

        let result = ReactAgent::new(broker, ToolRegistry::new(), config);

        assert!(matches!(result, Err(AgentError::ConfigError(_))));
    }
}
