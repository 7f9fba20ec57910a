//! Step protocol session
//!
//! Each iteration: request a completion with the full transcript, parse the
//! reply into a step, then either dispatch a tool, continue, or terminate.
//! Every failure becomes a terminal `error` step; `run` itself cannot fail.

use super::traits::StepObserver;
use crate::conversation::{Conversation, Message, Role};
use crate::error::EngineError;
use crate::llm::{GenerationParams, LlmError, LlmRequest, LlmService};
use crate::step::{self, Step, StepKind};
use crate::tools::ToolRegistry;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::time::Duration;

/// Result text when no API key is configured
pub const MISSING_API_KEY: &str = "API key is required";

/// User message appended after a non-terminal, non-action step
pub const CONTINUE_PROMPT: &str = "proceed with next step";

const EMPTY_OUTPUT: &str = "No output provided";
const EMPTY_ERROR: &str = "Model reported an error";

/// Settings for one session
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// Credential presence is checked before every run; the key itself is
    /// only used by the transport.
    pub api_key: String,
    pub generation: GenerationParams,
    /// Maximum model requests per run; `None` means unbounded
    pub max_iterations: Option<u32>,
    /// Abandon a model request after this long
    pub request_timeout: Option<Duration>,
}

impl SessionConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_generation(mut self, generation: GenerationParams) -> Self {
        self.generation = generation;
        self
    }

    #[must_use]
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = Some(max);
        self
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }
}

/// Outcome of one `run`
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub result: String,
    pub steps: Vec<Step>,
}

impl RunResult {
    /// Whether the run ended on an `error` step
    pub fn is_error(&self) -> bool {
        self.steps.last().is_some_and(Step::is_error)
    }
}

enum Flow {
    Continue,
    Terminate(String),
}

/// One conversation with the model.
///
/// `run` borrows the session mutably, so runs on the same session are
/// serialized: a second run cannot start until the previous one resolved.
pub struct Session<L> {
    config: SessionConfig,
    llm: L,
    tools: ToolRegistry,
    conversation: Conversation,
}

impl<L: LlmService> Session<L> {
    pub fn new(
        config: SessionConfig,
        system_prompt: impl Into<String>,
        llm: L,
        tools: ToolRegistry,
    ) -> Self {
        Self {
            config,
            llm,
            tools,
            conversation: Conversation::new(system_prompt),
        }
    }

    /// Run `query` until the model reaches a terminal step
    pub async fn run(&mut self, query: &str) -> RunResult {
        self.drive(query, None).await
    }

    /// Like [`Session::run`], notifying `observer` of each step before the
    /// session acts on it
    pub async fn run_with_observer(
        &mut self,
        query: &str,
        observer: &dyn StepObserver,
    ) -> RunResult {
        self.drive(query, Some(observer)).await
    }

    /// Discard transcript and history, reseeding the system message
    pub fn reset(&mut self) {
        self.conversation.reset();
    }

    /// Steps of the last run
    pub fn steps(&self) -> Vec<Step> {
        self.conversation.steps().to_vec()
    }

    /// Transcript without the system message
    pub fn message_logs(&self) -> Vec<Message> {
        self.conversation.message_log()
    }

    /// Full transcript as sent to the model
    pub fn transcript(&self) -> &[Message] {
        self.conversation.messages()
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    async fn drive(&mut self, query: &str, observer: Option<&dyn StepObserver>) -> RunResult {
        self.conversation.clear_steps();

        if self.config.api_key.trim().is_empty() {
            tracing::warn!("Run rejected: no API key configured");
            let result = self
                .fail(EngineError::Configuration(MISSING_API_KEY.to_string()), observer)
                .await;
            return self.finish(result);
        }

        tracing::info!(
            model = %self.config.generation.model,
            query_chars = query.len(),
            tools = self.tools.len(),
            "Run started"
        );
        self.conversation.append_message(Role::User, query);

        let mut requests: u32 = 0;
        let result = loop {
            if let Some(limit) = self.config.max_iterations {
                if requests >= limit {
                    break self.fail(EngineError::IterationLimit(limit), observer).await;
                }
            }
            requests += 1;

            match self.iterate(observer).await {
                Flow::Continue => {}
                Flow::Terminate(result) => break result,
            }
        };

        tracing::info!(
            requests,
            steps = self.conversation.steps().len(),
            "Run finished"
        );
        self.finish(result)
    }

    /// One REQUEST -> PARSE -> (DISPATCH) cycle
    async fn iterate(&mut self, observer: Option<&dyn StepObserver>) -> Flow {
        let raw = match self.request_completion().await {
            Ok(raw) => raw,
            Err(e) => return Flow::Terminate(self.fail(e, observer).await),
        };

        let step = match step::try_parse_step(&raw) {
            Ok(step) => step,
            Err(e) => {
                // Keep the unparseable reply for traceability
                self.conversation.append_message(Role::Assistant, raw);
                return Flow::Terminate(self.fail(e, observer).await);
            }
        };

        self.conversation
            .append_message(Role::Assistant, step.to_wire().to_string());
        let kind = step.kind().clone();
        let content = step.content().to_string();
        self.emit(step, observer).await;

        match kind {
            StepKind::Action { function, input } => self.act(&function, input, observer).await,
            StepKind::Demand => Flow::Terminate(content),
            StepKind::Output => Flow::Terminate(or_placeholder(content, EMPTY_OUTPUT)),
            StepKind::Error => Flow::Terminate(or_placeholder(content, EMPTY_ERROR)),
            StepKind::Initiate | StepKind::Custom(_) | StepKind::Observe => {
                self.conversation.append_message(Role::User, CONTINUE_PROMPT);
                Flow::Continue
            }
        }
    }

    async fn request_completion(&self) -> Result<String, EngineError> {
        let request = LlmRequest::json(
            self.conversation.messages().to_vec(),
            self.config.generation.clone(),
        );
        let call = self.llm.complete(&request);
        let response = match self.config.request_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| LlmError::timeout(limit))??,
            None => call.await?,
        };

        response
            .content()
            .map(str::to_string)
            .ok_or(EngineError::EmptyResponse)
    }

    async fn act(
        &mut self,
        function: &str,
        input: Map<String, Value>,
        observer: Option<&dyn StepObserver>,
    ) -> Flow {
        match self.tools.dispatch(function, input).await {
            Ok(value) => {
                self.emit(Step::observation(&value), observer).await;
                self.conversation
                    .append_message(Role::User, json!({ "observe": value }).to_string());
                Flow::Continue
            }
            Err(e) => {
                tracing::warn!(
                    tool = %function,
                    kind = e.label(),
                    error = %e,
                    "Tool dispatch failed"
                );
                let result = e.result_text();
                self.emit(Step::tool_failure(result.clone()), observer).await;
                Flow::Terminate(result)
            }
        }
    }

    /// Record a terminal error step and return the run's result text
    async fn fail(&mut self, err: EngineError, observer: Option<&dyn StepObserver>) -> String {
        tracing::warn!(kind = err.label(), error = %err, "Run terminated with error");
        let result = err.result_text();
        self.emit(Step::error(err.to_string()), observer).await;
        result
    }

    async fn emit(&mut self, step: Step, observer: Option<&dyn StepObserver>) {
        tracing::debug!(kind = %step.kind(), tool = ?step.tool_name(), "Step emitted");
        if let Some(observer) = observer {
            observer.on_step(&step).await;
        }
        self.conversation.push_step(step);
    }

    fn finish(&self, result: String) -> RunResult {
        RunResult {
            result,
            steps: self.conversation.steps().to_vec(),
        }
    }
}

fn or_placeholder(content: String, placeholder: &str) -> String {
    if content.trim().is_empty() {
        placeholder.to_string()
    } else {
        content
    }
}
