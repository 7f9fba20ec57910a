//! Error taxonomy for a step-protocol run
//!
//! Every variant except `Configuration` is turned into a terminal `error`
//! step by the session; callers of `Session::run` never see these as `Err`.

use crate::llm::LlmError;
use thiserror::Error;

/// Failures that can end a run
#[derive(Debug, Error)]
pub enum EngineError {
    /// Missing credential; short-circuits before any model call
    #[error("{0}")]
    Configuration(String),

    /// The model call itself failed
    #[error("Model request failed: {0}")]
    Transport(#[from] LlmError),

    /// The model answered without any content
    #[error("Model returned an empty response")]
    EmptyResponse,

    /// The payload could not be parsed as a JSON object
    #[error("Failed to parse model output: {0}")]
    Parse(String),

    /// The payload parsed but does not follow the step protocol
    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),

    #[error("Tool '{0}' not found")]
    ToolNotFound(String),

    #[error("Tool '{tool_name}' failed: {message}")]
    ToolExecution { tool_name: String, message: String },

    /// Opt-in iteration cap was hit before a terminal step
    #[error("Iteration limit of {0} reached without a terminal step")]
    IterationLimit(u32),
}

impl EngineError {
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::ProtocolViolation(message.into())
    }

    pub fn tool_execution(tool_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolExecution {
            tool_name: tool_name.into(),
            message: message.into(),
        }
    }

    /// Text used as the run's `result` when this error ends it.
    ///
    /// Tool failures surface the tool's own error content; everything else
    /// uses the full diagnostic.
    pub fn result_text(&self) -> String {
        match self {
            Self::ToolExecution { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Short label for structured logs
    pub fn label(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::Transport(_) => "transport",
            Self::EmptyResponse => "empty_response",
            Self::Parse(_) => "parse",
            Self::ProtocolViolation(_) => "protocol_violation",
            Self::ToolNotFound(_) => "tool_not_found",
            Self::ToolExecution { .. } => "tool_execution",
            Self::IterationLimit(_) => "iteration_limit",
        }
    }
}
