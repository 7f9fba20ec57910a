//! Structured step protocol
//!
//! Every model turn is a single JSON object:
//!
//! ```json
//! {"step": "action", "content": "...", "function": "echo", "input": {...}, "status": true}
//! ```
//!
//! [`Step`] is the validated form. Tool fields live inside
//! [`StepKind::Action`], so a non-action step cannot carry them.

mod parser;
#[cfg(test)]
mod proptests;

pub use parser::{parse_step, strip_code_fence, try_parse_step};

use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};
use std::fmt;

/// Name of the synthesized step recording a successful tool outcome
pub const OBSERVE: &str = "observe";

/// Step names with a fixed meaning; a custom step never carries one
const RESERVED_NAMES: [&str; 6] = ["initiate", "action", "demand", "output", "error", OBSERVE];

/// Name of a step outside the fixed vocabulary.
///
/// Only [`StepKind::named`] builds one, so it never collides with a
/// reserved name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomName(String);

impl CustomName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Step kind, with the tool request attached to actions
#[derive(Debug, Clone, PartialEq)]
pub enum StepKind {
    Initiate,
    /// Any step name outside the fixed protocol vocabulary
    Custom(CustomName),
    Action {
        function: String,
        input: Map<String, Value>,
    },
    /// Outcome of a successful tool call; only the session emits these
    Observe,
    /// A tool is required but not available
    Demand,
    Output,
    Error,
}

impl StepKind {
    /// Kind for a step name without tool fields. Matching is ASCII
    /// case-insensitive.
    ///
    /// Returns `None` for `action`, which needs a tool request, and for
    /// `observe`, which only the session synthesizes.
    pub fn named(name: &str) -> Option<Self> {
        let name = name.trim();
        let kind = if name.eq_ignore_ascii_case("initiate") {
            Self::Initiate
        } else if name.eq_ignore_ascii_case("demand") {
            Self::Demand
        } else if name.eq_ignore_ascii_case("output") {
            Self::Output
        } else if name.eq_ignore_ascii_case("error") {
            Self::Error
        } else if is_reserved(name) || name.is_empty() {
            return None;
        } else {
            Self::Custom(CustomName(name.to_string()))
        };
        Some(kind)
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Initiate => "initiate",
            Self::Custom(name) => name.as_str(),
            Self::Action { .. } => "action",
            Self::Observe => OBSERVE,
            Self::Demand => "demand",
            Self::Output => "output",
            Self::Error => "error",
        }
    }

    /// Whether reaching this kind ends the run
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Demand | Self::Output | Self::Error)
    }
}

fn is_reserved(name: &str) -> bool {
    RESERVED_NAMES.iter().any(|r| name.eq_ignore_ascii_case(r))
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One validated step
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    kind: StepKind,
    content: String,
    success: Option<bool>,
}

impl Step {
    pub fn new(kind: StepKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
            success: None,
        }
    }

    pub fn action(
        content: impl Into<String>,
        function: impl Into<String>,
        input: Map<String, Value>,
    ) -> Self {
        Self::new(
            StepKind::Action {
                function: function.into(),
                input,
            },
            content,
        )
    }

    pub fn output(content: impl Into<String>) -> Self {
        Self::new(StepKind::Output, content)
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self::new(StepKind::Error, content)
    }

    /// Outcome of a tool call that succeeded
    pub fn observation(result: &Value) -> Self {
        let content = match result {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        Self::new(StepKind::Observe, content).with_success(Some(true))
    }

    /// Outcome of a tool call that failed
    pub fn tool_failure(message: impl Into<String>) -> Self {
        Self::error(message).with_success(Some(false))
    }

    #[must_use]
    pub fn with_success(mut self, success: Option<bool>) -> Self {
        self.success = success;
        self
    }

    pub fn kind(&self) -> &StepKind {
        &self.kind
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn success(&self) -> Option<bool> {
        self.success
    }

    pub fn tool_name(&self) -> Option<&str> {
        match &self.kind {
            StepKind::Action { function, .. } => Some(function),
            _ => None,
        }
    }

    pub fn tool_input(&self) -> Option<&Map<String, Value>> {
        match &self.kind {
            StepKind::Action { input, .. } => Some(input),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.kind, StepKind::Error)
    }

    /// Wire form, as written into the transcript
    pub fn to_wire(&self) -> Value {
        let mut wire = json!({
            "step": self.kind.name(),
            "content": self.content,
        });
        if let StepKind::Action { function, input } = &self.kind {
            wire["function"] = Value::String(function.clone());
            wire["input"] = Value::Object(input.clone());
        }
        if let Some(status) = self.success {
            wire["status"] = Value::Bool(status);
        }
        wire
    }
}

impl Serialize for Step {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_wire().serialize(serializer)
    }
}
