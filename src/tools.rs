//! Tool registry and dispatcher
//!
//! Tools are named capabilities registered once at configuration time. The
//! session only sees success (a JSON payload) or failure (a message).

mod clock;
mod think;

pub use clock::ClockTool;
pub use think::ThinkTool;

use crate::error::EngineError;
use async_trait::async_trait;
use futures::FutureExt;
use serde_json::{Map, Value};
use std::any::Any;
use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Parameter name to type label, e.g. `{"text": "string"}`
pub type InputSchema = BTreeMap<String, String>;

/// Failure reported by a tool
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ToolError {
    pub message: String,
}

impl ToolError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn invalid_input(err: impl std::fmt::Display) -> Self {
        Self::new(format!("Invalid input: {err}"))
    }
}

/// Trait for capabilities the model can invoke
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name, unique within a registry
    fn name(&self) -> &str;

    /// Tool description for the model
    fn description(&self) -> String;

    /// Declared input shape
    fn input_schema(&self) -> InputSchema;

    /// Execute the tool
    async fn run(&self, input: Map<String, Value>) -> Result<Value, ToolError>;
}

/// Description of a registered tool, as presented to the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: InputSchema,
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("tool '{0}' is already registered")]
    Duplicate(String),
}

/// Collection of tools available to a session
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
    timeout: Option<Duration>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in tools
    pub fn standard() -> Self {
        let mut registry = Self::new();
        for tool in [Arc::new(ThinkTool) as Arc<dyn Tool>, Arc::new(ClockTool)] {
            registry.tools.insert(tool.name().to_string(), tool);
        }
        registry
    }

    /// Bound every dispatch by `timeout`; `None` waits indefinitely
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Register a tool.
    ///
    /// # Errors
    ///
    /// `RegistryError::Duplicate` if a tool with the same name exists.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), RegistryError> {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            return Err(RegistryError::Duplicate(name));
        }
        self.tools.insert(name, tool);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Get all tool definitions, ordered by name
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .values()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description(),
                input_schema: t.input_schema(),
            })
            .collect()
    }

    /// Resolve `name` and invoke it once with `input`.
    ///
    /// Errors returned by the tool, panics inside it, and timeouts all come
    /// back as `EngineError::ToolExecution`.
    ///
    /// # Errors
    ///
    /// `ToolNotFound` for an unknown name, `ToolExecution` for any failure
    /// during invocation.
    pub async fn dispatch(
        &self,
        name: &str,
        input: Map<String, Value>,
    ) -> Result<Value, EngineError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| EngineError::ToolNotFound(name.to_string()))?;

        tracing::debug!(tool = %name, "Dispatching tool");
        let invocation = AssertUnwindSafe(tool.run(input)).catch_unwind();
        let outcome = match self.timeout {
            Some(limit) => {
                if let Ok(outcome) = tokio::time::timeout(limit, invocation).await {
                    outcome
                } else {
                    tracing::warn!(tool = %name, timeout_ms = %limit.as_millis(), "Tool timed out");
                    return Err(EngineError::tool_execution(
                        name,
                        format!("timed out after {}ms", limit.as_millis()),
                    ));
                }
            }
            None => invocation.await,
        };

        match outcome {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                tracing::warn!(tool = %name, error = %e, "Tool failed");
                Err(EngineError::tool_execution(name, e.message))
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                tracing::error!(tool = %name, panic = %message, "Tool panicked");
                Err(EngineError::tool_execution(name, format!("panicked: {message}")))
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
