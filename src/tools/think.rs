//! Think tool - lets the model record reasoning without side effects

use super::{InputSchema, Tool, ToolError};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Think tool for model reasoning
pub struct ThinkTool;

#[derive(Debug, Deserialize)]
struct ThinkInput {
    thoughts: String,
}

#[async_trait]
impl Tool for ThinkTool {
    fn name(&self) -> &'static str {
        "think"
    }

    fn description(&self) -> String {
        "Record intermediate reasoning: plan a multi-step approach or reconcile conflicting information. No side effects; the thoughts are echoed back so they stay in the transcript.".to_string()
    }

    fn input_schema(&self) -> InputSchema {
        InputSchema::from([("thoughts".to_string(), "string".to_string())])
    }

    async fn run(&self, input: Map<String, Value>) -> Result<Value, ToolError> {
        let input: ThinkInput =
            serde_json::from_value(Value::Object(input)).map_err(ToolError::invalid_input)?;
        tracing::debug!(chars = input.thoughts.len(), "Thought recorded");
        Ok(serde_json::json!({ "recorded": true, "thoughts": input.thoughts }))
    }
}
