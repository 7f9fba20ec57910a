//! Clock tool - current UTC time

use super::{InputSchema, Tool, ToolError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Map, Value};

pub struct ClockTool;

#[derive(Debug, Default, Deserialize)]
struct ClockInput {
    /// strftime pattern; RFC 3339 when absent
    #[serde(default)]
    format: Option<String>,
}

impl ClockTool {
    fn render(now: DateTime<Utc>, input: &ClockInput) -> Result<Value, ToolError> {
        let formatted = match input.format.as_deref() {
            None | Some("") => now.to_rfc3339(),
            Some(pattern) => {
                let mut out = String::new();
                std::fmt::write(&mut out, format_args!("{}", now.format(pattern)))
                    .map_err(|_| ToolError::new(format!("Invalid format pattern: {pattern}")))?;
                out
            }
        };
        Ok(json!({ "utc": formatted, "unix": now.timestamp() }))
    }
}

#[async_trait]
impl Tool for ClockTool {
    fn name(&self) -> &'static str {
        "clock"
    }

    fn description(&self) -> String {
        "Return the current UTC date and time. Optional `format` is a strftime pattern (default RFC 3339).".to_string()
    }

    fn input_schema(&self) -> InputSchema {
        InputSchema::from([("format".to_string(), "string (optional)".to_string())])
    }

    async fn run(&self, input: Map<String, Value>) -> Result<Value, ToolError> {
        let input: ClockInput =
            serde_json::from_value(Value::Object(input)).map_err(ToolError::invalid_input)?;
        Self::render(Utc::now(), &input)
    }
}
