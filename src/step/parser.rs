//! Raw model text to validated steps

use super::{Step, StepKind};
use crate::error::EngineError;
use serde_json::{Map, Value};

/// Remove a surrounding markdown code fence, if any.
///
/// Handles ```` ```json\n{...}\n``` ````, ```` ```{...}``` ```` and unfenced
/// text. The result is trimmed.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.trim_end();
    let rest = rest.strip_suffix("```").unwrap_or(rest);

    // Skip the language tag, if present
    let body = match rest.split_once('\n') {
        Some((tag, body)) if is_fence_tag(tag) => body,
        Some(_) => rest,
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
    };
    body.trim()
}

fn is_fence_tag(tag: &str) -> bool {
    tag.trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Parse model text into a step, synthesizing an `error` step on failure
pub fn parse_step(raw: &str) -> Step {
    try_parse_step(raw).unwrap_or_else(|e| Step::error(e.to_string()))
}

/// Parse model text into a step.
///
/// # Errors
///
/// `EngineError::Parse` when the payload is not a JSON object,
/// `EngineError::ProtocolViolation` when it does not follow the step schema.
pub fn try_parse_step(raw: &str) -> Result<Step, EngineError> {
    let body = strip_code_fence(raw);
    let value: Value = serde_json::from_str(body).map_err(|e| EngineError::parse(e.to_string()))?;
    let Value::Object(map) = value else {
        return Err(EngineError::parse(format!(
            "expected a JSON object, got {}",
            json_type(&value)
        )));
    };
    validate(map)
}

fn validate(mut map: Map<String, Value>) -> Result<Step, EngineError> {
    let name = match map.remove("step") {
        Some(Value::String(name)) if !name.trim().is_empty() => name.trim().to_string(),
        Some(Value::String(_)) => return Err(EngineError::protocol("`step` must not be empty")),
        Some(other) => {
            return Err(EngineError::protocol(format!(
                "`step` must be a string, got {}",
                json_type(&other)
            )))
        }
        None => return Err(EngineError::protocol("missing `step` field")),
    };

    let content = match map.remove("content") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
    };
    let function = map.remove("function").filter(|v| !v.is_null());
    let input = map.remove("input").filter(|v| !v.is_null());
    let status = map.get("status").and_then(Value::as_bool);

    let is_action = name.eq_ignore_ascii_case("action");
    let step = match (is_action, function, input) {
        (true, Some(Value::String(function)), Some(Value::Object(input))) => {
            if function.trim().is_empty() {
                return Err(EngineError::protocol("action step has an empty `function`"));
            }
            Step::action(content, function.trim(), input)
        }
        (true, Some(Value::String(_)), Some(other)) => {
            return Err(EngineError::protocol(format!(
                "action `input` must be a JSON object, got {}",
                json_type(&other)
            )))
        }
        (true, Some(other), Some(_)) => {
            return Err(EngineError::protocol(format!(
                "action `function` must be a string, got {}",
                json_type(&other)
            )))
        }
        (true, _, _) => {
            return Err(EngineError::protocol(
                "action step requires both `function` and `input`",
            ))
        }
        (false, Some(_), Some(_)) => {
            return Err(EngineError::protocol(format!(
                "step `{name}` carries `function` and `input` but is not an action"
            )))
        }
        (false, function, input) => {
            if function.is_some() || input.is_some() {
                tracing::debug!(step = %name, "Dropping stray tool field from non-action step");
            }
            let Some(kind) = StepKind::named(&name) else {
                return Err(EngineError::protocol(format!(
                    "step name `{name}` is reserved for tool outcomes"
                )));
            };
            Step::new(kind, content)
        }
    };

    Ok(step.with_success(status))
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
