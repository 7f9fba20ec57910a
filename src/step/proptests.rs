//! Property-based tests for the step parser
//!
//! - Parsing never panics, whatever the model sends
//! - Tool fields appear on a parsed step exactly when its kind is `action`
//! - Any object carrying both tool fields is either an action or rejected
//! - Custom step names never shadow a reserved name
//! - Fencing a valid payload does not change the parsed step

use super::{parse_step, try_parse_step, StepKind};
use crate::error::EngineError;
use proptest::prelude::*;
use serde_json::{json, Map, Value};

fn arb_step_name() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("initiate".to_string()),
        Just("action".to_string()),
        Just("demand".to_string()),
        Just("output".to_string()),
        Just("error".to_string()),
        Just("Action".to_string()),
        Just("observe".to_string()),
        "[a-z_]{1,12}",
    ]
}

/// Simple JSON value (no deeply nested structures)
fn arb_json_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-1000i64..1000).prop_map(|n| Value::Number(n.into())),
        "[a-zA-Z0-9 ]{0,30}".prop_map(Value::String),
        proptest::collection::hash_map("[a-z_]{1,8}", "[a-zA-Z0-9 ]{0,20}", 0..4).prop_map(|m| {
            Value::Object(m.into_iter().map(|(k, v)| (k, Value::String(v))).collect())
        }),
    ]
}

/// Object shaped roughly like a step, with every field optional
fn arb_step_object() -> impl Strategy<Value = Map<String, Value>> {
    (
        proptest::option::of(arb_step_name()),
        proptest::option::of("[a-zA-Z0-9 .,!?]{0,40}"),
        proptest::option::of(arb_json_value()),
        proptest::option::of(arb_json_value()),
        proptest::option::of(any::<bool>()),
    )
        .prop_map(|(step, content, function, input, status)| {
            let mut map = Map::new();
            if let Some(step) = step {
                map.insert("step".to_string(), Value::String(step));
            }
            if let Some(content) = content {
                map.insert("content".to_string(), Value::String(content));
            }
            if let Some(function) = function {
                map.insert("function".to_string(), function);
            }
            if let Some(input) = input {
                map.insert("input".to_string(), input);
            }
            if let Some(status) = status {
                map.insert("status".to_string(), Value::Bool(status));
            }
            map
        })
}

proptest! {
    #[test]
    fn prop_parse_never_panics(raw in "\\PC{0,200}") {
        let _ = parse_step(&raw);
    }

    #[test]
    fn prop_tool_fields_iff_action(map in arb_step_object()) {
        let raw = Value::Object(map).to_string();
        if let Ok(step) = try_parse_step(&raw) {
            let is_action = matches!(step.kind(), StepKind::Action { .. });
            prop_assert_eq!(is_action, step.tool_name().is_some());
            prop_assert_eq!(is_action, step.tool_input().is_some());
        }
    }

    #[test]
    fn prop_both_tool_fields_require_action(map in arb_step_object()) {
        let has_both = map.get("function").is_some_and(|v| !v.is_null())
            && map.get("input").is_some_and(|v| !v.is_null());
        let raw = Value::Object(map).to_string();
        match try_parse_step(&raw) {
            Ok(step) if has_both => {
                let is_action = matches!(step.kind(), StepKind::Action { .. });
                prop_assert!(is_action);
            }
            Ok(_) => {}
            Err(e) => {
                let is_violation = matches!(e, EngineError::ProtocolViolation(_));
                prop_assert!(is_violation);
            }
        }
    }

    #[test]
    fn prop_custom_names_are_never_reserved(name in arb_step_name()) {
        if let Some(StepKind::Custom(custom)) = StepKind::named(&name) {
            let reserved = ["initiate", "action", "demand", "output", "error", "observe"]
                .iter()
                .any(|r| custom.as_str().eq_ignore_ascii_case(r));
            prop_assert!(!reserved);
        }
    }

    #[test]
    fn prop_fencing_is_transparent(
        name in arb_step_name(),
        content in "[a-zA-Z0-9 .,]{0,40}",
    ) {
        let raw = json!({"step": name, "content": content}).to_string();
        let fenced = format!("```json\n{raw}\n```");
        let plain = parse_step(&raw);
        let wrapped = parse_step(&fenced);
        prop_assert_eq!(plain, wrapped);
    }

    #[test]
    fn prop_error_steps_carry_diagnostics(raw in "[^{}]{0,80}") {
        let step = parse_step(&raw);
        prop_assert!(step.is_error());
        prop_assert!(!step.content().is_empty());
    }
}
