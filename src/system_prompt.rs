//! Default system prompt for the step protocol
//!
//! Describes the JSON step format and lists every registered tool with its
//! declared input shape, so the model knows what `action` may call.

use crate::tools::ToolRegistry;
use std::fmt::Write;

const PROTOCOL_PROMPT: &str = r#"You solve the user's request one step at a time. Every reply is exactly one JSON object and nothing else:

{"step": "<kind>", "content": "<text>", "function": "<tool name>", "input": {...}, "status": true}

Step kinds:
- "initiate": restate the task and outline a plan.
- "action": call a tool. "function" and "input" are required and only allowed here.
- "demand": a tool you need is not available; describe it in "content". This ends the task.
- "output": the final answer in "content". This ends the task.
- "error": you cannot continue; explain why in "content". This ends the task.
Any other kind name (for example "research" or "verify") is an intermediate step. Never use "observe"; it is reserved for tool results.

After an action you receive {"observe": <tool result>}. After any other intermediate step you receive "proceed with next step"."#;

/// Build the protocol prompt for the tools in `registry`
pub fn build_system_prompt(registry: &ToolRegistry) -> String {
    let mut prompt = PROTOCOL_PROMPT.to_string();

    if registry.is_empty() {
        prompt.push_str("\n\nNo tools are available. Use \"demand\" if the task needs one.");
        return prompt;
    }

    prompt.push_str("\n\nAvailable tools:");
    for def in registry.definitions() {
        let _ = write!(prompt, "\n- {}: {}", def.name, def.description);
        if def.input_schema.is_empty() {
            prompt.push_str("\n  input: {}");
        } else {
            let params: Vec<String> = def
                .input_schema
                .iter()
                .map(|(name, ty)| format!("\"{name}\": {ty}"))
                .collect();
            let _ = write!(prompt, "\n  input: {{{}}}", params.join(", "));
        }
    }
    prompt
}
