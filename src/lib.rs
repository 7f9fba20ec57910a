//! Stepwise - orchestration engine for step-protocol model conversations
//!
//! The model answers every turn with one JSON step. A [`Session`] parses each
//! step, dispatches tool calls through a [`ToolRegistry`], feeds results back
//! into the transcript, and stops at the first terminal step.

#![allow(clippy::must_use_candidate)]

pub mod conversation;
pub mod error;
pub mod llm;
pub mod runtime;
pub mod step;
pub mod system_prompt;
pub mod tools;

pub use conversation::{Conversation, Message, Role};
pub use error::EngineError;
pub use runtime::{FnObserver, RunResult, Session, SessionConfig, StepObserver};
pub use step::{Step, StepKind};
pub use tools::{Tool, ToolError, ToolRegistry};
