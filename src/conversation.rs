//! Conversation state: the transcript sent to the model and the step history
//! of the current run.

pub use crate::llm::{Message, Role};
use crate::step::Step;

/// Transcript plus step history, owned by exactly one session
#[derive(Debug, Clone)]
pub struct Conversation {
    system_prompt: String,
    messages: Vec<Message>,
    steps: Vec<Step>,
}

impl Conversation {
    /// New conversation seeded with a single system message
    pub fn new(system_prompt: impl Into<String>) -> Self {
        let system_prompt = system_prompt.into();
        Self {
            messages: vec![Message::system(system_prompt.clone())],
            system_prompt,
            steps: Vec::new(),
        }
    }

    /// Unconditional append; content is not inspected
    pub fn append_message(&mut self, role: Role, content: impl Into<String>) {
        self.messages.push(Message::new(role, content));
    }

    pub fn push_step(&mut self, step: Step) {
        self.steps.push(step);
    }

    pub fn clear_steps(&mut self) {
        self.steps.clear();
    }

    /// Drop transcript and history, reseeding the system message
    pub fn reset(&mut self) {
        self.messages.clear();
        self.messages.push(Message::system(self.system_prompt.clone()));
        self.steps.clear();
    }

    /// Full transcript, system message first
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Transcript snapshot without system messages
    pub fn message_log(&self) -> Vec<Message> {
        self.messages
            .iter()
            .filter(|m| m.role != Role::System)
            .cloned()
            .collect()
    }
}
