//! Conversation state for a single operator run.

use crate::session::entities::{Message, Role};

/// One turn of the operator conversation.
///
/// Assistant steps hold a decision's raw JSON; user steps hold observations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub role: Role,
    pub content: String,
}

impl Step {
    pub fn to_message(&self) -> Message {
        Message::new(self.role, self.content.clone())
    }
}

/// Goal plus append-only step log, owned by exactly one loop invocation.
#[derive(Debug, Clone)]
pub struct ConversationState {
    goal: String,
    steps: Vec<Step>,
}

impl ConversationState {
    pub fn new(goal: impl Into<String>) -> Self {
        Self {
            goal: goal.into(),
            steps: Vec::new(),
        }
    }

    pub fn goal(&self) -> &str {
        &self.goal
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Record a decision exactly as the model produced it, so the next
    /// prompt replays the model's own words.
    pub fn append_decision(&mut self, raw: impl Into<String>) {
        self.steps.push(Step {
            role: Role::Assistant,
            content: raw.into(),
        });
    }

    pub fn append_observation(&mut self, text: impl Into<String>) {
        self.steps.push(Step {
            role: Role::User,
            content: text.into(),
        });
    }

    /// Most recent assistant content, or the goal if the model never
    /// produced a valid decision.
    pub fn last_answer_or_partial(&self) -> &str {
        self.steps
            .iter()
            .rev()
            .find(|s| s.role == Role::Assistant)
            .map(|s| s.content.as_str())
            .unwrap_or(&self.goal)
    }
}
