//! `tool <tool> <action>` recipes.

use serde::{Deserialize, Serialize};

/// Capture context, ask the model with `role`, then run `execute_command`.
///
/// `execute_command` is an argv template: `{file}`, `{response}` and
/// `{output}` are substituted, the rest is split on whitespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolAction {
    pub context_command: String,
    pub role: String,
    pub execute_command: String,
}

impl ToolAction {
    pub fn new(
        context_command: impl Into<String>,
        role: impl Into<String>,
        execute_command: impl Into<String>,
    ) -> Self {
        Self {
            context_command: context_command.into(),
            role: role.into(),
            execute_command: execute_command.into(),
        }
    }
}
