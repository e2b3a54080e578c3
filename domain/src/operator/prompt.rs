//! Planner prompt construction.

use super::state::ConversationState;
use crate::session::entities::Message;
use crate::tool::ToolDefinition;

const OPERATOR_INSTRUCTIONS: &str = "You are an operator investigating a goal. \
Respond only with a single JSON object, no markdown or explanation. \
Either {\"action\":\"answer\",\"content\":\"...\"} to finish with a summary, \
or {\"action\":\"tool\",\"name\":\"...\",\"args\":{...},\"reasoning\":\"...\"} to run one tool. \
Do not run destructive commands (e.g. rm -rf, sudo). ";

/// System prompt listing every available tool.
pub fn system_prompt(tools: &[ToolDefinition]) -> String {
    let mut prompt = String::from(OPERATOR_INSTRUCTIONS);
    prompt.push_str("Available tools (respond with JSON only):\n");
    for tool in tools {
        prompt.push_str(&tool.prompt_line());
        prompt.push('\n');
    }
    prompt
}

/// Full message list for one planner call: system prompt, goal, then every
/// recorded step in order.
pub fn planner_messages(state: &ConversationState, tools: &[ToolDefinition]) -> Vec<Message> {
    let mut messages = Vec::with_capacity(state.steps().len() + 2);
    messages.push(Message::system(system_prompt(tools)));
    messages.push(Message::user(format!("Goal: {}", state.goal())));
    messages.extend(state.steps().iter().map(|s| s.to_message()));
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::entities::Role;
    use crate::tool::run_cmd_definition;

    #[test]
    fn test_system_prompt_lists_tools() {
        let prompt = system_prompt(&[run_cmd_definition()]);
        assert!(prompt.starts_with("You are an operator investigating a goal."));
        assert!(prompt.contains("Do not run destructive commands"));
        assert!(prompt.contains("- run_cmd: Execute a shell command."));
        assert!(prompt.contains("Args: cmd: shell command to run"));
    }

    #[test]
    fn test_planner_messages_order() {
        let mut state = ConversationState::new("why is disk full?");
        state.append_decision(r#"{"action":"tool","name":"run_cmd","args":{"cmd":"df -h"}}"#);
        state.append_observation("stdout:\nok");

        let messages = planner_messages(&state, &[run_cmd_definition()]);
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[1], Message::user("Goal: why is disk full?"));
        assert_eq!(messages[2].role, Role::Assistant);
        assert_eq!(messages[3], Message::user("stdout:\nok"));
    }
}
