//! Parsing model replies into operator decisions.

use super::json_extract::extract_json;
use crate::tool::ToolArgs;
use serde::Deserialize;
use thiserror::Error;

/// Why a model reply could not be turned into a [`Decision`].
///
/// Decode failures and shape failures are distinct variants, but callers
/// treat every variant the same way: as an invalid decision.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecisionError {
    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    #[error("invalid action \"{0}\" (expected answer or tool)")]
    InvalidAction(String),

    #[error("tool decision missing name or args")]
    MissingToolFields,
}

impl DecisionError {
    /// True for well-formed JSON that has the wrong shape.
    pub fn is_semantic(&self) -> bool {
        !matches!(self, DecisionError::InvalidJson(_))
    }
}

/// What the model asked for this turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecisionAction {
    /// Finish with a summary.
    Answer { content: String },
    /// Run exactly one tool.
    Tool { name: String, args: ToolArgs },
}

/// Parsed model output for one operator turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub action: DecisionAction,
    /// Free-text justification. Shown in debug output only.
    pub reasoning: Option<String>,
}

impl Decision {
    pub fn answer(content: impl Into<String>) -> Self {
        Self {
            action: DecisionAction::Answer {
                content: content.into(),
            },
            reasoning: None,
        }
    }

    pub fn tool(name: impl Into<String>, args: ToolArgs) -> Self {
        Self {
            action: DecisionAction::Tool {
                name: name.into(),
                args,
            },
            reasoning: None,
        }
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = Some(reasoning.into());
        self
    }

    pub fn action_name(&self) -> &'static str {
        match self.action {
            DecisionAction::Answer { .. } => "answer",
            DecisionAction::Tool { .. } => "tool",
        }
    }
}

/// A decision together with the JSON text it was parsed from.
///
/// The raw text is what gets replayed to the model on later turns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDecision {
    pub decision: Decision,
    pub raw: String,
}

#[derive(Deserialize)]
struct WireDecision {
    #[serde(default)]
    action: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    args: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default)]
    reasoning: String,
}

/// Parse a raw model reply into a validated [`Decision`].
pub fn parse_decision(reply: &str) -> Result<ParsedDecision, DecisionError> {
    let raw = extract_json(reply);
    let wire: WireDecision =
        serde_json::from_str(raw).map_err(|e| DecisionError::InvalidJson(e.to_string()))?;

    let action = match wire.action.as_str() {
        "answer" => DecisionAction::Answer {
            content: wire.content,
        },
        "tool" => {
            let args = match wire.args {
                Some(args) if !wire.name.is_empty() => args,
                _ => return Err(DecisionError::MissingToolFields),
            };
            DecisionAction::Tool {
                name: wire.name,
                args: args
                    .into_iter()
                    .filter_map(|(k, v)| json_value_to_string(&v).map(|v| (k, v)))
                    .collect(),
            }
        }
        other => return Err(DecisionError::InvalidAction(other.to_string())),
    };

    let reasoning = Some(wire.reasoning).filter(|r| !r.trim().is_empty());

    Ok(ParsedDecision {
        decision: Decision { action, reasoning },
        raw: raw.to_string(),
    })
}

/// Arguments are declared as strings, but models often emit numbers or
/// booleans for things like counts and flags; those are stringified. Null is
/// dropped.
fn json_value_to_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_answer() {
        let parsed = parse_decision(r#"{"action":"answer","content":"disk is full of logs"}"#)
            .unwrap();
        assert_eq!(parsed.decision, Decision::answer("disk is full of logs"));
        assert_eq!(parsed.decision.action_name(), "answer");
    }

    #[test]
    fn test_parse_tool_with_reasoning() {
        let parsed = parse_decision(
            r#"{"action":"tool","name":"run_cmd","args":{"cmd":"df -h"},"reasoning":"check usage"}"#,
        )
        .unwrap();
        let mut args = ToolArgs::new();
        args.insert("cmd".to_string(), "df -h".to_string());
        assert_eq!(
            parsed.decision,
            Decision::tool("run_cmd", args).with_reasoning("check usage")
        );
    }

    #[test]
    fn test_raw_is_extracted_json_not_full_reply() {
        let parsed =
            parse_decision("Here:\n```json\n{\"action\":\"answer\",\"content\":\"x\"}\n```")
                .unwrap();
        assert_eq!(parsed.raw, r#"{"action":"answer","content":"x"}"#);
    }

    #[test]
    fn test_answer_without_content_is_accepted() {
        let parsed = parse_decision(r#"{"action":"answer"}"#).unwrap();
        assert_eq!(parsed.decision, Decision::answer(""));
    }

    #[test]
    fn test_invalid_json() {
        let err = parse_decision("not json at all").unwrap_err();
        assert!(matches!(err, DecisionError::InvalidJson(_)));
        assert!(!err.is_semantic());
        assert!(err.to_string().starts_with("invalid JSON:"));
    }

    #[test]
    fn test_invalid_action() {
        let err = parse_decision(r#"{"action":"think","content":"hmm"}"#).unwrap_err();
        assert_eq!(err, DecisionError::InvalidAction("think".to_string()));
        assert!(err.is_semantic());
        assert_eq!(
            err.to_string(),
            "invalid action \"think\" (expected answer or tool)"
        );
    }

    #[test]
    fn test_missing_action_is_invalid_action() {
        let err = parse_decision(r#"{"content":"hmm"}"#).unwrap_err();
        assert_eq!(err, DecisionError::InvalidAction(String::new()));
    }

    #[test]
    fn test_tool_missing_name_or_args() {
        assert_eq!(
            parse_decision(r#"{"action":"tool","args":{"cmd":"ls"}}"#).unwrap_err(),
            DecisionError::MissingToolFields
        );
        assert_eq!(
            parse_decision(r#"{"action":"tool","name":"run_cmd"}"#).unwrap_err(),
            DecisionError::MissingToolFields
        );
        assert_eq!(
            parse_decision(r#"{"action":"tool","name":"run_cmd","args":null}"#).unwrap_err(),
            DecisionError::MissingToolFields
        );
    }

    #[test]
    fn test_empty_args_object_is_valid() {
        let parsed = parse_decision(r#"{"action":"tool","name":"run_cmd","args":{}}"#).unwrap();
        assert_eq!(parsed.decision, Decision::tool("run_cmd", ToolArgs::new()));
    }

    #[test]
    fn test_non_string_args_are_stringified() {
        let parsed = parse_decision(
            r#"{"action":"tool","name":"probe","args":{"depth":2,"follow":true,"skip":null}}"#,
        )
        .unwrap();
        let DecisionAction::Tool { args, .. } = parsed.decision.action else {
            panic!("expected tool decision");
        };
        assert_eq!(args.get("depth").map(String::as_str), Some("2"));
        assert_eq!(args.get("follow").map(String::as_str), Some("true"));
        assert!(!args.contains_key("skip"));
    }

    #[test]
    fn test_blank_reasoning_is_dropped() {
        let parsed = parse_decision(r#"{"action":"answer","content":"x","reasoning":"  "}"#)
            .unwrap();
        assert_eq!(parsed.decision.reasoning, None);
    }
}
