//! Locate the JSON object inside a free-form model reply.
//!
//! Models wrap their JSON in prose or markdown fences despite being told
//! not to. Two passes, first hit wins:
//!
//! 1. A fenced block (` ```json ... ``` ` or a bare ` ``` ... ``` `)
//! 2. The first `{` and its depth-matched `}` (string contents are not
//!    special-cased, so a brace inside a JSON string can end the scan early)
//!
//! If neither applies the trimmed input is returned and the JSON decoder
//! reports the problem.

use regex::Regex;
use std::sync::LazyLock;

static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json)?\s*([^`]+)```").expect("fenced block pattern is valid")
});

/// Extract the most likely JSON object from `reply`.
pub fn extract_json(reply: &str) -> &str {
    let reply = reply.trim();

    if let Some(body) = FENCED_BLOCK.captures(reply).and_then(|c| c.get(1)) {
        return body.as_str().trim();
    }

    let Some(start) = reply.find('{') else {
        return reply;
    };

    let mut depth = 0usize;
    for (offset, byte) in reply.as_bytes()[start..].iter().enumerate() {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return &reply[start..start + offset + 1];
                }
            }
            _ => {}
        }
    }

    // Unbalanced: hand back everything from the opening brace
    &reply[start..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_object_unchanged() {
        let raw = r#"{"action":"answer","content":"hi"}"#;
        assert_eq!(extract_json(raw), raw);
    }

    #[test]
    fn test_json_fence_with_prose() {
        let reply = "Sure, here you go:\n```json\n{\"action\":\"answer\",\"content\":\"hi\"}\n```\nHope that helps.";
        let extracted = extract_json(reply);
        let parsed: serde_json::Value = serde_json::from_str(extracted).unwrap();
        assert_eq!(
            parsed,
            serde_json::json!({"action": "answer", "content": "hi"})
        );
    }

    #[test]
    fn test_bare_fence() {
        let reply = "```\n{\"action\":\"tool\"}\n```";
        assert_eq!(extract_json(reply), r#"{"action":"tool"}"#);
    }

    #[test]
    fn test_object_embedded_in_prose() {
        let reply = r#"I will check disk usage. {"action":"tool","name":"run_cmd","args":{"cmd":"df -h"}} Done."#;
        assert_eq!(
            extract_json(reply),
            r#"{"action":"tool","name":"run_cmd","args":{"cmd":"df -h"}}"#
        );
    }

    #[test]
    fn test_nested_objects_match_outer_brace() {
        let reply = r#"x {"a":{"b":{"c":1}},"d":2} y {"e":3}"#;
        assert_eq!(extract_json(reply), r#"{"a":{"b":{"c":1}},"d":2}"#);
    }

    #[test]
    fn test_unbalanced_returns_tail() {
        let reply = r#"prefix {"action":"answer","content":"#;
        assert_eq!(extract_json(reply), r#"{"action":"answer","content":"#);
    }

    #[test]
    fn test_no_braces_returns_trimmed_input() {
        assert_eq!(extract_json("  just words  "), "just words");
        assert_eq!(extract_json(""), "");
    }

    #[test]
    fn test_multibyte_prose_before_object() {
        let reply = "結果: {\"action\":\"answer\",\"content\":\"ok\"}";
        assert_eq!(
            extract_json(reply),
            r#"{"action":"answer","content":"ok"}"#
        );
    }
}
