//! Argv templates for tool actions.
//!
//! `git checkout -b {response}` becomes `["git", "checkout", "-b", <response>]`.
//! Literal text is split on whitespace; a placeholder's value is never split,
//! so a multi-line response stays one argument. No shell is involved.

use gaia_application::CommandError;
use std::collections::HashMap;

pub const FILE_PLACEHOLDER: &str = "{file}";
pub const RESPONSE_PLACEHOLDER: &str = "{response}";
pub const OUTPUT_PLACEHOLDER: &str = "{output}";

const PLACEHOLDERS: [&str; 3] = [FILE_PLACEHOLDER, RESPONSE_PLACEHOLDER, OUTPUT_PLACEHOLDER];

/// Expand `template` into argv.
///
/// A placeholder glued to literal text joins the same word
/// (`--message={response}` is one argument). A placeholder always yields
/// an argument, even when its value is empty.
pub fn build_command_args(
    template: &str,
    replacements: &HashMap<&str, String>,
) -> Result<Vec<String>, CommandError> {
    let mut argv = Vec::new();
    let mut word = String::new();
    let mut in_word = false;
    let mut rest = template;

    while let Some(ch) = rest.chars().next() {
        if let Some(placeholder) = PLACEHOLDERS.iter().find(|p| rest.starts_with(**p)) {
            let value = replacements.get(placeholder).ok_or_else(|| {
                CommandError::Template(format!("missing replacement for placeholder {placeholder}"))
            })?;
            word.push_str(value);
            in_word = true;
            rest = &rest[placeholder.len()..];
            continue;
        }

        if ch.is_whitespace() {
            if in_word {
                argv.push(std::mem::take(&mut word));
                in_word = false;
            }
        } else {
            word.push(ch);
            in_word = true;
        }
        rest = &rest[ch.len_utf8()..];
    }
    if in_word {
        argv.push(word);
    }

    if argv.is_empty() {
        return Err(CommandError::Template("execute_command is empty".to_string()));
    }
    Ok(argv)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&'static str, &str)]) -> HashMap<&'static str, String> {
        pairs.iter().map(|(k, v)| (*k, v.to_string())).collect()
    }

    #[test]
    fn test_literal_only() {
        let argv = build_command_args("  git   status ", &HashMap::new()).unwrap();
        assert_eq!(argv, ["git", "status"]);
    }

    #[test]
    fn test_placeholder_is_single_argument() {
        let argv = build_command_args(
            "git checkout -b {response}",
            &values(&[(RESPONSE_PLACEHOLDER, "feature/add login; rm -rf /")]),
        )
        .unwrap();
        assert_eq!(argv, ["git", "checkout", "-b", "feature/add login; rm -rf /"]);
    }

    #[test]
    fn test_multiple_placeholders_in_order() {
        let argv = build_command_args(
            "tool {output} --from {file} {response}",
            &values(&[
                (FILE_PLACEHOLDER, "/tmp/gaia-1.txt"),
                (RESPONSE_PLACEHOLDER, "line one\nline two"),
                (OUTPUT_PLACEHOLDER, ""),
            ]),
        )
        .unwrap();
        assert_eq!(
            argv,
            ["tool", "", "--from", "/tmp/gaia-1.txt", "line one\nline two"]
        );
    }

    #[test]
    fn test_placeholder_glued_to_literal() {
        let argv = build_command_args(
            "git commit --message={response}!",
            &values(&[(RESPONSE_PLACEHOLDER, "fix: typo")]),
        )
        .unwrap();
        assert_eq!(argv, ["git", "commit", "--message=fix: typo!"]);
    }

    #[test]
    fn test_missing_replacement() {
        let err = build_command_args("git commit -F {file}", &HashMap::new()).unwrap_err();
        assert_eq!(
            err,
            CommandError::Template("missing replacement for placeholder {file}".to_string())
        );
    }

    #[test]
    fn test_empty_template() {
        let err = build_command_args("   ", &HashMap::new()).unwrap_err();
        assert!(matches!(err, CommandError::Template(_)));
    }

    #[test]
    fn test_unknown_braces_are_literal() {
        let argv = build_command_args("echo {name}", &HashMap::new()).unwrap();
        assert_eq!(argv, ["echo", "{name}"]);
    }
}
