//! Observation text fed back to the model after each tool attempt.

use crate::tool::{CMD_ARG, ToolArgs};

/// Render tool output as the next user step.
///
/// Empty stdout/stderr sections are omitted; trailing whitespace is trimmed.
pub fn format_observation(stdout: &str, stderr: &str, error: Option<&str>) -> String {
    let mut out = String::new();
    if !stdout.is_empty() {
        out.push_str("stdout:\n");
        out.push_str(stdout);
        out.push('\n');
    }
    if !stderr.is_empty() {
        out.push_str("stderr:\n");
        out.push_str(stderr);
        out.push('\n');
    }
    if let Some(error) = error {
        out.push_str("error: ");
        out.push_str(error);
    }
    out.truncate(out.trim_end().len());
    out
}

pub fn invalid_response(error: &impl std::fmt::Display) -> String {
    format!("error: Invalid response: {}. Respond with valid JSON only.", error)
}

pub fn unknown_tool(name: &str) -> String {
    format!("error: Unknown tool: {}", name)
}

pub fn blocked(reason: &str) -> String {
    format!("blocked: {}", reason)
}

pub fn dry_run(name: &str, args: &ToolArgs) -> String {
    match args.get(CMD_ARG) {
        Some(cmd) => format!("dry_run: Would run: {} {}", name, cmd),
        None => format!("dry_run: Would run: {}", name),
    }
}
