//! LLM-backed role classification: prompt and reply parsing.

use super::entities::DEFAULT_ROLE;

/// Prompt asking the model to name exactly one of `available_roles`.
pub fn classification_prompt(message: &str, available_roles: &[String]) -> String {
    format!(
        "You are a role classifier for a CLI tool. Analyze the following user message and determine which role is most appropriate.\n\n\
Available roles: {}\n\n\
User message: {}\n\n\
Respond with ONLY the role name (one word, lowercase) that best matches the user's intent. If none match well, respond with \"default\".\n\n\
Role:",
        available_roles.join(", "),
        message
    )
}

/// Turn a classifier reply into `(role, reason)`.
///
/// Tolerates quoting, capitalisation, trailing punctuation and extra words
/// after the role name. Anything not in `available_roles` maps to the
/// default role.
pub fn parse_classification(reply: &str, available_roles: &[String]) -> (String, &'static str) {
    let lowered = reply.trim().to_lowercase();
    let unquoted = lowered.trim_matches(|c| c == '"' || c == '\'' || c == '`');
    let candidate = unquoted
        .split_whitespace()
        .next()
        .map(|w| w.strip_suffix(['.', ',']).unwrap_or(w))
        .unwrap_or(unquoted);

    if available_roles.iter().any(|r| r == candidate) {
        (
            candidate.to_string(),
            "LLM selected based on message analysis",
        )
    } else {
        (
            DEFAULT_ROLE.to_string(),
            "LLM did not match any available role, using default",
        )
    }
}
