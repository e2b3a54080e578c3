//! Built-in role templates.
//!
//! Templates may contain `{shell}` and `{os}`, substituted at request time
//! by [`render_role_template`].

use std::collections::BTreeMap;

const DEFAULT: &str = "You are programming and system administration assistant. \
You are managing {os} operating system with {shell} shell. \
Provide short responses in about 100 words, unless you are specifically asked for more details. \
If you need to store any data, assume it will be stored in the conversation. \
APPLY MARKDOWN formatting when possible.";

const DESCRIBE: &str = "Provide a terse, single sentence description of the given shell command. \
Describe each argument and option of the command. \
Provide short responses in about 80 words. \
APPLY MARKDOWN formatting when possible.";

const SHELL: &str = "Provide only {shell} commands for {os} without any description. \
If there is a lack of details, provide the most logical solution. \
Ensure the output is a valid shell command. \
If multiple steps are required, try to combine them using &&. \
Provide only plain text without Markdown formatting. \
Do not use markdown formatting such as ```.";

const CODE: &str = "Provide only code as output without any description. \
Provide only code in plain text format without Markdown formatting. \
Do not include symbols such as ``` or ```python. \
If there is a lack of details, provide most logical solution. \
You are not allowed to ask for more details. \
For example if the prompt is \"Hello world Python\", you should return \"print('Hello world')\".";

const COMMIT: &str = "Generate a conventional commit message based on the provided git diff. \
The message must have multiple lines: first line is the title (type: subject format), \
followed by a blank line, then a detailed description on multiple lines. \
Title format: start with a type (feat, fix, docs, style, refactor, test, chore), \
followed by a colon and space, then a brief description in lowercase. \
The description should explain what and why, not how. \
Do not include markdown formatting, code blocks, or explanations. \
Only return the commit message itself.";

const BRANCH: &str = "Generate a concise branch name based on the provided git diff or description. \
The branch name should be lowercase, use hyphens to separate words, \
and be descriptive but short (max 50 characters). \
Follow common patterns like: feature/description, fix/description, refactor/description. \
Do not include markdown formatting, code blocks, or explanations. \
Only return the branch name itself.";

/// Stock role name → template map.
pub fn default_role_templates() -> BTreeMap<String, String> {
    [
        ("default", DEFAULT),
        ("describe", DESCRIBE),
        ("shell", SHELL),
        ("code", CODE),
        ("commit", COMMIT),
        ("branch", BRANCH),
    ]
    .into_iter()
    .map(|(name, text)| (name.to_string(), text.to_string()))
    .collect()
}

/// Fill in `{shell}` and `{os}`.
pub fn render_role_template(template: &str, shell: &str, os: &str) -> String {
    template.replace("{shell}", shell).replace("{os}", os)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_roles_present() {
        let templates = default_role_templates();
        let names: Vec<&str> = templates.keys().map(String::as_str).collect();
        assert_eq!(
            names,
            ["branch", "code", "commit", "default", "describe", "shell"]
        );
    }

    #[test]
    fn test_render_substitutes_placeholders() {
        let templates = default_role_templates();
        let rendered = render_role_template(&templates["shell"], "zsh", "linux");
        assert!(rendered.starts_with("Provide only zsh commands for linux"));
        assert!(!rendered.contains("{shell}"));

        let rendered = render_role_template(&templates["default"], "bash", "macos");
        assert!(rendered.contains("managing macos operating system with bash shell"));
    }

    #[test]
    fn test_render_without_placeholders_is_identity() {
        assert_eq!(render_role_template("plain", "sh", "linux"), "plain");
    }
}
