//! Tool actions from TOML (`[tools.<tool>.<action>]` sections)
//!
//! ```toml
//! [tools.git.commit]
//! context_command = "git diff --staged"
//! role = "commit"
//! execute_command = "git commit -F {file}"
//! ```

use gaia_application::ToolAction;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `tool name → action name → recipe`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileToolsConfig(pub BTreeMap<String, BTreeMap<String, ToolAction>>);

impl Default for FileToolsConfig {
    fn default() -> Self {
        let git = BTreeMap::from([
            (
                "commit".to_string(),
                ToolAction::new("git diff --staged", "commit", "git commit -F {file}"),
            ),
            (
                "branch".to_string(),
                ToolAction::new("git diff", "branch", "git checkout -b {response}"),
            ),
        ]);
        Self(BTreeMap::from([("git".to_string(), git)]))
    }
}

impl FileToolsConfig {
    pub fn action(&self, tool: &str, action: &str) -> Option<&ToolAction> {
        self.0.get(tool)?.get(action)
    }

    /// Every configured action as `(tool, action, recipe)`.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &ToolAction)> {
        self.0.iter().flat_map(|(tool, actions)| {
            actions
                .iter()
                .map(move |(action, recipe)| (tool.as_str(), action.as_str(), recipe))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_git_actions() {
        let tools = FileToolsConfig::default();
        let commit = tools.action("git", "commit").unwrap();
        assert_eq!(commit.role, "commit");
        assert_eq!(commit.execute_command, "git commit -F {file}");
        assert!(tools.action("git", "push").is_none());
        assert!(tools.action("hg", "commit").is_none());
        assert_eq!(tools.iter().count(), 2);
    }

    #[test]
    fn test_deserialize_nested_tables() {
        let toml_str = r#"
[docker.logs]
context_command = "docker logs --tail 50 web"
role = "describe"
"#;
        let tools: FileToolsConfig = toml::from_str(toml_str).unwrap();
        let logs = tools.action("docker", "logs").unwrap();
        assert_eq!(logs.context_command, "docker logs --tail 50 web");
        assert!(logs.execute_command.is_empty());
    }
}
