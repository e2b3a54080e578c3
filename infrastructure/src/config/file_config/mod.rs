//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and translated into application types
//! (`Endpoint`, `RoleCatalog`, `DetectionSettings`, `OperatorPolicy`) by the
//! `to_*` methods.

mod auto_role;
mod cache;
mod operator;
mod provider;
mod tools;

pub use auto_role::FileAutoRoleConfig;
pub use cache::FileCacheConfig;
pub use operator::FileOperatorConfig;
pub use provider::FileProviderConfig;
pub use tools::FileToolsConfig;

use gaia_application::{DetectionSettings, RoleCatalog};
use gaia_domain::{DEFAULT_ROLE, default_role_templates};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A non-fatal problem in the loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    /// Dotted key, e.g. `auto_role.mode`
    pub field: String,
    pub message: String,
}

impl ConfigIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub provider: FileProviderConfig,
    pub cache: FileCacheConfig,
    /// Role name → system-prompt template
    pub roles: BTreeMap<String, String>,
    pub auto_role: FileAutoRoleConfig,
    pub operator: FileOperatorConfig,
    pub tools: FileToolsConfig,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            provider: FileProviderConfig::default(),
            cache: FileCacheConfig::default(),
            roles: default_role_templates(),
            auto_role: FileAutoRoleConfig::default(),
            operator: FileOperatorConfig::default(),
            tools: FileToolsConfig::default(),
        }
    }
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// Everything reported here has a fallback; none of it stops the CLI.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        issues.extend(self.auto_role.parse_mode().1);
        issues.extend(self.operator.validate());

        for (tool, action, recipe) in self.tools.iter() {
            let role = recipe.role.trim();
            if !role.is_empty() && !self.roles.contains_key(role) {
                issues.push(ConfigIssue::new(
                    format!("tools.{tool}.{action}.role"),
                    format!("role '{role}' is not defined in [roles], using '{DEFAULT_ROLE}'"),
                ));
            }
        }

        if self.provider.model.trim().is_empty() {
            issues.push(ConfigIssue::new("provider.model", "model name is empty"));
        }

        issues
    }

    pub fn to_role_catalog(&self, shell: &str, os: &str) -> RoleCatalog {
        RoleCatalog::new(self.roles.clone(), shell, os)
    }

    /// Detection settings over the configured roles. The classifier's system
    /// prompt is the rendered `default` role.
    pub fn to_detection_settings(&self, catalog: &RoleCatalog) -> DetectionSettings {
        DetectionSettings::default()
            .with_enabled(self.auto_role.enabled)
            .with_mode(self.auto_role.parse_mode().0)
            .with_keywords(self.auto_role.to_role_keywords())
            .with_roles(catalog.names())
            .with_classifier_system_prompt(catalog.render(DEFAULT_ROLE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gaia_domain::DetectionMode;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[provider]
model = "gpt-4o"
host = "api.openai.com"
port = 443

[cache]
enabled = false

[roles]
review = "Review the given code."

[auto_role]
mode = "heuristic"

[auto_role.keywords]
review = ["review", "code review"]

[operator]
max_steps = 4
allowlist = ["ls", "df"]

[tools.git.commit]
context_command = "git diff --cached"
role = "commit"
execute_command = "git commit -F {file}"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.provider.to_endpoint().host, "api.openai.com");
        assert_eq!(config.provider.port, 443);
        assert!(!config.cache.enabled);
        assert_eq!(config.roles["review"], "Review the given code.");
        assert_eq!(config.auto_role.parse_mode().0, DetectionMode::Heuristic);
        assert_eq!(config.operator.max_steps, 4);
        assert_eq!(config.operator.allowlist, ["ls", "df"]);
        assert!(config.operator.confirm_medium_risk);
        assert_eq!(
            config.tools.action("git", "commit").unwrap().context_command,
            "git diff --cached"
        );
    }

    #[test]
    fn test_deserialize_partial_config() {
        let toml_str = r#"
[provider]
model = "llama3"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.provider.model, "llama3");
        // Defaults should apply
        assert_eq!(config.provider.host, "localhost");
        assert_eq!(config.provider.port, 11434);
        assert!(config.cache.enabled);
        assert!(config.roles.contains_key("shell"));
    }

    #[test]
    fn test_validate_valid_config() {
        let config = FileConfig::default();
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_validate_reports_undefined_tool_role() {
        let mut config = FileConfig::default();
        config.roles.remove("branch");
        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "tools.git.branch.role");
    }

    #[test]
    fn test_detection_settings_from_config() {
        let mut config = FileConfig::default();
        config.auto_role.enabled = false;
        let catalog = config.to_role_catalog("/bin/zsh", "linux");
        let settings = config.to_detection_settings(&catalog);
        assert!(!settings.enabled);
        assert_eq!(
            settings.available_roles(),
            ["default", "branch", "code", "commit", "describe", "shell"]
        );
        assert!(settings.classifier_system_prompt.contains("/bin/zsh"));
        assert!(settings.classifier_system_prompt.contains("linux"));
    }
}
