//! Role templates with their runtime substitutions.

use gaia_domain::{DEFAULT_ROLE, default_role_templates, render_role_template};
use std::collections::BTreeMap;

/// Role name → system-prompt template, plus the values for `{shell}` and
/// `{os}`.
#[derive(Debug, Clone)]
pub struct RoleCatalog {
    templates: BTreeMap<String, String>,
    shell: String,
    os: String,
}

impl Default for RoleCatalog {
    fn default() -> Self {
        Self::new(default_role_templates(), "sh", std::env::consts::OS)
    }
}

impl RoleCatalog {
    pub fn new(
        templates: BTreeMap<String, String>,
        shell: impl Into<String>,
        os: impl Into<String>,
    ) -> Self {
        Self {
            templates,
            shell: shell.into(),
            os: os.into(),
        }
    }

    /// Raw template; empty for unknown roles.
    pub fn template(&self, role: &str) -> &str {
        self.templates.get(role).map(String::as_str).unwrap_or_default()
    }

    /// Template with `{shell}` and `{os}` filled in.
    pub fn render(&self, role: &str) -> String {
        render_role_template(self.template(role), &self.shell, &self.os)
    }

    pub fn contains(&self, role: &str) -> bool {
        self.templates.contains_key(role)
    }

    /// Configured role names other than `default`, sorted.
    pub fn names(&self) -> Vec<String> {
        self.templates
            .keys()
            .filter(|name| name.as_str() != DEFAULT_ROLE)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_substitutes_shell_and_os() {
        let catalog = RoleCatalog::new(
            BTreeMap::from([("admin".to_string(), "Hello {shell} on {os}".to_string())]),
            "/bin/bash",
            "linux",
        );
        assert_eq!(catalog.render("admin"), "Hello /bin/bash on linux");
        assert_eq!(catalog.render("missing"), "");
    }

    #[test]
    fn test_names_skip_default() {
        let catalog = RoleCatalog::default();
        assert_eq!(
            catalog.names(),
            ["branch", "code", "commit", "describe", "shell"]
        );
        assert!(catalog.contains("default"));
    }
}
