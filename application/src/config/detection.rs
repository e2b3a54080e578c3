//! Role detection settings.

use gaia_domain::{DEFAULT_ROLE, DetectionMode, RoleKeywords};

/// Role detection control.
#[derive(Debug, Clone)]
pub struct DetectionSettings {
    pub enabled: bool,
    pub mode: DetectionMode,
    pub keywords: RoleKeywords,
    /// Configured role names, in configuration order.
    pub roles: Vec<String>,
    /// System prompt sent with the classification request.
    pub classifier_system_prompt: String,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            mode: DetectionMode::Hybrid,
            keywords: RoleKeywords::defaults(),
            roles: Vec::new(),
            classifier_system_prompt: String::new(),
        }
    }
}

impl DetectionSettings {
    // ==================== Builder Methods ====================

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_mode(mut self, mode: DetectionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_keywords(mut self, keywords: RoleKeywords) -> Self {
        self.keywords = keywords;
        self
    }

    pub fn with_roles(mut self, roles: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_classifier_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.classifier_system_prompt = prompt.into();
        self
    }

    // ==================== Query Methods ====================

    /// `default` followed by every other configured role, without
    /// duplicates.
    pub fn available_roles(&self) -> Vec<String> {
        let mut roles = vec![DEFAULT_ROLE.to_string()];
        for role in &self.roles {
            let role = role.trim();
            if !role.is_empty() && !roles.iter().any(|r| r == role) {
                roles.push(role.to_string());
            }
        }
        roles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_available_roles_default_first_deduplicated() {
        let settings =
            DetectionSettings::default().with_roles(["shell", "default", "code", "shell", " "]);
        assert_eq!(settings.available_roles(), ["default", "shell", "code"]);
    }

    #[test]
    fn test_available_roles_without_config() {
        assert_eq!(DetectionSettings::default().available_roles(), ["default"]);
    }
}
