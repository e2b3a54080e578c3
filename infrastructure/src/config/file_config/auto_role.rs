//! Role detection configuration from TOML (`[auto_role]` section)

use super::ConfigIssue;
use gaia_domain::{DetectionMode, RoleKeywords};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw auto-role configuration from TOML
///
/// # Example
///
/// ```toml
/// [auto_role]
/// enabled = true
/// mode = "hybrid"            # "off", "heuristic", "hybrid"
///
/// [auto_role.keywords]
/// shell = ["command", "run", "terminal"]
/// review = ["review", "code review"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAutoRoleConfig {
    pub enabled: bool,
    pub mode: String,
    pub keywords: BTreeMap<String, Vec<String>>,
}

impl Default for FileAutoRoleConfig {
    fn default() -> Self {
        let stock = RoleKeywords::defaults();
        let keywords = stock
            .roles()
            .map(|role| (role.to_string(), stock.get(role).to_vec()))
            .collect();
        Self {
            enabled: true,
            mode: DetectionMode::Hybrid.as_str().to_string(),
            keywords,
        }
    }
}

impl FileAutoRoleConfig {
    /// Parse `mode`, falling back to hybrid with a warning.
    pub fn parse_mode(&self) -> (DetectionMode, Vec<ConfigIssue>) {
        match self.mode.trim().parse::<DetectionMode>() {
            Ok(mode) => (mode, vec![]),
            Err(_) => (
                DetectionMode::Hybrid,
                vec![ConfigIssue::new(
                    "auto_role.mode",
                    format!(
                        "unknown value '{}', falling back to 'hybrid' (valid: off, heuristic, hybrid)",
                        self.mode
                    ),
                )],
            ),
        }
    }

    pub fn to_role_keywords(&self) -> RoleKeywords {
        let mut keywords = RoleKeywords::new();
        for (role, list) in &self.keywords {
            keywords.insert(role.clone(), list);
        }
        keywords
    }
}
