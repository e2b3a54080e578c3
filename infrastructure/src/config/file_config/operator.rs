//! Operator configuration from TOML (`[operator]` section)

use super::ConfigIssue;
use gaia_domain::{GuardOptions, OperatorPolicy};
use gaia_domain::operator::policy::{
    DEFAULT_MAX_PARSE_FAILURES, DEFAULT_MAX_STEPS, DEFAULT_OUTPUT_MAX_BYTES,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw operator configuration from TOML
///
/// # Example
///
/// ```toml
/// [operator]
/// max_steps = 10
/// confirm_medium_risk = true
/// denylist = ["rm -rf", "sudo"]
/// allowlist = ["ls", "df", "du"]       # empty = any command
/// command_timeout_seconds = 30
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOperatorConfig {
    pub max_steps: usize,
    pub max_parse_failures: usize,
    pub confirm_medium_risk: bool,
    pub dry_run: bool,
    pub denylist: Vec<String>,
    pub allowlist: Vec<String>,
    pub output_max_bytes: usize,
    /// 0 disables the per-command timeout
    pub command_timeout_seconds: u64,
}

impl Default for FileOperatorConfig {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            max_parse_failures: DEFAULT_MAX_PARSE_FAILURES,
            confirm_medium_risk: true,
            dry_run: false,
            denylist: ["rm -rf", "sudo", "mkfs", "dd if=", "shutdown", "reboot"]
                .into_iter()
                .map(String::from)
                .collect(),
            allowlist: Vec::new(),
            output_max_bytes: DEFAULT_OUTPUT_MAX_BYTES,
            command_timeout_seconds: 30,
        }
    }
}

impl FileOperatorConfig {
    pub fn to_policy(&self) -> OperatorPolicy {
        OperatorPolicy::default()
            .with_max_steps(self.max_steps)
            .with_max_parse_failures(self.max_parse_failures)
            .with_output_max_bytes(self.output_max_bytes)
            .normalized()
    }

    /// Guard options before command-line overrides (`--dry-run`, `--yes`).
    pub fn to_guard_options(&self) -> GuardOptions {
        GuardOptions::new()
            .with_denylist(self.denylist.iter().cloned())
            .with_allowlist(self.allowlist.iter().cloned())
            .with_confirm_medium_risk(self.confirm_medium_risk)
            .with_dry_run(self.dry_run)
    }

    pub fn command_timeout(&self) -> Option<Duration> {
        (self.command_timeout_seconds > 0).then(|| Duration::from_secs(self.command_timeout_seconds))
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.max_steps == 0 {
            issues.push(ConfigIssue::new(
                "operator.max_steps",
                format!("0 is not a valid step limit, using {DEFAULT_MAX_STEPS}"),
            ));
        }
        issues
    }
}
