//! Tool domain entities

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Name of the built-in shell command tool
pub const RUN_CMD: &str = "run_cmd";

/// Argument key carrying the shell command for [`RUN_CMD`]
pub const CMD_ARG: &str = "cmd";

/// Tool arguments as requested by the model (string values only).
///
/// Ordered so prompts and confirmation messages render deterministically.
pub type ToolArgs = BTreeMap<String, String>;

/// Risk level of a tool operation
///
/// Ordered: `Low < Medium < High < Critical`. Critical is never allowed to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// Read-only inspection
    Low,
    /// May observe sensitive state or be expensive (e.g., arbitrary shell)
    Medium,
    /// Modifies state
    High,
    /// Always blocked
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }

    pub fn is_critical(&self) -> bool {
        matches!(self, RiskLevel::Critical)
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            "critical" => Ok(RiskLevel::Critical),
            other => Err(DomainError::InvalidRiskLevel(other.to_string())),
        }
    }
}

/// Definition of a tool the operator may call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique name of the tool (e.g., "run_cmd")
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Risk level of this tool
    pub risk_level: RiskLevel,
    /// Argument schema: parameter name → description
    pub parameters: Vec<ToolParameter>,
}

/// Parameter specification for a tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolParameter {
    pub name: String,
    pub description: String,
}

impl ToolDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        risk_level: RiskLevel,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            risk_level,
            parameters: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, param: ToolParameter) -> Self {
        self.parameters.push(param);
        self
    }

    pub fn is_shell(&self) -> bool {
        self.name == RUN_CMD
    }

    /// One prompt line: `- name: description. Args: key: desc, ...`
    pub fn prompt_line(&self) -> String {
        let schema = self
            .parameters
            .iter()
            .map(|p| format!("{}: {}", p.name, p.description))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "- {}: {}. Args: {}",
            self.name,
            self.description.trim_end_matches('.'),
            schema
        )
    }
}

impl ToolParameter {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Definition of the built-in shell tool
pub fn run_cmd_definition() -> ToolDefinition {
    ToolDefinition::new(
        RUN_CMD,
        "Execute a shell command. Use for reading system state (e.g. df, du, find).",
        RiskLevel::Medium,
    )
    .with_parameter(ToolParameter::new(CMD_ARG, "shell command to run"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_level_ordering() {
        assert!(RiskLevel::Low < RiskLevel::Medium);
        assert!(RiskLevel::Medium < RiskLevel::High);
        assert!(RiskLevel::High < RiskLevel::Critical);
        assert!(RiskLevel::Critical.is_critical());
    }

    #[test]
    fn test_risk_level_round_trips_through_str() {
        for level in [
            RiskLevel::Low,
            RiskLevel::Medium,
            RiskLevel::High,
            RiskLevel::Critical,
        ] {
            assert_eq!(level.as_str().parse::<RiskLevel>().unwrap(), level);
        }
        assert!("extreme".parse::<RiskLevel>().is_err());
    }

    #[test]
    fn test_run_cmd_definition() {
        let def = run_cmd_definition();
        assert_eq!(def.name, RUN_CMD);
        assert_eq!(def.risk_level, RiskLevel::Medium);
        assert!(def.is_shell());
        assert_eq!(
            def.prompt_line(),
            "- run_cmd: Execute a shell command. Use for reading system state (e.g. df, du, find). Args: cmd: shell command to run"
        );
    }
}
