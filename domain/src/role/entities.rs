//! Role detection entities

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Role that is always available and used when nothing else fits
pub const DEFAULT_ROLE: &str = "default";

/// How a role was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionMethod {
    Explicit,
    Heuristic,
    Llm,
    Default,
}

impl DetectionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionMethod::Explicit => "explicit",
            DetectionMethod::Heuristic => "heuristic",
            DetectionMethod::Llm => "llm",
            DetectionMethod::Default => "default",
        }
    }
}

impl std::fmt::Display for DetectionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DetectionMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "explicit" => Ok(DetectionMethod::Explicit),
            "heuristic" => Ok(DetectionMethod::Heuristic),
            "llm" => Ok(DetectionMethod::Llm),
            "default" => Ok(DetectionMethod::Default),
            other => Err(DomainError::InvalidDetectionMethod(other.to_string())),
        }
    }
}

/// Which detection stages run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionMode {
    /// No automatic detection
    Off,
    /// Keyword scoring only
    Heuristic,
    /// Keyword scoring, then an LLM classification call
    #[default]
    Hybrid,
}

impl DetectionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionMode::Off => "off",
            DetectionMode::Heuristic => "heuristic",
            DetectionMode::Hybrid => "hybrid",
        }
    }

    pub fn uses_heuristic(&self) -> bool {
        matches!(self, DetectionMode::Heuristic | DetectionMode::Hybrid)
    }

    pub fn uses_llm(&self) -> bool {
        matches!(self, DetectionMode::Hybrid)
    }
}

impl std::fmt::Display for DetectionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DetectionMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "off" => Ok(DetectionMode::Off),
            "heuristic" => Ok(DetectionMode::Heuristic),
            "hybrid" | "" => Ok(DetectionMode::Hybrid),
            other => Err(DomainError::InvalidDetectionMode(other.to_string())),
        }
    }
}

/// Outcome of role detection for one message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub role: String,
    pub method: DetectionMethod,
    /// Heuristic confidence; 0 when not applicable
    #[serde(default, skip_serializing_if = "is_zero")]
    pub score: f64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,
}

fn is_zero(score: &f64) -> bool {
    *score == 0.0
}

impl DetectionResult {
    pub fn new(role: impl Into<String>, method: DetectionMethod, reason: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            method,
            score: 0.0,
            reason: reason.into(),
        }
    }

    pub fn explicit(role: impl Into<String>) -> Self {
        Self::new(role, DetectionMethod::Explicit, "role explicitly provided")
    }

    pub fn fallback(reason: impl Into<String>) -> Self {
        Self::new(DEFAULT_ROLE, DetectionMethod::Default, reason)
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = score;
        self
    }
}

/// Keyword lists per role, lower-cased on insertion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleKeywords {
    keywords: BTreeMap<String, Vec<String>>,
}

impl RoleKeywords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_role(
        mut self,
        role: impl Into<String>,
        keywords: impl IntoIterator<Item = impl AsRef<str>>,
    ) -> Self {
        self.insert(role, keywords);
        self
    }

    pub fn insert(
        &mut self,
        role: impl Into<String>,
        keywords: impl IntoIterator<Item = impl AsRef<str>>,
    ) {
        let normalized = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        self.keywords.insert(role.into(), normalized);
    }

    /// Keywords for `role`; empty if none are configured.
    pub fn get(&self, role: &str) -> &[String] {
        self.keywords.get(role).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.keywords.keys().map(String::as_str)
    }

    /// Built-in keyword lists for the stock roles.
    pub fn defaults() -> Self {
        Self::new()
            .with_role(
                "shell",
                [
                    "command", "run", "execute", "terminal", "bash", "zsh", "sh", "shell", "cd",
                    "ls", "grep", "find", "mkdir", "rm", "cp", "mv", "cat", "echo", "sudo",
                    "chmod", "chown", "ps", "kill", "pkill", "systemctl", "service", "install",
                    "uninstall", "package", "apt", "yum", "brew", "pip", "npm",
                ],
            )
            .with_role(
                "code",
                [
                    "function", "class", "def", "import", "return", "if", "else", "for",
                    "while", "variable", "array", "list", "dict", "string", "int", "bool",
                    "type", "python", "javascript", "java", "go", "rust", "c++", "c#", "php",
                    "ruby", "code", "programming", "algorithm", "api", "endpoint", "json", "xml",
                    "database", "sql", "query", "table", "schema", "migration",
                ],
            )
            .with_role(
                "describe",
                [
                    "what",
                    "what does",
                    "explain",
                    "describe",
                    "meaning",
                    "definition",
                    "how does",
                    "tell me about",
                    "what is",
                    "what are",
                    "help me understand",
                ],
            )
            .with_role(
                "commit",
                [
                    "commit message",
                    "generate commit",
                    "create commit",
                    "write commit",
                    "make commit",
                    "conventional commit",
                    "changelog",
                    "commit msg",
                    "git commit message",
                    "commit",
                ],
            )
            .with_role(
                "branch",
                [
                    "create branch",
                    "new branch",
                    "make branch",
                    "generate branch",
                    "branch name",
                    "git branch",
                    "checkout branch",
                    "switch branch",
                    "branch",
                ],
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing() {
        assert_eq!("off".parse::<DetectionMode>().unwrap(), DetectionMode::Off);
        assert_eq!(
            " Heuristic ".parse::<DetectionMode>().unwrap(),
            DetectionMode::Heuristic
        );
        assert_eq!("".parse::<DetectionMode>().unwrap(), DetectionMode::Hybrid);
        assert!("smart".parse::<DetectionMode>().is_err());
    }

    #[test]
    fn test_mode_stages() {
        assert!(!DetectionMode::Off.uses_heuristic());
        assert!(DetectionMode::Heuristic.uses_heuristic());
        assert!(!DetectionMode::Heuristic.uses_llm());
        assert!(DetectionMode::Hybrid.uses_llm());
    }

    #[test]
    fn test_detection_result_json_omits_empty_fields() {
        let json = serde_json::to_string(&DetectionResult::explicit("shell")).unwrap();
        assert_eq!(
            json,
            r#"{"role":"shell","method":"explicit","reason":"role explicitly provided"}"#
        );

        let scored = DetectionResult::new("code", DetectionMethod::Heuristic, "")
            .with_score(0.5);
        let back: DetectionResult =
            serde_json::from_str(&serde_json::to_string(&scored).unwrap()).unwrap();
        assert_eq!(back, scored);
    }

    #[test]
    fn test_keywords_normalized() {
        let keywords = RoleKeywords::new().with_role("shell", ["  LS ", "", "Grep"]);
        assert_eq!(keywords.get("shell"), ["ls", "grep"]);
        assert!(keywords.get("missing").is_empty());
    }

    #[test]
    fn test_default_keywords_cover_stock_roles() {
        let keywords = RoleKeywords::defaults();
        let roles: Vec<&str> = keywords.roles().collect();
        assert_eq!(roles, ["branch", "code", "commit", "describe", "shell"]);
        assert_eq!(keywords.get("shell").len(), 34);
        assert!(keywords.get("commit").contains(&"git commit message".to_string()));
    }
}
