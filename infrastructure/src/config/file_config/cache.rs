//! Cache configuration from TOML (`[cache]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw cache configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCacheConfig {
    pub enabled: bool,
    /// Cache directory; `<config_dir>/gaia/cache` when unset
    pub dir: Option<String>,
}

impl Default for FileCacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: None,
        }
    }
}

impl FileCacheConfig {
    /// Resolved cache directory. A leading `~/` expands to the home directory.
    pub fn resolved_dir(&self) -> PathBuf {
        match self.dir.as_deref().map(str::trim) {
            Some(dir) if !dir.is_empty() => expand_home(dir),
            _ => Self::default_dir(),
        }
    }

    pub fn default_dir() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("gaia").join("cache"))
            .unwrap_or_else(|| PathBuf::from(".gaia-cache"))
    }
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_dir_wins() {
        let config = FileCacheConfig {
            enabled: true,
            dir: Some("/tmp/gaia-cache".to_string()),
        };
        assert_eq!(config.resolved_dir(), PathBuf::from("/tmp/gaia-cache"));
    }

    #[test]
    fn test_blank_dir_falls_back_to_default() {
        let config = FileCacheConfig {
            enabled: true,
            dir: Some("  ".to_string()),
        };
        assert_eq!(config.resolved_dir(), FileCacheConfig::default_dir());
    }
}
