//! Configuration file loader with multi-source merging

use super::error::ConfigError;
use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "gaia";
const PROJECT_FILES: [&str; 2] = ["gaia.toml", ".gaia.toml"];
/// Names an explicit config file, like `--config`
pub const CONFIG_ENV: &str = "GAIA_CONFIG";
const ENV_PREFIX: &str = "GAIA_";

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `GAIA_*` environment variables (`GAIA_PROVIDER__MODEL=llama3`)
    /// 2. Explicit config path (`--config`, then `GAIA_CONFIG`)
    /// 3. Project root: `./gaia.toml` or `./.gaia.toml`
    /// 4. Global: `$XDG_CONFIG_HOME/gaia/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&Path>) -> Result<FileConfig, ConfigError> {
        let explicit = Self::explicit_config_path(config_path);
        if let Some(path) = &explicit
            && !path.exists()
        {
            return Err(ConfigError::NotFound(path.clone()));
        }
        Self::figment(
            Self::global_config_path().as_deref(),
            Self::project_config_path().as_deref(),
            explicit.as_deref(),
        )
        .extract()
        .map_err(|e| ConfigError::Load(Box::new(e)))
    }

    /// The merged provider stack, without touching the filesystem beyond
    /// the given paths.
    pub fn figment(
        global: Option<&Path>,
        project: Option<&Path>,
        explicit: Option<&Path>,
    ) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        for path in [global, project, explicit].into_iter().flatten() {
            if path.exists() {
                figment = figment.merge(Toml::file(path));
            }
        }

        figment.merge(
            Env::prefixed(ENV_PREFIX)
                .ignore(&["CONFIG"])
                .split("__"),
        )
    }

    /// Load only default configuration
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// `$XDG_CONFIG_HOME/gaia/config.toml` (or the platform equivalent)
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// `--config` if given, else a non-empty `GAIA_CONFIG`.
    pub fn explicit_config_path(cli: Option<&Path>) -> Option<PathBuf> {
        cli.map(Path::to_path_buf).or_else(|| {
            std::env::var(CONFIG_ENV)
                .ok()
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from)
        })
    }

    /// File that `config set` and `config create` write to.
    pub fn writable_config_path(cli: Option<&Path>) -> Result<PathBuf, ConfigError> {
        Self::explicit_config_path(cli)
            .or_else(Self::global_config_path)
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Candidate files in priority order (highest first), with whether each
    /// exists. Used by `config path`.
    pub fn config_sources(cli: Option<&Path>) -> Vec<(&'static str, PathBuf, bool)> {
        let mut sources = Vec::new();
        if let Some(path) = Self::explicit_config_path(cli) {
            let found = path.exists();
            sources.push(("Explicit", path, found));
        }
        let project = Self::project_config_path();
        let found = project.is_some();
        sources.push((
            "Project",
            project.unwrap_or_else(|| PathBuf::from(PROJECT_FILES[0])),
            found,
        ));
        if let Some(path) = Self::global_config_path() {
            let found = path.exists();
            sources.push(("Global", path, found));
        }
        sources
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config.provider.model, "mistral");
        assert_eq!(config.operator.max_steps, 10);
    }

    #[test]
    fn test_global_config_path_returns_some() {
        // Should return a path (even if file doesn't exist)
        let path = ConfigLoader::global_config_path().unwrap();
        assert!(path.ends_with("gaia/config.toml"));
    }

    #[test]
    fn test_later_files_override_earlier_ones() {
        let dir = TempDir::new().unwrap();
        let global = dir.path().join("global.toml");
        let project = dir.path().join("project.toml");
        fs::write(
            &global,
            "[provider]\nmodel = \"llama3\"\nport = 11500\n\n[roles]\nreview = \"Review it.\"\n",
        )
        .unwrap();
        fs::write(&project, "[provider]\nmodel = \"qwen2\"\n").unwrap();

        let config: FileConfig = ConfigLoader::figment(Some(&global), Some(&project), None)
            .extract()
            .unwrap();
        assert_eq!(config.provider.model, "qwen2");
        assert_eq!(config.provider.port, 11500);
        assert_eq!(config.provider.host, "localhost");
        // Role tables merge with the built-in ones
        assert_eq!(config.roles["review"], "Review it.");
        assert!(config.roles.contains_key("shell"));
    }

    #[test]
    fn test_missing_files_are_skipped() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        let config: FileConfig = ConfigLoader::figment(Some(&missing), None, None)
            .extract()
            .unwrap();
        assert_eq!(config, FileConfig::default());
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = ConfigLoader::load(Some(&missing)).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(path) if path == missing));
    }

    #[test]
    fn test_keyword_lists_replace_defaults() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("config.toml");
        fs::write(&file, "[auto_role.keywords]\nshell = [\"terminal\"]\n").unwrap();
        let config: FileConfig = ConfigLoader::figment(None, None, Some(&file))
            .extract()
            .unwrap();
        assert_eq!(config.auto_role.keywords["shell"], ["terminal"]);
        assert!(config.auto_role.keywords.contains_key("commit"));
    }
}
