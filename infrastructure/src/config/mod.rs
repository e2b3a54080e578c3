//! Configuration file loading for gaia
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `GAIA_*` environment variables (`__` separates nested keys)
//! 2. `--config <path>` or `GAIA_CONFIG`
//! 3. Project root: `./gaia.toml` or `./.gaia.toml`
//! 4. Global: `$XDG_CONFIG_HOME/gaia/config.toml`
//! 5. Default values

mod editor;
mod error;
mod file_config;
mod loader;

pub use editor::ConfigEditor;
pub use error::ConfigError;
pub use file_config::{
    ConfigIssue, FileAutoRoleConfig, FileCacheConfig, FileConfig, FileOperatorConfig,
    FileProviderConfig, FileToolsConfig,
};
pub use loader::{CONFIG_ENV, ConfigLoader};
