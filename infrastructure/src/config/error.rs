//! Configuration errors

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(Box<figment::Error>),

    #[error("config file {} does not exist", .0.display())]
    NotFound(PathBuf),

    #[error("could not determine the configuration directory")]
    NoConfigDir,

    #[error("configuration key '{0}' is not set. Use 'gaia config list' to see available keys")]
    KeyNotSet(String),

    #[error(
        "invalid config key '{0}'. Valid keys include: provider.model, provider.host, provider.port, \
         cache.enabled, cache.dir, roles.*, auto_role.enabled, auto_role.mode, auto_role.keywords.*, \
         operator.*, tools.*"
    )]
    InvalidKey(String),

    #[error("invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write config file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}
