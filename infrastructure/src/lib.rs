//! Infrastructure layer for gaia
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: model providers, shell and action runners,
//! the on-disk cache, and configuration file loading.

pub mod cache;
pub mod config;
pub mod providers;
pub mod tools;

// Re-export commonly used types
pub use cache::{CacheEntry, CacheListing, CacheStats, FileCache};
pub use config::{ConfigEditor, ConfigError, ConfigIssue, ConfigLoader, FileConfig};
pub use providers::{OllamaGateway, OpenAiCompatibleGateway, ProviderKind, gateway_for};
pub use tools::{ProcessActionLauncher, ShellCommandRunner, build_command_args};
