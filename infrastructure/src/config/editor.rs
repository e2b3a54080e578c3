//! `gaia config get|set|list|create`
//!
//! Reads go through the merged [`FileConfig`]; writes edit a single TOML
//! file in place so unrelated keys and sections survive.

use super::error::ConfigError;
use super::file_config::FileConfig;
use std::fs;
use std::path::Path;
use toml::{Table, Value};

const EXACT_KEYS: [&str; 7] = [
    "provider.model",
    "provider.host",
    "provider.port",
    "cache.enabled",
    "cache.dir",
    "auto_role.enabled",
    "auto_role.mode",
];

const OPEN_PREFIXES: [&str; 4] = ["roles.", "auto_role.keywords.", "operator.", "tools."];

pub struct ConfigEditor;

impl ConfigEditor {
    /// Exact keys, plus anything under `roles.`, `auto_role.keywords.`,
    /// `operator.` and `tools.`.
    pub fn is_valid_key(key: &str) -> bool {
        if key.split('.').any(str::is_empty) {
            return false;
        }
        EXACT_KEYS.contains(&key) || OPEN_PREFIXES.iter().any(|prefix| key.starts_with(prefix))
    }

    /// The effective configuration as TOML.
    pub fn list(config: &FileConfig) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(config)?)
    }

    /// One value; strings are printed bare, tables as TOML.
    pub fn get(config: &FileConfig, key: &str) -> Result<String, ConfigError> {
        let root = Value::try_from(config)?;
        let value =
            lookup(&root, key).ok_or_else(|| ConfigError::KeyNotSet(key.to_string()))?;
        match value {
            Value::String(s) => Ok(s.clone()),
            Value::Table(table) => Ok(toml::to_string_pretty(table)?),
            other => Ok(other.to_string()),
        }
    }

    /// Set `key` in the file at `path`, creating the file if needed.
    ///
    /// The raw string is typed after the built-in default for the key:
    /// integers, booleans, and comma-separated lists. Unknown keys are
    /// strings, except keyword lists.
    pub fn set(path: &Path, key: &str, raw: &str) -> Result<(), ConfigError> {
        if !Self::is_valid_key(key) {
            return Err(ConfigError::InvalidKey(key.to_string()));
        }

        let mut table = read_table(path)?;
        insert_path(&mut table, key, typed_value(key, raw)?)?;

        // Reject edits that would make the file unloadable
        Value::Table(table.clone())
            .try_into::<FileConfig>()
            .map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;

        write_table(path, &table)?;
        tracing::debug!(key, path = %path.display(), "config value written");
        Ok(())
    }

    /// Write the defaults to `path` unless it already exists.
    ///
    /// Returns whether a file was created.
    pub fn create(path: &Path) -> Result<bool, ConfigError> {
        if path.exists() {
            return Ok(false);
        }
        let contents = toml::to_string_pretty(&FileConfig::default())?;
        write_string(path, &contents)?;
        Ok(true)
    }
}

fn lookup<'a>(root: &'a Value, key: &str) -> Option<&'a Value> {
    key.split('.').try_fold(root, |value, part| value.get(part))
}

fn typed_value(key: &str, raw: &str) -> Result<Value, ConfigError> {
    let defaults = Value::try_from(FileConfig::default())?;
    let invalid = |message: &str| ConfigError::InvalidValue {
        key: key.to_string(),
        message: message.to_string(),
    };

    match lookup(&defaults, key) {
        Some(Value::Integer(_)) => raw
            .trim()
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| invalid("expected an integer")),
        Some(Value::Boolean(_)) => match raw.trim().to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(Value::Boolean(true)),
            "false" | "no" | "off" | "0" => Ok(Value::Boolean(false)),
            _ => Err(invalid("expected true or false")),
        },
        Some(Value::Array(_)) => Ok(list_value(raw)),
        None if key.starts_with("auto_role.keywords.") => Ok(list_value(raw)),
        Some(Value::Table(_)) => Err(invalid("cannot replace a whole section")),
        _ => Ok(Value::String(raw.to_string())),
    }
}

fn list_value(raw: &str) -> Value {
    Value::Array(
        raw.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(|item| Value::String(item.to_string()))
            .collect(),
    )
}

fn insert_path(table: &mut Table, key: &str, value: Value) -> Result<(), ConfigError> {
    let mut parts: Vec<&str> = key.split('.').collect();
    let last = parts
        .pop()
        .ok_or_else(|| ConfigError::InvalidKey(key.to_string()))?;

    let mut current = table;
    for part in parts {
        let entry = current
            .entry(part.to_string())
            .or_insert(Value::Table(Table::new()));
        current = match entry {
            Value::Table(inner) => inner,
            _ => {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: format!("'{part}' is not a section"),
                });
            }
        };
    }
    current.insert(last.to_string(), value);
    Ok(())
}

fn read_table(path: &Path) -> Result<Table, ConfigError> {
    if !path.exists() {
        return Ok(Table::new());
    }
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn write_table(path: &Path, table: &Table) -> Result<(), ConfigError> {
    let contents = toml::to_string_pretty(table)?;
    write_string(path, &contents)
}

fn write_string(path: &Path, contents: &str) -> Result<(), ConfigError> {
    let write_err = |source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    fs::write(path, contents).map_err(write_err)
}
