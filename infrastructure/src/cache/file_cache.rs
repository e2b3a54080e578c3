//! On-disk cache: one `<key>.json` file per entry.
//!
//! ```json
//! {"key": "3f2a…", "response": "…", "created_at": "2026-01-02T03:04:05Z"}
//! ```
//!
//! Response keys are the sha256 of the JSON-encoded [`ResponseCacheKey`];
//! detection keys are `detection_` + sha256 of `{message, available_roles}`.
//! Detection entries store the [`DetectionResult`] as JSON in `response`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gaia_application::{CacheError, DetectionCache, ResponseCache, ResponseCacheKey};
use gaia_domain::DetectionResult;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

const ENTRY_EXTENSION: &str = "json";
const DETECTION_PREFIX: &str = "detection_";

/// A stored cache file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub response: String,
    pub created_at: DateTime<Utc>,
}

/// Entry count and total size of the `.json` files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub size_bytes: u64,
}

/// One row of `gaia cache list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheListing {
    pub key: String,
    pub created_at: DateTime<Utc>,
    pub size_bytes: u64,
}

#[derive(Serialize)]
struct DetectionKeyPayload<'a> {
    message: &'a str,
    available_roles: &'a [String],
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

fn io_error(context: &str, path: &Path, err: std::io::Error) -> CacheError {
    CacheError::Io(format!("{} {}: {}", context, path.display(), err))
}

/// Cache rooted at a directory, created on first write.
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn response_key(key: &ResponseCacheKey) -> Result<String, CacheError> {
        let payload = serde_json::to_vec(key)
            .map_err(|e| CacheError::Key(format!("failed to encode cache key payload: {}", e)))?;
        Ok(sha256_hex(&payload))
    }

    pub fn detection_key(message: &str, available_roles: &[String]) -> Result<String, CacheError> {
        let mut payload = serde_json::to_vec(&DetectionKeyPayload {
            message,
            available_roles,
        })
        .map_err(|e| CacheError::Key(format!("failed to encode detection cache key: {}", e)))?;
        payload.push(b'\n');
        Ok(format!("{}{}", DETECTION_PREFIX, sha256_hex(&payload)))
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", key, ENTRY_EXTENSION))
    }

    /// The entry for `key`; a missing file is `None`, an unreadable one an error.
    pub async fn read_entry(&self, key: &str) -> Result<Option<CacheEntry>, CacheError> {
        let path = self.entry_path(key);
        let data = match fs::read(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error("failed to read", &path, e)),
        };
        serde_json::from_slice(&data)
            .map(Some)
            .map_err(|e| CacheError::Corrupt(format!("{}: {}", path.display(), e)))
    }

    pub async fn write_entry(&self, key: &str, response: &str) -> Result<(), CacheError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| io_error("failed to create cache directory", &self.dir, e))?;

        let entry = CacheEntry {
            key: key.to_string(),
            response: response.to_string(),
            created_at: Utc::now(),
        };
        let data = serde_json::to_vec(&entry)
            .map_err(|e| CacheError::Corrupt(format!("failed to encode cache entry: {}", e)))?;

        let path = self.entry_path(key);
        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options
            .open(&path)
            .await
            .map_err(|e| io_error("failed to write", &path, e))?;
        file.write_all(&data)
            .await
            .map_err(|e| io_error("failed to write", &path, e))?;
        file.flush()
            .await
            .map_err(|e| io_error("failed to write", &path, e))?;
        debug!(key, "cache entry written");
        Ok(())
    }

    /// `.json` files in the cache directory; empty when it does not exist.
    async fn entry_files(&self) -> Result<Vec<(PathBuf, u64)>, CacheError> {
        let mut dir = match fs::read_dir(&self.dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error("failed to read cache directory", &self.dir, e)),
        };

        let mut files = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| io_error("failed to read cache directory", &self.dir, e))?
        {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(ENTRY_EXTENSION) {
                continue;
            }
            let metadata = entry
                .metadata()
                .await
                .map_err(|e| io_error("failed to stat", &path, e))?;
            if metadata.is_file() {
                files.push((path, metadata.len()));
            }
        }
        Ok(files)
    }

    pub async fn stats(&self) -> Result<CacheStats, CacheError> {
        let files = self.entry_files().await?;
        Ok(CacheStats {
            entries: files.len(),
            size_bytes: files.iter().map(|(_, size)| size).sum(),
        })
    }

    /// Readable entries, newest first. Corrupt files are skipped with a warning.
    pub async fn list(&self) -> Result<Vec<CacheListing>, CacheError> {
        let mut listings: Vec<CacheListing> = self
            .dump()
            .await?
            .into_iter()
            .map(|(entry, size_bytes)| CacheListing {
                key: entry.key,
                created_at: entry.created_at,
                size_bytes,
            })
            .collect();
        listings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(listings)
    }

    /// Every readable entry with its file size, newest first.
    pub async fn dump(&self) -> Result<Vec<(CacheEntry, u64)>, CacheError> {
        let mut entries = Vec::new();
        for (path, size) in self.entry_files().await? {
            let data = fs::read(&path)
                .await
                .map_err(|e| io_error("failed to read", &path, e))?;
            match serde_json::from_slice::<CacheEntry>(&data) {
                Ok(entry) => entries.push((entry, size)),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping corrupt cache entry"),
            }
        }
        entries.sort_by(|(a, _), (b, _)| b.created_at.cmp(&a.created_at));
        Ok(entries)
    }

    /// Remove all `.json` files; returns how many were removed.
    pub async fn clear(&self) -> Result<usize, CacheError> {
        let mut removed = 0;
        for (path, _) in self.entry_files().await? {
            fs::remove_file(&path)
                .await
                .map_err(|e| io_error("failed to remove", &path, e))?;
            removed += 1;
        }
        Ok(removed)
    }

    /// Read an entry, treating corruption as a miss.
    async fn read_or_miss(&self, key: &str) -> Result<Option<CacheEntry>, CacheError> {
        match self.read_entry(key).await {
            Err(CacheError::Corrupt(message)) => {
                warn!(key, error = %message, "ignoring corrupt cache entry");
                Ok(None)
            }
            other => other,
        }
    }
}

#[async_trait]
impl ResponseCache for FileCache {
    async fn get(&self, key: &ResponseCacheKey) -> Result<Option<String>, CacheError> {
        let key = Self::response_key(key)?;
        Ok(self.read_or_miss(&key).await?.map(|entry| entry.response))
    }

    async fn put(&self, key: &ResponseCacheKey, response: &str) -> Result<(), CacheError> {
        let key = Self::response_key(key)?;
        self.write_entry(&key, response).await
    }
}

#[async_trait]
impl DetectionCache for FileCache {
    async fn get(
        &self,
        message: &str,
        available_roles: &[String],
    ) -> Result<Option<DetectionResult>, CacheError> {
        let key = Self::detection_key(message, available_roles)?;
        let Some(entry) = self.read_or_miss(&key).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&entry.response) {
            Ok(result) => Ok(Some(result)),
            Err(e) => {
                warn!(key, error = %e, "ignoring corrupt detection cache entry");
                Ok(None)
            }
        }
    }

    async fn put(
        &self,
        message: &str,
        available_roles: &[String],
        result: &DetectionResult,
    ) -> Result<(), CacheError> {
        let key = Self::detection_key(message, available_roles)?;
        let response = serde_json::to_string(result)
            .map_err(|e| CacheError::Corrupt(format!("failed to encode detection result: {}", e)))?;
        self.write_entry(&key, &response).await
    }
}
