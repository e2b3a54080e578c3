//! Cache ports
//!
//! Both caches are optional accelerators: a failing cache is logged and
//! otherwise ignored by the use cases.

use async_trait::async_trait;
use gaia_domain::{DetectionResult, Message};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache I/O error: {0}")]
    Io(String),

    #[error("Cache entry corrupt: {0}")]
    Corrupt(String),

    #[error("Cache key error: {0}")]
    Key(String),
}

/// Everything that influences a completion, hashed into the cache key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseCacheKey {
    pub provider: String,
    pub host: String,
    pub port: u16,
    pub model: String,
    pub system_role: String,
    pub role_template: String,
    pub messages: Vec<Message>,
}

/// Stores completions keyed by their full request context.
#[async_trait]
pub trait ResponseCache: Send + Sync {
    async fn get(&self, key: &ResponseCacheKey) -> Result<Option<String>, CacheError>;

    async fn put(&self, key: &ResponseCacheKey, response: &str) -> Result<(), CacheError>;
}

/// Stores role detection results keyed by message and role set.
#[async_trait]
pub trait DetectionCache: Send + Sync {
    async fn get(
        &self,
        message: &str,
        available_roles: &[String],
    ) -> Result<Option<DetectionResult>, CacheError>;

    async fn put(
        &self,
        message: &str,
        available_roles: &[String],
        result: &DetectionResult,
    ) -> Result<(), CacheError>;
}

/// Cache that stores nothing.
pub struct NoCache;

#[async_trait]
impl ResponseCache for NoCache {
    async fn get(&self, _key: &ResponseCacheKey) -> Result<Option<String>, CacheError> {
        Ok(None)
    }

    async fn put(&self, _key: &ResponseCacheKey, _response: &str) -> Result<(), CacheError> {
        Ok(())
    }
}

#[async_trait]
impl DetectionCache for NoCache {
    async fn get(
        &self,
        _message: &str,
        _available_roles: &[String],
    ) -> Result<Option<DetectionResult>, CacheError> {
        Ok(None)
    }

    async fn put(
        &self,
        _message: &str,
        _available_roles: &[String],
        _result: &DetectionResult,
    ) -> Result<(), CacheError> {
        Ok(())
    }
}
