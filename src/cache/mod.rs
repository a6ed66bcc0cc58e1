//! Cache client
//!
//! Thin wrapper over a TTL-capable key/value store. Every call is logged with
//! the key and a human readable operation label, and its outcome is
//! classified as a [`CacheStatus`]. A missing key is a normal outcome
//! (`Ok(None)`), never an error; store failures are always surfaced to the
//! caller and never retried here.

pub mod keys;
pub mod redis_backend;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

pub use redis_backend::RedisCache;

/// Cache store failures
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("redis command failed: {0}")]
    Redis(#[from] redis::RedisError),
}

/// Outcome of a single cache call, used for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Success,
    NotFound,
    StoreError,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::NotFound => "not_found",
            Self::StoreError => "store_error",
        }
    }
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw key operations a cache store has to provide
#[async_trait]
pub trait CacheBackend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// Store only when the key is absent. Returns `true` if the value was written.
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration)
        -> Result<bool, CacheError>;

    async fn del(&self, key: &str) -> Result<(), CacheError>;

    /// Atomically read and delete a key.
    async fn take(&self, key: &str) -> Result<Option<String>, CacheError>;
}

/// Logging cache client shared by the coordinators
#[derive(Clone)]
pub struct CacheClient {
    backend: Arc<dyn CacheBackend>,
}

impl CacheClient {
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self { backend }
    }

    /// Read a key. `Ok(None)` means the key does not exist (or has expired).
    pub async fn get(&self, key: &str, op: &str) -> Result<Option<String>, CacheError> {
        let result = self.backend.get(key).await;
        log_lookup(op, key, &result);
        result
    }

    pub async fn set(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
        op: &str,
    ) -> Result<(), CacheError> {
        let result = self.backend.set(key, value, ttl).await;
        log_write(op, key, &result);
        result
    }

    /// Write a key only when it is absent; `Ok(false)` means another writer got there first.
    pub async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
        op: &str,
    ) -> Result<bool, CacheError> {
        let result = self.backend.set_if_absent(key, value, ttl).await;
        match &result {
            Ok(true) => tracing::debug!(key, op, status = %CacheStatus::Success, "cache set-if-absent stored"),
            Ok(false) => tracing::info!(key, op, status = %CacheStatus::Success, "cache set-if-absent found existing key"),
            Err(e) => tracing::error!(key, op, status = %CacheStatus::StoreError, error = %e, "cache set-if-absent failed"),
        }
        result
    }

    pub async fn del(&self, key: &str, op: &str) -> Result<(), CacheError> {
        let result = self.backend.del(key).await;
        log_write(op, key, &result);
        result
    }

    /// Destructive read: the value is returned to exactly one caller.
    pub async fn take(&self, key: &str, op: &str) -> Result<Option<String>, CacheError> {
        let result = self.backend.take(key).await;
        log_lookup(op, key, &result);
        result
    }
}

fn log_lookup(op: &str, key: &str, result: &Result<Option<String>, CacheError>) {
    match result {
        Ok(Some(_)) => tracing::debug!(key, op, status = %CacheStatus::Success, "cache read"),
        Ok(None) => tracing::info!(key, op, status = %CacheStatus::NotFound, "cache key not found"),
        Err(e) => tracing::error!(key, op, status = %CacheStatus::StoreError, error = %e, "cache read failed"),
    }
}

fn log_write(op: &str, key: &str, result: &Result<(), CacheError>) {
    match result {
        Ok(()) => tracing::debug!(key, op, status = %CacheStatus::Success, "cache write"),
        Err(e) => tracing::error!(key, op, status = %CacheStatus::StoreError, error = %e, "cache write failed"),
    }
}
