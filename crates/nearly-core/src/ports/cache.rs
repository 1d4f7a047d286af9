use async_trait::async_trait;
use std::time::Duration;

/// Cache trait - short-lived key/value state such as refresh-token sessions
/// and password-reset codes.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Get a value from the cache.
    async fn get(&self, key: &str) -> Option<String>;

    /// Set a value in the cache with optional TTL.
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError>;

    /// Delete a key from the cache.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Check if a key exists.
    async fn exists(&self, key: &str) -> bool;

    /// Add one to a numeric value and return the result. A missing or
    /// expired key starts from zero with `ttl`; an existing key keeps its
    /// expiry.
    async fn increment(&self, key: &str, ttl: Option<Duration>) -> Result<u64, CacheError>;

    /// Get and delete in one step; single-use values (OTP codes, rotated
    /// refresh tokens) are read through this.
    async fn take(&self, key: &str) -> Result<Option<String>, CacheError> {
        let value = self.get(key).await;
        if value.is_some() {
            self.delete(key).await?;
        }
        Ok(value)
    }
}

/// Cache operation errors.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),

    #[error("Operation failed: {0}")]
    Operation(String),
}
