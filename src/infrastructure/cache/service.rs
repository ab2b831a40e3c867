//! Cache service trait and error types.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during cache operations.
///
/// A miss is not an error; it is `Ok(None)` from [`CacheService::get`].
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    ConnectionError(String),
    #[error("Cache operation error: {0}")]
    OperationError(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Key-value cache with per-entry TTL holding `code -> target` mappings.
///
/// Implementations must be safe to call concurrently from request handlers
/// and background workers. Unlike a fail-open cache, errors are returned to
/// the caller: the redirect path treats a broken cache as an outage.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache
/// - [`crate::infrastructure::cache::MemoryCache`] - In-process cache used without Redis
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Returns the cached target for `code`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(target))` on cache hit
    /// - `Ok(None)` on cache miss or expired entry
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the backend cannot answer.
    async fn get(&self, code: &str) -> CacheResult<Option<String>>;

    /// Stores `code -> target`, replacing any previous value, expiring after `ttl`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the write fails.
    async fn set(&self, code: &str, target: &str, ttl: Duration) -> CacheResult<()>;

    /// Checks if the cache backend is healthy.
    ///
    /// Used by the health endpoint.
    async fn health_check(&self) -> bool;

    /// Short backend name for logs and the health endpoint.
    fn backend(&self) -> &'static str;
}
