//! Resolve cache trait and error types.

use async_trait::async_trait;

/// Errors raised by a cache backend.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    ConnectionError(String),

    #[error("Cache operation error: {0}")]
    OperationError(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Read-through cache of `code -> destination`.
///
/// URL records are immutable, so entries only ever expire by TTL. Callers
/// treat every error as a miss.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed, with TTL
/// - [`crate::infrastructure::cache::NullCache`] - always misses
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Looks up the cached destination of a code.
    async fn get_url(&self, code: &str) -> CacheResult<Option<String>>;

    /// Caches a destination. `ttl_seconds = None` uses the backend default.
    async fn set_url(&self, code: &str, destination: &str, ttl_seconds: Option<usize>)
    -> CacheResult<()>;

    /// Reports whether the backend answers.
    async fn health_check(&self) -> bool;
}
