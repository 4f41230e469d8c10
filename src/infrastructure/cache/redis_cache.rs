//! Redis-backed resolve cache.

use super::service::{CacheError, CacheResult, CacheService};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tracing::{debug, info, warn};

/// Namespace for cache keys so the Redis database can be shared.
const KEY_PREFIX: &str = "codelink:code:";

/// Caches resolved destinations in Redis.
///
/// Reads and writes are fail-open: Redis errors are logged and reported as a
/// miss (reads) or ignored (writes).
pub struct RedisCache {
    connection: ConnectionManager,
    default_ttl: u64,
}

impl RedisCache {
    /// Opens a managed connection and checks it with `PING`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ConnectionError`] if the URL is invalid or Redis
    /// does not answer.
    pub async fn connect(redis_url: &str, default_ttl_seconds: u64) -> CacheResult<Self> {
        let client = Client::open(redis_url)
            .map_err(|e| CacheError::ConnectionError(format!("Invalid Redis URL: {e}")))?;

        let mut connection = ConnectionManager::new(client)
            .await
            .map_err(|e| CacheError::ConnectionError(e.to_string()))?;

        connection
            .ping::<()>()
            .await
            .map_err(|e| CacheError::ConnectionError(format!("PING failed: {e}")))?;

        info!("Connected to Redis");

        Ok(Self {
            connection,
            default_ttl: default_ttl_seconds,
        })
    }

    fn key(code: &str) -> String {
        format!("{KEY_PREFIX}{code}")
    }
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get_url(&self, code: &str) -> CacheResult<Option<String>> {
        let mut conn = self.connection.clone();

        match conn.get::<_, Option<String>>(Self::key(code)).await {
            Ok(found) => {
                debug!(code, hit = found.is_some(), "Cache lookup");
                Ok(found)
            }
            Err(e) => {
                warn!(code, "Redis GET failed: {}", e);
                Ok(None)
            }
        }
    }

    async fn set_url(&self, code: &str, destination: &str, ttl_seconds: Option<usize>)
    -> CacheResult<()> {
        let mut conn = self.connection.clone();
        let ttl = ttl_seconds.map_or(self.default_ttl, |t| t as u64);

        if let Err(e) = conn
            .set_ex::<_, _, ()>(Self::key(code), destination, ttl)
            .await
        {
            warn!(code, "Redis SETEX failed: {}", e);
        }

        Ok(())
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.connection.clone();
        conn.ping::<()>().await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_namespaced() {
        assert_eq!(RedisCache::key("aB3x"), "codelink:code:aB3x");
    }
}
