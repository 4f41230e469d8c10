//! Cache that never stores anything.

use super::service::{CacheResult, CacheService};
use async_trait::async_trait;
use tracing::debug;

/// No-op cache used when Redis is not configured or unreachable.
///
/// Every lookup misses, so resolution always goes to the record store.
pub struct NullCache;

impl NullCache {
    pub fn new() -> Self {
        debug!("Resolve cache disabled");
        Self
    }
}

impl Default for NullCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheService for NullCache {
    async fn get_url(&self, _code: &str) -> CacheResult<Option<String>> {
        Ok(None)
    }

    async fn set_url(&self, _code: &str, _destination: &str, _ttl: Option<usize>) -> CacheResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}
