//! Short code resolution service.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::repositories::RecordRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::utils::store_timeout::with_timeout;

/// Resolves short codes to their stored destinations.
///
/// Records are immutable, so a cached `code -> destination` entry can never go
/// stale. The cache is fail-open: any cache error falls back to the store.
pub struct RedirectService<R: RecordRepository + ?Sized> {
    record_repository: Arc<R>,
    cache: Arc<dyn CacheService>,
    store_timeout: Duration,
}

impl<R: RecordRepository + ?Sized> RedirectService<R> {
    pub fn new(record_repository: Arc<R>, cache: Arc<dyn CacheService>, store_timeout: Duration) -> Self {
        Self {
            record_repository,
            cache,
            store_timeout,
        }
    }

    /// Returns the destination stored for `code`, verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no record has this code.
    /// Returns [`AppError::StoreUnavailable`] on storage failures or timeout.
    pub async fn resolve(&self, code: &str) -> Result<String, AppError> {
        match self.cache.get_url(code).await {
            Ok(Some(destination)) => {
                metrics::counter!("redirects_total", "result" => "hit").increment(1);
                return Ok(destination);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Cache error, falling back to store: {}", e),
        }

        let record = with_timeout(
            self.store_timeout,
            "find_by_code",
            self.record_repository.find_by_code(code),
        )
        .await?;

        let Some(record) = record else {
            tracing::debug!(code, "No record for code");
            metrics::counter!("redirects_total", "result" => "miss").increment(1);
            return Err(AppError::NotFound {
                code: code.to_string(),
            });
        };

        if let Err(e) = self.cache.set_url(code, &record.destination, None).await {
            tracing::warn!("Failed to cache destination: {}", e);
        }

        metrics::counter!("redirects_total", "result" => "hit").increment(1);
        Ok(record.destination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::UrlRecord;
    use crate::domain::repositories::MockRecordRepository;
    use crate::infrastructure::cache::{CacheError, CacheResult, NullCache};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::HashMap;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct MapCache {
        entries: Mutex<HashMap<String, String>>,
    }

    #[async_trait]
    impl CacheService for MapCache {
        async fn get_url(&self, short_code: &str) -> CacheResult<Option<String>> {
            Ok(self.entries.lock().await.get(short_code).cloned())
        }

        async fn set_url(&self, short_code: &str, url: &str, _ttl: Option<usize>) -> CacheResult<()> {
            self.entries
                .lock()
                .await
                .insert(short_code.to_string(), url.to_string());
            Ok(())
        }

        async fn health_check(&self) -> bool {
            true
        }
    }

    struct BrokenCache;

    #[async_trait]
    impl CacheService for BrokenCache {
        async fn get_url(&self, _short_code: &str) -> CacheResult<Option<String>> {
            Err(CacheError::ConnectionError("down".to_string()))
        }

        async fn set_url(&self, _short_code: &str, _url: &str, _ttl: Option<usize>) -> CacheResult<()> {
            Err(CacheError::ConnectionError("down".to_string()))
        }

        async fn health_check(&self) -> bool {
            false
        }
    }

    fn test_record(code: &str, destination: &str) -> UrlRecord {
        UrlRecord::new(1, code.to_string(), destination.to_string(), Utc::now())
    }

    #[tokio::test]
    async fn test_resolve_found() {
        let mut mock_records = MockRecordRepository::new();
        mock_records
            .expect_find_by_code()
            .withf(|code| code == "aB3x")
            .times(1)
            .returning(|_| Ok(Some(test_record("aB3x", "http://example.com"))));

        let service = RedirectService::new(
            Arc::new(mock_records),
            Arc::new(NullCache::new()),
            Duration::from_secs(5),
        );

        assert_eq!(service.resolve("aB3x").await.unwrap(), "http://example.com");
    }

    #[tokio::test]
    async fn test_resolve_not_found() {
        let mut mock_records = MockRecordRepository::new();
        mock_records
            .expect_find_by_code()
            .times(1)
            .returning(|_| Ok(None));

        let service = RedirectService::new(
            Arc::new(mock_records),
            Arc::new(NullCache::new()),
            Duration::from_secs(5),
        );

        let result = service.resolve("zzzz").await;
        assert!(matches!(result, Err(AppError::NotFound { code }) if code == "zzzz"));
    }

    #[tokio::test]
    async fn test_resolve_uses_cache_after_first_lookup() {
        let mut mock_records = MockRecordRepository::new();
        mock_records
            .expect_find_by_code()
            .times(1)
            .returning(|_| Ok(Some(test_record("aB3x", "http://example.com"))));

        let service = RedirectService::new(
            Arc::new(mock_records),
            Arc::new(MapCache::default()),
            Duration::from_secs(5),
        );

        assert_eq!(service.resolve("aB3x").await.unwrap(), "http://example.com");
        assert_eq!(service.resolve("aB3x").await.unwrap(), "http://example.com");
    }

    #[tokio::test]
    async fn test_resolve_cache_failure_falls_back() {
        let mut mock_records = MockRecordRepository::new();
        mock_records
            .expect_find_by_code()
            .times(1)
            .returning(|_| Ok(Some(test_record("aB3x", "http://example.com"))));

        let service = RedirectService::new(
            Arc::new(mock_records),
            Arc::new(BrokenCache),
            Duration::from_secs(5),
        );

        assert_eq!(service.resolve("aB3x").await.unwrap(), "http://example.com");
    }
}
