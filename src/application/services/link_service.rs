//! Short code allocation service.

use std::sync::Arc;
use std::time::Duration;

use crate::application::services::HistoryService;
use crate::domain::entities::{NewUrlRecord, Session, UrlRecord};
use crate::domain::repositories::{RecordRepository, UserRepository};
use crate::error::AppError;
use crate::utils::code_generator::{CodeGenerator, validate_custom_code};
use crate::utils::store_timeout::with_timeout;
use crate::utils::url_normalizer::normalize_url;
use serde_json::json;

/// Tunables for code allocation.
#[derive(Debug, Clone, Copy)]
pub struct AllocationPolicy {
    /// Upper bound on generated candidates per request.
    pub max_attempts: u32,
    /// Return the existing code when the destination is already stored.
    pub dedup_by_destination: bool,
    /// Bound on each individual store call.
    pub store_timeout: Duration,
}

impl Default for AllocationPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            dedup_by_destination: false,
            store_timeout: Duration::from_secs(5),
        }
    }
}

/// Outcome of a successful allocation.
#[derive(Debug, Clone)]
pub struct Allocation {
    pub record: UrlRecord,
    /// True when an existing record was returned under dedup-by-destination.
    pub reused: bool,
}

/// Service turning create requests into durably reserved, unique codes.
///
/// Uniqueness is enforced by the record store's conditional insert; this
/// service never reserves a code with a separate existence check.
pub struct LinkService<R: RecordRepository + ?Sized, U: UserRepository + ?Sized> {
    record_repository: Arc<R>,
    history_service: Arc<HistoryService<U, R>>,
    generator: CodeGenerator,
    policy: AllocationPolicy,
}

impl<R: RecordRepository + ?Sized, U: UserRepository + ?Sized> LinkService<R, U> {
    /// Creates a new link service.
    pub fn new(
        record_repository: Arc<R>,
        history_service: Arc<HistoryService<U, R>>,
        generator: CodeGenerator,
        policy: AllocationPolicy,
    ) -> Self {
        Self {
            record_repository,
            history_service,
            generator,
            policy,
        }
    }

    pub fn policy(&self) -> AllocationPolicy {
        self.policy
    }

    /// Allocates a code and, for authenticated callers, records it in their
    /// history.
    ///
    /// Anonymous callers never touch the credential store.
    ///
    /// # Errors
    ///
    /// See [`Self::allocate`]. Additionally returns [`AppError::UserNotFound`]
    /// if the caller's user record is gone; the code stays allocated.
    pub async fn create_code(
        &self,
        destination: &str,
        custom_code: Option<String>,
        caller: &Session,
    ) -> Result<Allocation, AppError> {
        let allocation = self.allocate(destination, custom_code).await?;

        if let Some(email) = caller.email() {
            self.history_service
                .record(email, allocation.record.id)
                .await?;
        }

        Ok(allocation)
    }

    /// Reserves a unique code for a destination.
    ///
    /// # Flow
    ///
    /// 1. Normalize the destination (missing scheme becomes `http://`)
    /// 2. Under dedup-by-destination, return the existing record if any
    /// 3. With a custom code, conditionally insert it once
    /// 4. Otherwise generate candidates and conditionally insert until one
    ///    succeeds, at most `max_attempts` times
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for a malformed destination or custom code.
    /// Returns [`AppError::CodeAlreadyInUse`] if the custom code is taken.
    /// Returns [`AppError::AllocationExhausted`] if every candidate collided.
    /// Returns [`AppError::StoreUnavailable`] on storage failures or timeout.
    pub async fn allocate(
        &self,
        destination: &str,
        custom_code: Option<String>,
    ) -> Result<Allocation, AppError> {
        let destination = normalize_url(destination).map_err(|e| {
            AppError::bad_request("Invalid URL format", json!({ "reason": e.to_string() }))
        })?;

        if let Some(code) = &custom_code {
            validate_custom_code(code)?;
        }

        if self.policy.dedup_by_destination
            && let Some(existing) = with_timeout(
                self.policy.store_timeout,
                "find_by_destination",
                self.record_repository.find_by_destination(&destination),
            )
            .await?
        {
            tracing::debug!(code = %existing.code, "Reusing code for known destination");
            metrics::counter!("codes_allocated_total", "kind" => "reused").increment(1);
            return Ok(Allocation {
                record: existing,
                reused: true,
            });
        }

        let record = match custom_code {
            Some(code) => self.reserve_custom(code, destination).await?,
            None => self.reserve_generated(destination).await?,
        };

        tracing::info!(code = %record.code, "Allocated short code");
        Ok(Allocation {
            record,
            reused: false,
        })
    }

    async fn reserve_custom(&self, code: String, destination: String) -> Result<UrlRecord, AppError> {
        let reserved = with_timeout(
            self.policy.store_timeout,
            "insert_if_absent",
            self.record_repository
                .insert_if_absent(NewUrlRecord::now(code.clone(), destination)),
        )
        .await?;

        match reserved {
            Some(record) => {
                metrics::counter!("codes_allocated_total", "kind" => "custom").increment(1);
                Ok(record)
            }
            None => Err(AppError::CodeAlreadyInUse { code }),
        }
    }

    async fn reserve_generated(&self, destination: String) -> Result<UrlRecord, AppError> {
        for attempt in 1..=self.policy.max_attempts {
            let candidate = self.generator.generate()?;

            let reserved = with_timeout(
                self.policy.store_timeout,
                "insert_if_absent",
                self.record_repository
                    .insert_if_absent(NewUrlRecord::now(candidate.clone(), destination.clone())),
            )
            .await?;

            if let Some(record) = reserved {
                metrics::counter!("codes_allocated_total", "kind" => "generated").increment(1);
                return Ok(record);
            }

            tracing::debug!(attempt, candidate = %candidate, "Code collision, retrying");
            metrics::counter!("code_collisions_total").increment(1);
        }

        tracing::warn!(
            attempts = self.policy.max_attempts,
            code_length = self.generator.length(),
            namespace = ?self.generator.namespace_size(),
            "Code namespace saturated"
        );
        metrics::counter!("allocation_exhausted_total").increment(1);

        Err(AppError::AllocationExhausted {
            attempts: self.policy.max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::{MockRecordRepository, MockUserRepository};
    use chrono::Utc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn test_record(id: i64, code: &str, destination: &str) -> UrlRecord {
        UrlRecord::new(id, code.to_string(), destination.to_string(), Utc::now())
    }

    fn echo_record(new_record: NewUrlRecord) -> UrlRecord {
        UrlRecord::new(10, new_record.code, new_record.destination, new_record.created_at)
    }

    fn build_service(
        records: MockRecordRepository,
        users: MockUserRepository,
        dedup_by_destination: bool,
    ) -> LinkService<MockRecordRepository, MockUserRepository> {
        let records = Arc::new(records);
        let history = Arc::new(HistoryService::new(
            Arc::new(users),
            records.clone(),
            Duration::from_secs(5),
        ));
        LinkService::new(
            records,
            history,
            CodeGenerator::new(4),
            AllocationPolicy {
                max_attempts: 5,
                dedup_by_destination,
                store_timeout: Duration::from_secs(5),
            },
        )
    }

    #[tokio::test]
    async fn test_allocate_generated_code() {
        let mut mock_records = MockRecordRepository::new();
        mock_records.expect_find_by_destination().times(0);
        mock_records
            .expect_insert_if_absent()
            .withf(|r| r.code.len() == 4 && r.destination == "https://example.com")
            .times(1)
            .returning(|r| Ok(Some(echo_record(r))));

        let service = build_service(mock_records, MockUserRepository::new(), false);

        let allocation = service.allocate("https://example.com", None).await.unwrap();

        assert!(!allocation.reused);
        assert_eq!(allocation.record.code.len(), 4);
        assert_eq!(allocation.record.destination, "https://example.com");
    }

    #[tokio::test]
    async fn test_allocate_normalizes_destination() {
        let mut mock_records = MockRecordRepository::new();
        mock_records
            .expect_insert_if_absent()
            .withf(|r| r.destination == "http://example.com")
            .times(1)
            .returning(|r| Ok(Some(echo_record(r))));

        let service = build_service(mock_records, MockUserRepository::new(), false);

        let allocation = service.allocate("example.com", None).await.unwrap();
        assert_eq!(allocation.record.destination, "http://example.com");
    }

    #[tokio::test]
    async fn test_allocate_retries_on_collision() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_in_mock = calls.clone();

        let mut mock_records = MockRecordRepository::new();
        mock_records
            .expect_insert_if_absent()
            .times(3)
            .returning(move |r| {
                if calls_in_mock.fetch_add(1, Ordering::SeqCst) < 2 {
                    Ok(None)
                } else {
                    Ok(Some(echo_record(r)))
                }
            });

        let service = build_service(mock_records, MockUserRepository::new(), false);

        assert!(service.allocate("https://example.com", None).await.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_allocate_exhausted() {
        let mut mock_records = MockRecordRepository::new();
        mock_records
            .expect_insert_if_absent()
            .times(5)
            .returning(|_| Ok(None));

        let service = build_service(mock_records, MockUserRepository::new(), false);

        let result = service.allocate("https://example.com", None).await;
        assert!(matches!(
            result,
            Err(AppError::AllocationExhausted { attempts: 5 })
        ));
    }

    #[tokio::test]
    async fn test_allocate_custom_code() {
        let mut mock_records = MockRecordRepository::new();
        mock_records
            .expect_insert_if_absent()
            .withf(|r| r.code == "abcd")
            .times(1)
            .returning(|r| Ok(Some(echo_record(r))));

        let service = build_service(mock_records, MockUserRepository::new(), false);

        let allocation = service
            .allocate("https://example.com", Some("abcd".to_string()))
            .await
            .unwrap();
        assert_eq!(allocation.record.code, "abcd");
    }

    #[tokio::test]
    async fn test_allocate_custom_code_conflict() {
        let mut mock_records = MockRecordRepository::new();
        mock_records
            .expect_insert_if_absent()
            .withf(|r| r.code == "abcd")
            .times(1)
            .returning(|_| Ok(None));

        let service = build_service(mock_records, MockUserRepository::new(), false);

        let result = service
            .allocate("https://example.com", Some("abcd".to_string()))
            .await;
        assert!(matches!(result, Err(AppError::CodeAlreadyInUse { code }) if code == "abcd"));
    }

    #[tokio::test]
    async fn test_allocate_invalid_custom_code_skips_store() {
        let mut mock_records = MockRecordRepository::new();
        mock_records.expect_insert_if_absent().times(0);

        let service = build_service(mock_records, MockUserRepository::new(), false);

        let result = service
            .allocate("https://example.com", Some("no-dashes".to_string()))
            .await;
        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_allocate_invalid_url() {
        let mock_records = MockRecordRepository::new();
        let service = build_service(mock_records, MockUserRepository::new(), false);

        let result = service.allocate("ftp://example.com", None).await;
        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_allocate_dedup_returns_existing() {
        let mut mock_records = MockRecordRepository::new();
        let existing = test_record(5, "old1", "http://example.com");
        mock_records
            .expect_find_by_destination()
            .withf(|d| d == "http://example.com")
            .times(1)
            .returning(move |_| Ok(Some(existing.clone())));
        mock_records.expect_insert_if_absent().times(0);

        let service = build_service(mock_records, MockUserRepository::new(), true);

        let allocation = service.allocate("example.com", None).await.unwrap();
        assert!(allocation.reused);
        assert_eq!(allocation.record.code, "old1");
    }

    #[tokio::test]
    async fn test_allocate_dedup_miss_inserts() {
        let mut mock_records = MockRecordRepository::new();
        mock_records
            .expect_find_by_destination()
            .times(1)
            .returning(|_| Ok(None));
        mock_records
            .expect_insert_if_absent()
            .times(1)
            .returning(|r| Ok(Some(echo_record(r))));

        let service = build_service(mock_records, MockUserRepository::new(), true);

        let allocation = service.allocate("https://new.com", None).await.unwrap();
        assert!(!allocation.reused);
    }

    #[tokio::test]
    async fn test_allocate_store_error_propagates() {
        let mut mock_records = MockRecordRepository::new();
        mock_records
            .expect_insert_if_absent()
            .times(1)
            .returning(|_| Err(AppError::store_unavailable("connection reset")));

        let service = build_service(mock_records, MockUserRepository::new(), false);

        let result = service.allocate("https://example.com", None).await;
        assert!(matches!(result, Err(AppError::StoreUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_create_code_anonymous_skips_history() {
        let mut mock_records = MockRecordRepository::new();
        mock_records
            .expect_insert_if_absent()
            .returning(|r| Ok(Some(echo_record(r))));
        let mut mock_users = MockUserRepository::new();
        mock_users.expect_append_history().times(0);
        mock_users.expect_find_by_email().times(0);

        let service = build_service(mock_records, mock_users, false);

        let result = service
            .create_code("https://example.com", None, &Session::Anonymous)
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_create_code_authenticated_records_history() {
        let mut mock_records = MockRecordRepository::new();
        mock_records
            .expect_insert_if_absent()
            .returning(|r| Ok(Some(echo_record(r))));
        let mut mock_users = MockUserRepository::new();
        mock_users
            .expect_append_history()
            .withf(|email, id| email == "a@x.com" && *id == 10)
            .times(1)
            .returning(|_, _| Ok(true));

        let service = build_service(mock_records, mock_users, false);

        let result = service
            .create_code(
                "https://example.com",
                None,
                &Session::authenticated("a@x.com"),
            )
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_create_code_missing_user() {
        let mut mock_records = MockRecordRepository::new();
        mock_records
            .expect_insert_if_absent()
            .returning(|r| Ok(Some(echo_record(r))));
        let mut mock_users = MockUserRepository::new();
        mock_users
            .expect_append_history()
            .returning(|_, _| Ok(false));

        let service = build_service(mock_records, mock_users, false);

        let result = service
            .create_code(
                "https://example.com",
                None,
                &Session::authenticated("gone@x.com"),
            )
            .await;
        assert!(matches!(result, Err(AppError::UserNotFound)));
    }
}
