//! Repository trait for URL record storage.

use crate::domain::entities::{NewUrlRecord, UrlRecord};
use crate::error::AppError;
use async_trait::async_trait;

/// Durable mapping from short code to URL record.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgRecordRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::MemoryRecordRepository`] - in-process implementation
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_record.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// Inserts the record only if no record with the same code exists.
    ///
    /// The existence check and the insert are a single atomic operation.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(UrlRecord))` if the code was free and is now reserved
    /// - `Ok(None)` if the code is already taken; the store is left unchanged
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] on storage failures.
    async fn insert_if_absent(&self, new_record: NewUrlRecord)
    -> Result<Option<UrlRecord>, AppError>;

    /// Finds a record by its short code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] on storage failures.
    async fn find_by_code(&self, code: &str) -> Result<Option<UrlRecord>, AppError>;

    /// Finds the oldest record pointing at a normalized destination.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] on storage failures.
    async fn find_by_destination(&self, destination: &str)
    -> Result<Option<UrlRecord>, AppError>;

    /// Loads the records with the given ids, in no particular order.
    ///
    /// Unknown ids are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] on storage failures.
    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<UrlRecord>, AppError>;

    /// Counts all stored records.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] on storage failures.
    async fn count(&self) -> Result<i64, AppError>;
}
