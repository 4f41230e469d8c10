//! History recording and listing for authenticated users.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::entities::UrlRecord;
use crate::domain::repositories::{RecordRepository, UserRepository};
use crate::error::AppError;
use crate::utils::store_timeout::with_timeout;

/// Appends newly allocated codes to a user's history and reads it back.
pub struct HistoryService<U: UserRepository + ?Sized, R: RecordRepository + ?Sized> {
    user_repository: Arc<U>,
    record_repository: Arc<R>,
    store_timeout: Duration,
}

impl<U: UserRepository + ?Sized, R: RecordRepository + ?Sized> HistoryService<U, R> {
    pub fn new(user_repository: Arc<U>, record_repository: Arc<R>, store_timeout: Duration) -> Self {
        Self {
            user_repository,
            record_repository,
            store_timeout,
        }
    }

    /// Appends a record id to the user's history.
    ///
    /// The append is a single atomic store operation, so concurrent creates by
    /// the same user do not lose entries.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::UserNotFound`] if no user has this email.
    /// Returns [`AppError::StoreUnavailable`] on storage failures or timeout.
    pub async fn record(&self, email: &str, record_id: i64) -> Result<(), AppError> {
        let found = with_timeout(
            self.store_timeout,
            "append_history",
            self.user_repository.append_history(email, record_id),
        )
        .await?;

        if !found {
            tracing::warn!(email, record_id, "History append for unknown user");
            return Err(AppError::UserNotFound);
        }

        tracing::debug!(email, record_id, "Recorded code in user history");
        Ok(())
    }

    /// Returns the user's records in history order.
    ///
    /// History entries whose record no longer exists are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::UserNotFound`] if no user has this email.
    /// Returns [`AppError::StoreUnavailable`] on storage failures or timeout.
    pub async fn list(&self, email: &str) -> Result<Vec<UrlRecord>, AppError> {
        let user = with_timeout(
            self.store_timeout,
            "find_user",
            self.user_repository.find_by_email(email),
        )
        .await?
        .ok_or(AppError::UserNotFound)?;

        if user.history.is_empty() {
            return Ok(Vec::new());
        }

        let records = with_timeout(
            self.store_timeout,
            "find_records",
            self.record_repository.find_by_ids(&user.history),
        )
        .await?;

        let mut by_id: HashMap<i64, UrlRecord> =
            records.into_iter().map(|r| (r.id, r)).collect();

        Ok(user
            .history
            .iter()
            .filter_map(|id| by_id.remove(id))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::User;
    use crate::domain::repositories::{MockRecordRepository, MockUserRepository};
    use chrono::Utc;

    fn timeout() -> Duration {
        Duration::from_secs(5)
    }

    fn test_user(history: Vec<i64>) -> User {
        User {
            id: 1,
            email: "a@x.com".to_string(),
            password_hash: "hash".to_string(),
            history,
            created_at: Utc::now(),
        }
    }

    fn test_record(id: i64, code: &str) -> UrlRecord {
        UrlRecord::new(id, code.to_string(), format!("http://{code}.com"), Utc::now())
    }

    #[tokio::test]
    async fn test_record_appends() {
        let mut mock_users = MockUserRepository::new();
        mock_users
            .expect_append_history()
            .withf(|email, id| email == "a@x.com" && *id == 42)
            .times(1)
            .returning(|_, _| Ok(true));

        let service = HistoryService::new(
            Arc::new(mock_users),
            Arc::new(MockRecordRepository::new()),
            timeout(),
        );

        assert!(service.record("a@x.com", 42).await.is_ok());
    }

    #[tokio::test]
    async fn test_record_unknown_user() {
        let mut mock_users = MockUserRepository::new();
        mock_users
            .expect_append_history()
            .times(1)
            .returning(|_, _| Ok(false));

        let service = HistoryService::new(
            Arc::new(mock_users),
            Arc::new(MockRecordRepository::new()),
            timeout(),
        );

        let result = service.record("ghost@x.com", 1).await;
        assert!(matches!(result, Err(AppError::UserNotFound)));
    }

    #[tokio::test]
    async fn test_list_preserves_history_order() {
        let mut mock_users = MockUserRepository::new();
        mock_users
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(Some(test_user(vec![3, 1, 2]))));

        let mut mock_records = MockRecordRepository::new();
        mock_records
            .expect_find_by_ids()
            .times(1)
            .returning(|_| {
                Ok(vec![
                    test_record(1, "aaaa"),
                    test_record(2, "bbbb"),
                    test_record(3, "cccc"),
                ])
            });

        let service = HistoryService::new(Arc::new(mock_users), Arc::new(mock_records), timeout());

        let codes: Vec<String> = service
            .list("a@x.com")
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.code)
            .collect();
        assert_eq!(codes, vec!["cccc", "aaaa", "bbbb"]);
    }

    #[tokio::test]
    async fn test_list_skips_missing_records() {
        let mut mock_users = MockUserRepository::new();
        mock_users
            .expect_find_by_email()
            .returning(|_| Ok(Some(test_user(vec![1, 99]))));

        let mut mock_records = MockRecordRepository::new();
        mock_records
            .expect_find_by_ids()
            .returning(|_| Ok(vec![test_record(1, "aaaa")]));

        let service = HistoryService::new(Arc::new(mock_users), Arc::new(mock_records), timeout());

        let records = service.list("a@x.com").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, 1);
    }

    #[tokio::test]
    async fn test_list_empty_history_skips_record_lookup() {
        let mut mock_users = MockUserRepository::new();
        mock_users
            .expect_find_by_email()
            .returning(|_| Ok(Some(test_user(vec![]))));

        let mut mock_records = MockRecordRepository::new();
        mock_records.expect_find_by_ids().times(0);

        let service = HistoryService::new(Arc::new(mock_users), Arc::new(mock_records), timeout());

        assert!(service.list("a@x.com").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_unknown_user() {
        let mut mock_users = MockUserRepository::new();
        mock_users.expect_find_by_email().returning(|_| Ok(None));

        let service = HistoryService::new(
            Arc::new(mock_users),
            Arc::new(MockRecordRepository::new()),
            timeout(),
        );

        assert!(matches!(
            service.list("ghost@x.com").await,
            Err(AppError::UserNotFound)
        ));
    }
}
