//! In-process repositories.
//!
//! Used for `STORAGE_BACKEND=memory` and as the backing store in tests. Each
//! repository guards its state with one async mutex, which makes every
//! operation, including the conditional insert and the history append,
//! atomic with respect to the others.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::domain::entities::{NewUrlRecord, NewUser, UrlRecord, User};
use crate::domain::repositories::{RecordRepository, UserRepository};
use crate::error::AppError;

#[derive(Default)]
struct RecordTable {
    next_id: i64,
    by_code: HashMap<String, UrlRecord>,
}

/// In-memory record store keyed by code.
#[derive(Default)]
pub struct MemoryRecordRepository {
    table: Mutex<RecordTable>,
}

impl MemoryRecordRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordRepository for MemoryRecordRepository {
    async fn insert_if_absent(
        &self,
        new_record: NewUrlRecord,
    ) -> Result<Option<UrlRecord>, AppError> {
        let mut table = self.table.lock().await;

        if table.by_code.contains_key(&new_record.code) {
            return Ok(None);
        }

        table.next_id += 1;
        let record = UrlRecord::new(
            table.next_id,
            new_record.code,
            new_record.destination,
            new_record.created_at,
        );
        table.by_code.insert(record.code.clone(), record.clone());

        Ok(Some(record))
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<UrlRecord>, AppError> {
        Ok(self.table.lock().await.by_code.get(code).cloned())
    }

    async fn find_by_destination(
        &self,
        destination: &str,
    ) -> Result<Option<UrlRecord>, AppError> {
        Ok(self
            .table
            .lock()
            .await
            .by_code
            .values()
            .filter(|r| r.destination == destination)
            .min_by_key(|r| r.id)
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<UrlRecord>, AppError> {
        Ok(self
            .table
            .lock()
            .await
            .by_code
            .values()
            .filter(|r| ids.contains(&r.id))
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.table.lock().await.by_code.len() as i64)
    }
}

#[derive(Default)]
struct UserTable {
    next_id: i64,
    by_email: HashMap<String, User>,
}

/// In-memory credential store keyed by email.
#[derive(Default)]
pub struct MemoryUserRepository {
    table: Mutex<UserTable>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, new_user: NewUser) -> Result<User, AppError> {
        let mut table = self.table.lock().await;

        if table.by_email.contains_key(&new_user.email) {
            return Err(AppError::EmailAlreadyRegistered);
        }

        table.next_id += 1;
        let user = User {
            id: table.next_id,
            email: new_user.email,
            password_hash: new_user.password_hash,
            history: Vec::new(),
            created_at: Utc::now(),
        };
        table.by_email.insert(user.email.clone(), user.clone());

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self.table.lock().await.by_email.get(email).cloned())
    }

    async fn append_history(&self, email: &str, record_id: i64) -> Result<bool, AppError> {
        let mut table = self.table.lock().await;

        let Some(user) = table.by_email.get_mut(email) else {
            return Ok(false);
        };
        if !user.owns(record_id) {
            user.history.push(record_id);
        }

        Ok(true)
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.table.lock().await.by_email.len() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_if_absent_rejects_taken_code() {
        let repo = MemoryRecordRepository::new();

        let first = repo
            .insert_if_absent(NewUrlRecord::now("abcd", "http://a.com"))
            .await
            .unwrap();
        let second = repo
            .insert_if_absent(NewUrlRecord::now("abcd", "http://b.com"))
            .await
            .unwrap();

        assert!(first.is_some());
        assert!(second.is_none());
        let stored = repo.find_by_code("abcd").await.unwrap().unwrap();
        assert_eq!(stored.destination, "http://a.com");
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_find_by_destination_returns_oldest() {
        let repo = MemoryRecordRepository::new();
        repo.insert_if_absent(NewUrlRecord::now("aaaa", "http://x.com"))
            .await
            .unwrap();
        repo.insert_if_absent(NewUrlRecord::now("bbbb", "http://x.com"))
            .await
            .unwrap();

        let found = repo.find_by_destination("http://x.com").await.unwrap().unwrap();
        assert_eq!(found.code, "aaaa");
        assert!(repo.find_by_destination("http://y.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_by_ids_skips_unknown() {
        let repo = MemoryRecordRepository::new();
        let record = repo
            .insert_if_absent(NewUrlRecord::now("aaaa", "http://x.com"))
            .await
            .unwrap()
            .unwrap();

        let found = repo.find_by_ids(&[record.id, 999]).await.unwrap();
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn test_create_user_duplicate_email() {
        let repo = MemoryUserRepository::new();
        let new_user = NewUser {
            email: "a@x.com".to_string(),
            password_hash: "hash".to_string(),
        };

        assert!(repo.create(new_user.clone()).await.is_ok());
        assert!(matches!(
            repo.create(new_user).await,
            Err(AppError::EmailAlreadyRegistered)
        ));
    }

    #[tokio::test]
    async fn test_append_history_keeps_order_without_duplicates() {
        let repo = MemoryUserRepository::new();
        repo.create(NewUser {
            email: "a@x.com".to_string(),
            password_hash: "hash".to_string(),
        })
        .await
        .unwrap();

        assert!(repo.append_history("a@x.com", 2).await.unwrap());
        assert!(repo.append_history("a@x.com", 1).await.unwrap());
        assert!(repo.append_history("a@x.com", 2).await.unwrap());

        let user = repo.find_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(user.history, vec![2, 1]);
    }

    #[tokio::test]
    async fn test_append_history_unknown_user() {
        let repo = MemoryUserRepository::new();
        assert!(!repo.append_history("ghost@x.com", 1).await.unwrap());
    }
}
