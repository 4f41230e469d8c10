//! PostgreSQL implementation of the record repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{NewUrlRecord, UrlRecord};
use crate::domain::repositories::RecordRepository;
use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct UrlRecordRow {
    id: i64,
    code: String,
    destination: String,
    created_at: DateTime<Utc>,
}

impl From<UrlRecordRow> for UrlRecord {
    fn from(row: UrlRecordRow) -> Self {
        UrlRecord::new(row.id, row.code, row.destination, row.created_at)
    }
}

/// PostgreSQL repository for URL records.
///
/// Code uniqueness is enforced by the `url_records_code_key` constraint;
/// [`RecordRepository::insert_if_absent`] relies on it through
/// `ON CONFLICT DO NOTHING`.
pub struct PgRecordRepository {
    pool: Arc<PgPool>,
}

impl PgRecordRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordRepository for PgRecordRepository {
    async fn insert_if_absent(
        &self,
        new_record: NewUrlRecord,
    ) -> Result<Option<UrlRecord>, AppError> {
        let row = sqlx::query_as::<_, UrlRecordRow>(
            r#"
            INSERT INTO url_records (code, destination, created_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (code) DO NOTHING
            RETURNING id, code, destination, created_at
            "#,
        )
        .bind(&new_record.code)
        .bind(&new_record.destination)
        .bind(new_record.created_at)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(UrlRecord::from))
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<UrlRecord>, AppError> {
        let row = sqlx::query_as::<_, UrlRecordRow>(
            r#"
            SELECT id, code, destination, created_at
            FROM url_records
            WHERE code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(UrlRecord::from))
    }

    async fn find_by_destination(
        &self,
        destination: &str,
    ) -> Result<Option<UrlRecord>, AppError> {
        let row = sqlx::query_as::<_, UrlRecordRow>(
            r#"
            SELECT id, code, destination, created_at
            FROM url_records
            WHERE destination = $1
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(destination)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(UrlRecord::from))
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<UrlRecord>, AppError> {
        let rows = sqlx::query_as::<_, UrlRecordRow>(
            r#"
            SELECT id, code, destination, created_at
            FROM url_records
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(UrlRecord::from).collect())
    }

    async fn count(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM url_records")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }
}
