use async_trait::async_trait;
use chrono::{DateTime, Utc};
use docshuttle_core::constants::retention;
use docshuttle_core::models::FileRecord;
use docshuttle_core::AppError;
use sqlx::PgPool;
use uuid::Uuid;

/// Postgres-backed file record repository.
#[derive(Clone)]
pub struct PgFileRepository {
    pool: PgPool,
}

impl PgFileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl crate::FileRepository for PgFileRepository {
    async fn create(
        &self,
        user_id: &str,
        original_name: &str,
        stored_name: &str,
    ) -> Result<FileRecord, AppError> {
        // The retention window is applied here, in one place, so that
        // expires_at is always exactly created_at + 24h.
        let created_at = Utc::now();
        let expires_at = created_at + retention();

        let record = sqlx::query_as::<_, FileRecord>(
            r#"
            INSERT INTO files (id, user_id, original_name, stored_name, created_at, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, original_name, stored_name, created_at, expires_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(original_name)
        .bind(stored_name)
        .bind(created_at)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(
            record_id = %record.id,
            user_id = %user_id,
            stored_name = %stored_name,
            "Created file record"
        );

        Ok(record)
    }

    async fn find_by_stored_name(&self, stored_name: &str) -> Result<Option<FileRecord>, AppError> {
        let record = sqlx::query_as::<_, FileRecord>(
            r#"
            SELECT id, user_id, original_name, stored_name, created_at, expires_at
            FROM files
            WHERE stored_name = $1
            ORDER BY created_at
            LIMIT 1
            "#,
        )
        .bind(stored_name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<FileRecord>, AppError> {
        let records = sqlx::query_as::<_, FileRecord>(
            r#"
            SELECT id, user_id, original_name, stored_name, created_at, expires_at
            FROM files
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn list_expired(&self, now: DateTime<Utc>) -> Result<Vec<FileRecord>, AppError> {
        let records = sqlx::query_as::<_, FileRecord>(
            r#"
            SELECT id, user_id, original_name, stored_name, created_at, expires_at
            FROM files
            WHERE expires_at < $1
            ORDER BY expires_at
            "#,
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM files WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
