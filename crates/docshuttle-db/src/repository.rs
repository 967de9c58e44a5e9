use async_trait::async_trait;
use chrono::{DateTime, Utc};
use docshuttle_core::models::FileRecord;
use docshuttle_core::AppError;
use uuid::Uuid;

/// Metadata store for file records.
///
/// All mutations are single-record and atomic; cross-store consistency with
/// blob storage is the lifecycle service's ordering discipline, not this
/// trait's concern.
#[async_trait]
pub trait FileRepository: Send + Sync {
    /// Create a record. Assigns the id and stamps `created_at = now`,
    /// `expires_at = created_at + 24h`.
    async fn create(
        &self,
        user_id: &str,
        original_name: &str,
        stored_name: &str,
    ) -> Result<FileRecord, AppError>;

    /// Resolve the record for a stored blob key, if any. Stored names are
    /// time-seeded but not guaranteed unique; the first match wins.
    async fn find_by_stored_name(&self, stored_name: &str) -> Result<Option<FileRecord>, AppError>;

    /// All records for one client, newest `created_at` first.
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<FileRecord>, AppError>;

    /// Records whose `expires_at` is before `now`, across all clients.
    /// Used by the sweeper's dangling-record repair pass.
    async fn list_expired(&self, now: DateTime<Utc>) -> Result<Vec<FileRecord>, AppError>;

    /// Delete by id. Returns `false` when no such record existed; a missing
    /// record is never an error (deletes must be idempotent).
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}
