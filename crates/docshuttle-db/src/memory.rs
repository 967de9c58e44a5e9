use async_trait::async_trait;
use chrono::{DateTime, Utc};
use docshuttle_core::models::FileRecord;
use docshuttle_core::AppError;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use crate::FileRepository;

/// In-memory file record repository for tests and local development.
#[derive(Clone, Default)]
pub struct MemoryFileRepository {
    records: Arc<RwLock<Vec<FileRecord>>>,
}

impl MemoryFileRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a pre-built record as-is. Test helper for backdated expiry.
    pub fn insert(&self, record: FileRecord) {
        self.records
            .write()
            .expect("repository lock poisoned")
            .push(record);
    }

    pub fn len(&self) -> usize {
        self.records.read().expect("repository lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl FileRepository for MemoryFileRepository {
    async fn create(
        &self,
        user_id: &str,
        original_name: &str,
        stored_name: &str,
    ) -> Result<FileRecord, AppError> {
        let record = FileRecord::new(
            user_id.to_string(),
            original_name.to_string(),
            stored_name.to_string(),
        );
        self.records
            .write()
            .expect("repository lock poisoned")
            .push(record.clone());
        Ok(record)
    }

    async fn find_by_stored_name(&self, stored_name: &str) -> Result<Option<FileRecord>, AppError> {
        Ok(self
            .records
            .read()
            .expect("repository lock poisoned")
            .iter()
            .find(|r| r.stored_name == stored_name)
            .cloned())
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<FileRecord>, AppError> {
        let mut records: Vec<FileRecord> = self
            .records
            .read()
            .expect("repository lock poisoned")
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    async fn list_expired(&self, now: DateTime<Utc>) -> Result<Vec<FileRecord>, AppError> {
        Ok(self
            .records
            .read()
            .expect("repository lock poisoned")
            .iter()
            .filter(|r| r.expires_at < now)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut records = self.records.write().expect("repository lock poisoned");
        let before = records.len();
        records.retain(|r| r.id != id);
        Ok(records.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_create_assigns_retention() {
        let repo = MemoryFileRepository::new();
        let record = repo
            .create("client-a", "report.pdf", "1700000000000.docx")
            .await
            .unwrap();

        assert_eq!(record.expires_at, record.created_at + Duration::hours(24));
        assert_eq!(
            repo.find_by_stored_name("1700000000000.docx")
                .await
                .unwrap()
                .unwrap()
                .id,
            record.id
        );
    }

    #[tokio::test]
    async fn test_list_is_newest_first_and_scoped() {
        let repo = MemoryFileRepository::new();
        let first = repo.create("client-a", "one.pdf", "1.docx").await.unwrap();
        let second = repo.create("client-a", "two.pdf", "2.docx").await.unwrap();
        repo.create("client-b", "other.pdf", "3.docx").await.unwrap();

        let records = repo.list_for_user("client-a").await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, second.id);
        assert_eq!(records[1].id, first.id);
    }

    #[tokio::test]
    async fn test_duplicate_stored_names_are_tolerated() {
        let repo = MemoryFileRepository::new();
        let first = repo
            .create("client-a", "report.pdf", "1700000000000.docx")
            .await
            .unwrap();
        let second = repo
            .create("client-b", "other.pdf", "1700000000000.docx")
            .await
            .unwrap();
        assert_ne!(first.id, second.id);

        // Lookup by stored name picks one match.
        let found = repo
            .find_by_stored_name("1700000000000.docx")
            .await
            .unwrap()
            .unwrap();
        assert!(found.id == first.id || found.id == second.id);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let repo = MemoryFileRepository::new();
        let record = repo.create("client-a", "one.pdf", "1.docx").await.unwrap();

        assert!(repo.delete(record.id).await.unwrap());
        assert!(!repo.delete(record.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_expired() {
        let repo = MemoryFileRepository::new();
        let mut old = FileRecord::new(
            "client-a".to_string(),
            "old.pdf".to_string(),
            "old.docx".to_string(),
        );
        old.created_at = Utc::now() - Duration::hours(30);
        old.expires_at = old.created_at + Duration::hours(24);
        repo.insert(old.clone());
        repo.create("client-a", "fresh.pdf", "fresh.docx")
            .await
            .unwrap();

        let expired = repo.list_expired(Utc::now()).await.unwrap();
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].id, old.id);
    }
}
