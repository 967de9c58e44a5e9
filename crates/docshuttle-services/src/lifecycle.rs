use docshuttle_core::models::{ConversionJob, FileRecord, LifecycleEvent};
use docshuttle_core::AppError;
use docshuttle_convert::ConversionRunner;
use docshuttle_db::FileRepository;
use docshuttle_storage::{BlobRef, Storage, StorageError};
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use crate::NotificationHub;

/// Orchestrates the file lifecycle: convert and store, register metadata,
/// list, delete. Cross-store ordering lives here: blob before record on
/// delete, so a failure can only ever leave an expired orphan for the
/// sweeper instead of a record pointing at nothing.
#[derive(Clone)]
pub struct LifecycleService {
    storage: Arc<dyn Storage>,
    repository: Arc<dyn FileRepository>,
    runner: ConversionRunner,
    hub: NotificationHub,
}

impl LifecycleService {
    pub fn new(
        storage: Arc<dyn Storage>,
        repository: Arc<dyn FileRepository>,
        runner: ConversionRunner,
        hub: NotificationHub,
    ) -> Self {
        Self {
            storage,
            repository,
            runner,
            hub,
        }
    }

    /// Convert an uploaded PDF and store the DOCX under the client's
    /// namespace. The temp input and any converter output are removed before
    /// returning, on success and on every failure path.
    #[tracing::instrument(skip(self, job), fields(user_id = %job.user_id))]
    pub async fn handle_upload(&self, job: &ConversionJob) -> Result<BlobRef, AppError> {
        let result = self.convert_and_store(job).await;

        remove_temp(job.input_path()).await;
        remove_temp(&job.expected_output_path()).await;

        result
    }

    async fn convert_and_store(&self, job: &ConversionJob) -> Result<BlobRef, AppError> {
        let output_path = self
            .runner
            .run(job)
            .await
            .map_err(|e| AppError::Conversion(e.to_string()))?;

        let stored_name = job
            .stored_name()
            .ok_or_else(|| AppError::Conversion("converter output has no filename".to_string()))?;

        let data = tokio::fs::read(&output_path).await?;

        let blob = self
            .storage
            .put(&job.user_id, &stored_name, data)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        tracing::info!(
            user_id = %job.user_id,
            stored_name = %stored_name,
            "Stored converted document"
        );

        Ok(blob)
    }

    /// Record metadata for an already-stored blob and announce it.
    ///
    /// Separate step from the upload: if this fails the blob stays behind as
    /// an orphan, which the sweeper repairs after the retention window.
    pub async fn register_metadata(
        &self,
        user_id: &str,
        original_name: &str,
        stored_name: &str,
    ) -> Result<FileRecord, AppError> {
        let record = self
            .repository
            .create(user_id, original_name, stored_name)
            .await?;

        self.hub.broadcast(LifecycleEvent::FileAdded);

        Ok(record)
    }

    /// All records for one client, newest first. Expiry is not filtered here;
    /// physical removal is the sweeper's job.
    pub async fn list(&self, user_id: &str) -> Result<Vec<FileRecord>, AppError> {
        self.repository.list_for_user(user_id).await
    }

    /// Remove the blob, then the record, then announce the deletion.
    ///
    /// A missing blob or missing record is already-satisfied, not an error,
    /// but a delete where neither existed raises no event. A malformed key
    /// is the caller's mistake and surfaces as invalid input; any other
    /// storage failure surfaces immediately and leaves the record alone, so
    /// the client keeps seeing a file that still exists.
    #[tracing::instrument(skip(self), fields(user_id = %user_id, record_id = %id))]
    pub async fn delete(&self, user_id: &str, id: Uuid, stored_name: &str) -> Result<(), AppError> {
        let blob_present = match self.storage.exists(user_id, stored_name).await {
            Ok(present) => present,
            Err(StorageError::InvalidKey(msg)) => return Err(AppError::InvalidInput(msg)),
            Err(e) => return Err(AppError::Storage(e.to_string())),
        };

        if blob_present {
            match self.storage.remove(user_id, stored_name).await {
                Ok(()) => {}
                Err(StorageError::NotFound(_)) => {}
                Err(e) => return Err(AppError::Storage(e.to_string())),
            }
        }

        let removed = self.repository.delete(id).await?;

        if !blob_present && !removed {
            tracing::debug!(record_id = %id, "Nothing to delete, skipping event");
            return Ok(());
        }

        self.hub.broadcast(LifecycleEvent::FileDeleted);

        Ok(())
    }
}

async fn remove_temp(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => tracing::debug!(path = %path.display(), "Removed temp file"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "Failed to remove temp file"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docshuttle_db::MemoryFileRepository;
    use docshuttle_storage::MemoryStorage;
    use std::path::PathBuf;

    fn service_with(
        storage: Arc<MemoryStorage>,
        repository: Arc<MemoryFileRepository>,
        converter: &str,
    ) -> (LifecycleService, NotificationHub) {
        let hub = NotificationHub::new();
        let runner = ConversionRunner::new(converter.to_string(), vec![]).unwrap();
        let service = LifecycleService::new(storage, repository, runner, hub.clone());
        (service, hub)
    }

    #[cfg(unix)]
    fn write_stub(dir: &Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join("converter.sh");
        std::fs::write(&path, body).unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        path
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_upload_stores_blob_and_cleans_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let stub = write_stub(
            dir.path(),
            "#!/bin/sh\nout=\"${1%.pdf}.docx\"\ncp \"$1\" \"$out\"\n",
        );

        let input = dir.path().join("1700000000000.pdf");
        std::fs::write(&input, b"%PDF-1.4").unwrap();

        let storage = Arc::new(MemoryStorage::new());
        let repository = Arc::new(MemoryFileRepository::new());
        let (service, _hub) =
            service_with(storage.clone(), repository, &stub.to_string_lossy());

        let job = ConversionJob::new(&input, "client-a");
        let blob = service.handle_upload(&job).await.unwrap();

        assert_eq!(blob.key, "client-a/1700000000000.docx");
        assert!(storage
            .exists("client-a", "1700000000000.docx")
            .await
            .unwrap());
        assert!(!input.exists());
        assert!(!dir.path().join("1700000000000.docx").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failed_conversion_leaves_working_area_empty() {
        let dir = tempfile::tempdir().unwrap();
        let stub = write_stub(
            dir.path(),
            "#!/bin/sh\nout=\"${1%.pdf}.docx\"\necho partial > \"$out\"\nexit 1\n",
        );

        let input = dir.path().join("1700000000000.pdf");
        std::fs::write(&input, b"%PDF-1.4").unwrap();

        let storage = Arc::new(MemoryStorage::new());
        let repository = Arc::new(MemoryFileRepository::new());
        let (service, _hub) =
            service_with(storage.clone(), repository, &stub.to_string_lossy());

        let job = ConversionJob::new(&input, "client-a");
        let err = service.handle_upload(&job).await.unwrap_err();

        assert!(matches!(err, AppError::Conversion(_)));
        assert!(!input.exists());
        assert!(!dir.path().join("1700000000000.docx").exists());
        assert!(!storage
            .exists("client-a", "1700000000000.docx")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_register_broadcasts_file_added() {
        let storage = Arc::new(MemoryStorage::new());
        let repository = Arc::new(MemoryFileRepository::new());
        let (service, hub) = service_with(storage, repository, "/bin/true");
        let (_id, mut rx) = hub.subscribe();

        let record = service
            .register_metadata("client-a", "report.pdf", "1700000000000.docx")
            .await
            .unwrap();

        assert_eq!(record.original_name, "report.pdf");
        assert_eq!(rx.recv().await, Some(LifecycleEvent::FileAdded));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent_and_broadcasts() {
        let storage = Arc::new(MemoryStorage::new());
        let repository = Arc::new(MemoryFileRepository::new());
        storage
            .put("client-a", "1700000000000.docx", b"docx".to_vec())
            .await
            .unwrap();
        let record = repository
            .create("client-a", "report.pdf", "1700000000000.docx")
            .await
            .unwrap();

        let (service, hub) = service_with(storage.clone(), repository.clone(), "/bin/true");
        let (_id, mut rx) = hub.subscribe();

        service
            .delete("client-a", record.id, "1700000000000.docx")
            .await
            .unwrap();
        assert!(!storage
            .exists("client-a", "1700000000000.docx")
            .await
            .unwrap());
        assert!(repository.is_empty());
        assert_eq!(rx.recv().await, Some(LifecycleEvent::FileDeleted));

        // Second delete of the same file is a no-op success with no event.
        service
            .delete("client-a", record.id, "1700000000000.docx")
            .await
            .unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_delete_with_traversal_key_is_invalid_input() {
        let storage = Arc::new(MemoryStorage::new());
        let repository = Arc::new(MemoryFileRepository::new());
        let (service, hub) = service_with(storage, repository, "/bin/true");
        let (_id, mut rx) = hub.subscribe();

        let err = service
            .delete("client-a", uuid::Uuid::new_v4(), "../escape.docx")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidInput(_)));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_delete_of_nothing_raises_no_event() {
        let storage = Arc::new(MemoryStorage::new());
        let repository = Arc::new(MemoryFileRepository::new());
        let (service, hub) = service_with(storage, repository, "/bin/true");
        let (_id, mut rx) = hub.subscribe();

        service
            .delete("client-a", uuid::Uuid::new_v4(), "never-existed.docx")
            .await
            .unwrap();

        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_list_is_scoped_to_the_client() {
        let storage = Arc::new(MemoryStorage::new());
        let repository = Arc::new(MemoryFileRepository::new());
        repository
            .create("client-a", "mine.pdf", "1.docx")
            .await
            .unwrap();
        repository
            .create("client-b", "theirs.pdf", "2.docx")
            .await
            .unwrap();

        let (service, _hub) = service_with(storage, repository, "/bin/true");

        let records = service.list("client-a").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].original_name, "mine.pdf");
    }
}
