use crate::traits::{
    is_sentinel, validate_component, BlobMeta, BlobRef, Storage, StorageError, StorageResult,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem storage implementation
///
/// Blobs live at `{base_path}/{namespace}/{key}`; each client namespace is one
/// directory.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for blob storage (e.g., "/var/lib/docshuttle/storage")
    /// * `base_url` - Base URL for serving blobs (e.g., "http://localhost:5050/files")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
        })
    }

    fn blob_path(&self, namespace: &str, key: &str) -> StorageResult<PathBuf> {
        validate_component(namespace)?;
        validate_component(key)?;
        Ok(self.base_path.join(namespace).join(key))
    }

    fn generate_url(&self, namespace: &str, key: &str) -> String {
        format!("{}/{}/{}", self.base_url.trim_end_matches('/'), namespace, key)
    }

    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

fn created_at_from_metadata(meta: &std::fs::Metadata) -> DateTime<Utc> {
    // Not every filesystem records a birth time; fall back to mtime.
    let system_time = meta
        .created()
        .or_else(|_| meta.modified())
        .unwrap_or_else(|_| std::time::SystemTime::now());
    DateTime::<Utc>::from(system_time)
}

#[async_trait]
impl Storage for LocalStorage {
    async fn put(&self, namespace: &str, key: &str, data: Vec<u8>) -> StorageResult<BlobRef> {
        let path = self.blob_path(namespace, key)?;
        let size = data.len();

        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        let key_full = format!("{}/{}", namespace, key);
        let url = self.generate_url(namespace, key);

        tracing::info!(
            path = %path.display(),
            key = %key_full,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(BlobRef { key: key_full, url })
    }

    async fn list_namespaces(&self) -> StorageResult<Vec<String>> {
        let mut namespaces = Vec::new();
        let mut entries = fs::read_dir(&self.base_path).await.map_err(|e| {
            StorageError::ListFailed(format!(
                "Failed to read storage root {}: {}",
                self.base_path.display(),
                e
            ))
        })?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StorageError::ListFailed(e.to_string()))?
        {
            let name = entry.file_name().to_string_lossy().into_owned();
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| StorageError::ListFailed(e.to_string()))?;
            // Only directories are namespaces; sentinel entries are neither.
            if file_type.is_dir() && !is_sentinel(&name) {
                namespaces.push(name);
            }
        }

        namespaces.sort();
        Ok(namespaces)
    }

    async fn list(&self, namespace: &str) -> StorageResult<Vec<BlobMeta>> {
        validate_component(namespace)?;
        let dir = self.base_path.join(namespace);

        if !fs::try_exists(&dir).await.unwrap_or(false) {
            return Ok(Vec::new());
        }

        let mut blobs = Vec::new();
        let mut entries = fs::read_dir(&dir)
            .await
            .map_err(|e| StorageError::ListFailed(e.to_string()))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StorageError::ListFailed(e.to_string()))?
        {
            let name = entry.file_name().to_string_lossy().into_owned();
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| StorageError::ListFailed(e.to_string()))?;
            if !file_type.is_file() || is_sentinel(&name) {
                continue;
            }
            let meta = entry
                .metadata()
                .await
                .map_err(|e| StorageError::ListFailed(e.to_string()))?;
            blobs.push(BlobMeta {
                name,
                created_at: created_at_from_metadata(&meta),
            });
        }

        blobs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(blobs)
    }

    async fn remove(&self, namespace: &str, key: &str) -> StorageResult<()> {
        let path = self.blob_path(namespace, key)?;
        let start = std::time::Instant::now();

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(());
        }

        fs::remove_file(&path).await.map_err(|e| {
            StorageError::DeleteFailed(format!("Failed to delete file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            key = %format!("{}/{}", namespace, key),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage delete successful"
        );

        Ok(())
    }

    async fn exists(&self, namespace: &str, key: &str) -> StorageResult<bool> {
        let path = self.blob_path(namespace, key)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }
}
