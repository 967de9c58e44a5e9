//! Storage abstraction trait
//!
//! This module defines the Storage trait that all blob backends must implement.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("List failed: {0}")]
    ListFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Blob not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Reference to a stored blob, returned from uploads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobRef {
    /// Full storage key, `{namespace}/{key}`.
    pub key: String,
    /// Publicly servable URL for the blob.
    pub url: String,
}

/// Listing entry for one real blob in a namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobMeta {
    /// Key within the namespace (no namespace prefix).
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Storage abstraction trait
///
/// Blob mutations are single-key and atomic from the caller's point of view;
/// cross-store consistency with the metadata records is maintained by ordering
/// discipline in the lifecycle service, not by transactions here.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Write a blob under `{namespace}/{key}`. Overwrites are idempotent.
    async fn put(&self, namespace: &str, key: &str, data: Vec<u8>) -> StorageResult<BlobRef>;

    /// List all top-level namespaces that contain blobs.
    ///
    /// Sentinel entries injected by the backend (placeholder files, hidden
    /// entries) are not namespaces and must be skipped.
    async fn list_namespaces(&self) -> StorageResult<Vec<String>>;

    /// List the real blobs within one namespace, skipping placeholder entries.
    async fn list(&self, namespace: &str) -> StorageResult<Vec<BlobMeta>>;

    /// Remove a blob. Removing a missing blob is Ok: deletes are idempotent.
    async fn remove(&self, namespace: &str, key: &str) -> StorageResult<()>;

    /// Check whether a blob exists.
    async fn exists(&self, namespace: &str, key: &str) -> StorageResult<bool>;
}

/// Reject keys and namespaces that could escape the storage root.
pub(crate) fn validate_component(component: &str) -> StorageResult<()> {
    if component.is_empty()
        || component.contains("..")
        || component.starts_with('/')
        || component.contains('\\')
    {
        return Err(StorageError::InvalidKey(
            "Storage key contains invalid characters".to_string(),
        ));
    }
    Ok(())
}

/// Placeholder/sentinel entries are not real blobs. Backends inject these to
/// represent empty prefixes; listings must never surface them.
pub(crate) fn is_sentinel(name: &str) -> bool {
    name.starts_with('.')
}
