use crate::traits::{
    is_sentinel, validate_component, BlobMeta, BlobRef, Storage, StorageError, StorageResult,
};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone)]
struct StoredBlob {
    data: Bytes,
    created_at: DateTime<Utc>,
}

/// In-memory storage backend.
///
/// Used by tests and local development; behaves like the filesystem backend
/// including sentinel filtering and idempotent removes. `put_with_created_at`
/// lets expiry tests backdate blobs.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    blobs: Arc<RwLock<BTreeMap<String, BTreeMap<String, StoredBlob>>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a blob with an explicit creation time.
    pub fn put_with_created_at(
        &self,
        namespace: &str,
        key: &str,
        data: Vec<u8>,
        created_at: DateTime<Utc>,
    ) -> StorageResult<BlobRef> {
        validate_component(namespace)?;
        validate_component(key)?;

        let mut blobs = self.blobs.write().expect("storage lock poisoned");
        blobs.entry(namespace.to_string()).or_default().insert(
            key.to_string(),
            StoredBlob {
                data: Bytes::from(data),
                created_at,
            },
        );

        Ok(BlobRef {
            key: format!("{}/{}", namespace, key),
            url: format!("memory://{}/{}", namespace, key),
        })
    }

    /// Blob bytes, if present. Test helper.
    pub fn get(&self, namespace: &str, key: &str) -> Option<Bytes> {
        let blobs = self.blobs.read().expect("storage lock poisoned");
        blobs
            .get(namespace)
            .and_then(|ns| ns.get(key))
            .map(|blob| blob.data.clone())
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn put(&self, namespace: &str, key: &str, data: Vec<u8>) -> StorageResult<BlobRef> {
        self.put_with_created_at(namespace, key, data, Utc::now())
    }

    async fn list_namespaces(&self) -> StorageResult<Vec<String>> {
        let blobs = self.blobs.read().expect("storage lock poisoned");
        Ok(blobs
            .iter()
            .filter(|(name, ns)| !is_sentinel(name) && !ns.is_empty())
            .map(|(name, _)| name.clone())
            .collect())
    }

    async fn list(&self, namespace: &str) -> StorageResult<Vec<BlobMeta>> {
        validate_component(namespace)?;
        let blobs = self.blobs.read().expect("storage lock poisoned");
        Ok(blobs
            .get(namespace)
            .map(|ns| {
                ns.iter()
                    .filter(|(name, _)| !is_sentinel(name))
                    .map(|(name, blob)| BlobMeta {
                        name: name.clone(),
                        created_at: blob.created_at,
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn remove(&self, namespace: &str, key: &str) -> StorageResult<()> {
        validate_component(namespace)?;
        validate_component(key)?;
        let mut blobs = self.blobs.write().expect("storage lock poisoned");
        if let Some(ns) = blobs.get_mut(namespace) {
            ns.remove(key);
            if ns.is_empty() {
                blobs.remove(namespace);
            }
        }
        Ok(())
    }

    async fn exists(&self, namespace: &str, key: &str) -> StorageResult<bool> {
        validate_component(namespace)?;
        validate_component(key)?;
        let blobs = self.blobs.read().expect("storage lock poisoned");
        Ok(blobs
            .get(namespace)
            .map(|ns| ns.contains_key(key))
            .unwrap_or(false))
    }
}
