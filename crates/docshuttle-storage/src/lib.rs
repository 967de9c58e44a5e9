//! Docshuttle Storage Library
//!
//! Blob storage abstraction and implementations. The [`Storage`] trait models
//! an object store organized by client namespace: every blob lives under
//! `{namespace}/{key}` where the namespace is the opaque client identifier.
//!
//! Keys must not contain `..` or a leading `/`. Listings return real blobs
//! only: backend placeholder/sentinel entries are filtered out by the
//! implementations, never worked around by the caller.

pub mod local;
pub mod memory;
pub mod traits;

pub use local::LocalStorage;
pub use memory::MemoryStorage;
pub use traits::{BlobMeta, BlobRef, Storage, StorageError, StorageResult};
