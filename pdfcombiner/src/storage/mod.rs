//! Object storage abstraction.
//!
//! The orchestration core only ever talks to a [`BlobStore`]: a key/value
//! blob interface with `get` and `put`. The production implementation is
//! [`S3Store`]; tests and local experiments use [`MemoryStore`]. Retry
//! policy, if any, belongs to the backing client, not to this layer.

pub mod memory;
pub mod s3;

pub use memory::MemoryStore;
pub use s3::S3Store;

use async_trait::async_trait;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Failed to initialize or authenticate the storage backend.
    #[error("storage initialization failed: {0}")]
    Init(String),

    /// Object not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Permission denied by the backend.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Backend-specific error.
    #[error("backend error: {0}")]
    Backend(opendal::Error),
}

impl StorageError {
    /// Creates a new initialization error.
    pub fn init(msg: impl Into<String>) -> Self {
        Self::Init(msg.into())
    }

    /// Creates a new not found error.
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound(key.into())
    }
}

impl From<opendal::Error> for StorageError {
    fn from(err: opendal::Error) -> Self {
        use opendal::ErrorKind;

        match err.kind() {
            ErrorKind::NotFound => Self::NotFound(err.to_string()),
            ErrorKind::PermissionDenied => Self::PermissionDenied(err.to_string()),
            _ => Self::Backend(err),
        }
    }
}

/// A key/value blob store with get/put semantics.
///
/// Implementations must be safe for concurrent use; a single handle is
/// shared by every resolution task of a job.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Retrieves the object stored at `key`.
    async fn get(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// Stores `bytes` at `key` with the given content type.
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> StorageResult<()>;
}
