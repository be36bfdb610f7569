//! In-memory blob store.
//!
//! Backed by OpenDAL's memory service. Used by the test suite and handy for
//! exercising the pipeline without object storage credentials.

use async_trait::async_trait;
use opendal::{Operator, services};

use crate::storage::{BlobStore, StorageError, StorageResult};

/// Blob store that keeps every object in process memory.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    operator: Operator,
}

impl MemoryStore {
    /// Creates an empty in-memory store.
    pub fn new() -> Self {
        let operator = Operator::new(services::Memory::default())
            .expect("memory service accepts an empty configuration")
            .finish();

        Self { operator }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlobStore for MemoryStore {
    async fn get(&self, key: &str) -> StorageResult<Vec<u8>> {
        match self.operator.read(key).await {
            Ok(buffer) => Ok(buffer.to_vec()),
            Err(err) if err.kind() == opendal::ErrorKind::NotFound => {
                Err(StorageError::not_found(key))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn put(&self, key: &str, bytes: Vec<u8>, _content_type: &str) -> StorageResult<()> {
        self.operator.write(key, bytes).await?;
        Ok(())
    }
}
