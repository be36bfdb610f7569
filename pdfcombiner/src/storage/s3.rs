//! Amazon S3 blob store adapter.
//!
//! Wraps an OpenDAL S3 operator behind the [`BlobStore`] interface. One
//! handle is established per job, scoped to that job's bucket, and shared
//! read-only by every resolution task.

use async_trait::async_trait;
use opendal::{Operator, services};

use crate::config::StorageConfig;
use crate::storage::{BlobStore, StorageError, StorageResult};

/// S3-backed blob store, scoped to a single bucket.
#[derive(Clone)]
pub struct S3Store {
    operator: Operator,
    bucket: String,
}

impl S3Store {
    /// Establishes a handle to `bucket` and verifies it is usable.
    ///
    /// The verification round trip means an unreachable endpoint or a bad
    /// credential pair fails here, before any document work is dispatched,
    /// rather than midway through a job.
    pub async fn connect(config: &StorageConfig, bucket: &str) -> StorageResult<Self> {
        if bucket.trim().is_empty() {
            return Err(StorageError::init("bucket name is empty"));
        }

        let mut builder = services::S3::default()
            .bucket(bucket)
            .region(&config.region);

        if let Some(ref endpoint) = config.endpoint {
            builder = builder.endpoint(endpoint);
        }

        if let Some(ref access_key_id) = config.access_key_id {
            builder = builder.access_key_id(access_key_id);
        }

        if let Some(ref secret_access_key) = config.secret_access_key {
            builder = builder.secret_access_key(secret_access_key);
        }

        let operator = Operator::new(builder)
            .map(|op| op.finish())
            .map_err(|e| StorageError::init(e.to_string()))?;

        operator.check().await?;

        tracing::info!(bucket = %bucket, region = %config.region, "storage handle established");

        Ok(Self {
            operator,
            bucket: bucket.to_string(),
        })
    }

    /// Returns the bucket this handle is scoped to.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl BlobStore for S3Store {
    async fn get(&self, key: &str) -> StorageResult<Vec<u8>> {
        tracing::debug!(bucket = %self.bucket, key = %key, "fetching object");

        let data = self.operator.read(key).await?.to_vec();

        tracing::debug!(key = %key, size = data.len(), "object fetched");

        Ok(data)
    }

    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> StorageResult<()> {
        tracing::debug!(bucket = %self.bucket, key = %key, size = bytes.len(), "uploading object");

        self.operator
            .write_with(key, bytes)
            .content_type(content_type)
            .await?;

        tracing::debug!(key = %key, "object uploaded");

        Ok(())
    }
}

impl std::fmt::Debug for S3Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Store")
            .field("bucket", &self.bucket)
            .finish_non_exhaustive()
    }
}
