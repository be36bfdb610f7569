//! Job orchestration.
//!
//! A [`Job`] turns a list of document references into a combined, uploaded
//! artifact and a consolidated report. Documents are resolved concurrently;
//! a failure in one is recorded and never aborts its siblings. The combine
//! and upload phases run strictly after every resolution task has settled,
//! and the final report is handed to the notifier exactly once.

pub mod report;
pub mod state;

pub use report::JobReport;
pub use state::JobState;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tokio_util::sync::CancellationToken;

use crate::config::{COMBINED_CONTENT_TYPE, StorageConfig};
use crate::document::Document;
use crate::error::{CombinerError, Result};
use crate::merge::{DocumentCombiner, ResolvedDocument};
use crate::notify::Notifier;
use crate::storage::{BlobStore, S3Store};

/// Report key for a combine-step failure.
pub const COMBINE_ERROR_KEY: &str = "combine";

/// Report key for a storage connection failure.
pub const CONNECTION_ERROR_KEY: &str = "connection";

/// Report key marking a cancelled job.
pub const CANCELLED_KEY: &str = "cancelled";

/// Default number of resolution tasks in flight at once.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 8;

/// An incoming request to combine a set of documents.
///
/// This is the wire format shared by every entry point; the server mode
/// deserializes it from the request body, tests and tools construct it
/// directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRequest {
    /// Bucket holding the source documents and receiving the result.
    pub bucket_name: String,

    /// Documents to combine, in merge order.
    pub doc_list: Vec<Document>,

    /// Destination key for the combined artifact.
    pub combined_key: String,

    /// Callback URL notified when the job settles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback: Option<String>,

    /// Optional key prefix applied to every document name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

impl JobRequest {
    /// Validates the request.
    ///
    /// # Errors
    ///
    /// Returns [`CombinerError::InvalidRequest`] when the bucket, the
    /// destination key, the document list, or any document name is empty.
    pub fn validate(&self) -> Result<()> {
        if self.bucket_name.trim().is_empty() {
            return Err(CombinerError::invalid_request("bucket_name is empty"));
        }
        if self.combined_key.trim().is_empty() {
            return Err(CombinerError::invalid_request("combined_key is empty"));
        }
        if self.doc_list.is_empty() {
            return Err(CombinerError::invalid_request("doc_list is empty"));
        }
        if self.doc_list.iter().any(|doc| doc.name.trim().is_empty()) {
            return Err(CombinerError::invalid_request(
                "doc_list contains a document with an empty name",
            ));
        }
        Ok(())
    }

    /// Check whether any document requires a remote fetch.
    pub fn needs_remote(&self) -> bool {
        self.doc_list.iter().any(|doc| !doc.has_inline_data())
    }
}

/// The orchestration unit for one combination request.
///
/// Owns the document list, drives concurrent resolution, invokes the
/// combine collaborator, uploads the result, and accumulates errors. The
/// storage handle is established lazily, exactly once, on first use; a
/// connection failure is fatal to the whole job.
pub struct Job {
    request: JobRequest,
    storage: StorageConfig,
    store: OnceCell<Arc<dyn BlobStore>>,
    state: JobState,
    errors: BTreeMap<String, String>,
    resolved_count: usize,
    max_in_flight: usize,
    cancel: CancellationToken,
    started: Instant,
    report: Option<JobReport>,
}

impl Job {
    /// Creates a job that will connect to object storage on first use.
    ///
    /// # Errors
    ///
    /// Returns [`CombinerError::InvalidRequest`] when the request fails
    /// validation.
    pub fn new(request: JobRequest, storage: StorageConfig) -> Result<Self> {
        request.validate()?;
        Ok(Self {
            request,
            storage,
            store: OnceCell::new(),
            state: JobState::Pending,
            errors: BTreeMap::new(),
            resolved_count: 0,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            cancel: CancellationToken::new(),
            started: Instant::now(),
            report: None,
        })
    }

    /// Creates a job around an already-established store handle.
    ///
    /// Used by tests and by callers that manage their own storage
    /// lifecycle; the lazy connect step is skipped entirely.
    ///
    /// # Errors
    ///
    /// Returns [`CombinerError::InvalidRequest`] when the request fails
    /// validation.
    pub fn with_store(request: JobRequest, store: Arc<dyn BlobStore>) -> Result<Self> {
        request.validate()?;
        Ok(Self {
            request,
            storage: StorageConfig::default(),
            store: OnceCell::new_with(Some(store)),
            state: JobState::Pending,
            errors: BTreeMap::new(),
            resolved_count: 0,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            cancel: CancellationToken::new(),
            started: Instant::now(),
            report: None,
        })
    }

    /// Sets the maximum number of concurrent resolution tasks.
    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight.max(1);
        self
    }

    /// Returns a token that cancels this job when triggered.
    ///
    /// Cancellation stops new resolution tasks from being dispatched, lets
    /// in-flight ones settle, and sends the job straight to reporting with
    /// a cancelled marker in its error map.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Returns the request this job was created from.
    pub fn request(&self) -> &JobRequest {
        &self.request
    }

    /// Returns the current job state.
    pub fn state(&self) -> &JobState {
        &self.state
    }

    /// Returns the errors recorded so far.
    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    /// Returns the report, if the job has settled.
    pub fn report(&self) -> Option<&JobReport> {
        self.report.as_ref()
    }

    /// Runs the whole pipeline: resolve, combine, upload, report, notify.
    ///
    /// Per-document failures are recorded and never abort the job; only a
    /// storage connection failure or an empty resolved set short-circuits.
    /// The report is handed to `notifier` exactly once, after everything
    /// has settled. Notification failures are logged, not propagated.
    pub async fn run(
        &mut self,
        combiner: &dyn DocumentCombiner,
        notifier: &dyn Notifier,
    ) -> JobReport {
        tracing::info!(
            bucket = %self.request.bucket_name,
            documents = self.request.doc_list.len(),
            combined_key = %self.request.combined_key,
            "job started"
        );

        let resolved = self.resolve_all().await;

        if !self.state.is_settled() {
            if resolved.is_empty() {
                self.state = JobState::Failed("no documents resolved".to_string());
            } else {
                self.state = JobState::Combining;
                match combiner.combine(&resolved).await {
                    Ok(bytes) => self.upload(bytes).await,
                    Err(err) => {
                        self.record_error(COMBINE_ERROR_KEY, &err);
                        self.state = JobState::Failed("combine failed".to_string());
                    }
                }
            }
        }

        let report = self.settle();

        if let Err(err) = notifier.deliver(&report).await {
            tracing::error!(error = %err, "failed to deliver job report");
        }

        report
    }

    /// Resolves every document concurrently.
    ///
    /// Each document is dispatched as its own task; completion order is
    /// irrelevant because successes are re-sequenced by original index
    /// before they are returned. Failures land in the error map through a
    /// single collector loop, so no lock guards the map.
    pub async fn resolve_all(&mut self) -> Vec<ResolvedDocument> {
        self.state = JobState::Resolving;

        let store = if self.request.needs_remote() {
            match self.store().await {
                Ok(store) => Some(store),
                Err(err) => {
                    self.record_error(CONNECTION_ERROR_KEY, &err);
                    self.state = JobState::Failed("storage connection failed".to_string());
                    return Vec::new();
                }
            }
        } else {
            None
        };

        let prefix = self.request.prefix.clone();
        let cancel_root = self.cancel.clone();
        let docs: Vec<Document> = self.request.doc_list.clone();

        let tasks = docs.into_iter().enumerate().map(move |(index, doc)| {
            let store = store.clone();
            let prefix = prefix.clone();
            let cancel = cancel_root.clone();

            async move {
                if cancel.is_cancelled() {
                    return (index, doc, Err(CombinerError::Cancelled));
                }

                let outcome = if doc.has_inline_data() {
                    doc.decode_inline()
                } else {
                    match store {
                        Some(ref store) => {
                            doc.fetch_remote(store.as_ref(), prefix.as_deref()).await
                        }
                        None => Err(CombinerError::connection("storage handle not established")),
                    }
                };

                (index, doc, outcome)
            }
        });

        let outcomes = stream::iter(tasks)
            .buffer_unordered(self.max_in_flight)
            .collect::<Vec<_>>()
            .await;

        let mut cancelled = false;
        let mut resolved = Vec::new();

        for (index, doc, outcome) in outcomes {
            match outcome {
                Ok(bytes) => {
                    tracing::debug!(name = %doc.name, size = bytes.len(), "document resolved");
                    resolved.push((index, ResolvedDocument::new(doc.name, bytes)));
                }
                Err(CombinerError::Cancelled) => cancelled = true,
                Err(err) => self.record_error(&doc.name, &err),
            }
        }

        if cancelled {
            self.record_error(CANCELLED_KEY, &CombinerError::Cancelled);
        }

        // Re-sequence by original index: combine input order must match
        // request order, not completion order.
        resolved.sort_by_key(|(index, _)| *index);
        self.resolved_count = resolved.len();

        resolved.into_iter().map(|(_, doc)| doc).collect()
    }

    /// Uploads the combined artifact to the destination key.
    ///
    /// At most one store write is attempted per job; calling this again
    /// after the job completed is a no-op.
    pub async fn upload(&mut self, bytes: Vec<u8>) {
        if self.state.is_complete() {
            tracing::warn!("upload requested after job already completed, ignoring");
            return;
        }

        self.state = JobState::Uploading;
        let key = self.request.combined_key.clone();

        let store = match self.store().await {
            Ok(store) => store,
            Err(err) => {
                self.record_error(CONNECTION_ERROR_KEY, &err);
                self.state = JobState::Failed("storage connection failed".to_string());
                return;
            }
        };

        match store.put(&key, bytes, COMBINED_CONTENT_TYPE).await {
            Ok(()) => {
                tracing::info!(key = %key, "combined file uploaded");
                self.state = JobState::Complete;
            }
            Err(err) => {
                let err = CombinerError::upload(&key, err.to_string());
                self.record_error(&key, &err);
                self.state = JobState::Failed("upload failed".to_string());
            }
        }
    }

    /// Establishes the storage handle, once.
    async fn store(&self) -> Result<Arc<dyn BlobStore>> {
        let store = self
            .store
            .get_or_try_init(|| async {
                let store = S3Store::connect(&self.storage, &self.request.bucket_name)
                    .await
                    .map_err(|err| CombinerError::connection(err.to_string()))?;
                Ok::<_, CombinerError>(Arc::new(store) as Arc<dyn BlobStore>)
            })
            .await?;

        Ok(store.clone())
    }

    /// Records an error against a report key.
    fn record_error(&mut self, key: &str, err: &CombinerError) {
        tracing::warn!(key = %key, error = %err, "job error recorded");
        self.errors.insert(key.to_string(), err.to_string());
    }

    /// Builds the final report, once, and caches it.
    ///
    /// Repeated calls on a settled job return clones of the same value, so
    /// report generation is idempotent.
    fn settle(&mut self) -> JobReport {
        if let Some(report) = &self.report {
            return report.clone();
        }

        let report = JobReport {
            success: self.state.is_complete(),
            errors: self.errors.clone(),
            documents_requested: self.request.doc_list.len(),
            documents_resolved: self.resolved_count,
            elapsed_ms: self.started.elapsed().as_millis() as u64,
        };

        tracing::info!(
            success = report.success,
            errors = report.errors.len(),
            elapsed_ms = report.elapsed_ms,
            "job settled"
        );

        self.report = Some(report.clone());
        report
    }
}

impl std::fmt::Debug for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Job")
            .field("bucket", &self.request.bucket_name)
            .field("combined_key", &self.request.combined_key)
            .field("documents", &self.request.doc_list.len())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
