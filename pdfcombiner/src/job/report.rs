//! The consolidated job report.
//!
//! Built exactly once when a job settles, then handed to the notifier.
//! Error keys are sorted (`BTreeMap`) so that serializing the same report
//! twice produces identical bytes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Final outcome of a combination job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobReport {
    /// True only when the combined artifact was uploaded successfully.
    pub success: bool,

    /// Failed-item identifier to human-readable error description.
    ///
    /// Keys are document storage keys, the combined key for upload
    /// failures, or the `combine`/`connection`/`cancelled` markers.
    pub errors: BTreeMap<String, String>,

    /// Number of documents named in the request.
    pub documents_requested: usize,

    /// Number of documents that resolved to payload bytes.
    pub documents_resolved: usize,

    /// Wall-clock job duration in milliseconds, recorded at settle time.
    pub elapsed_ms: u64,
}

impl JobReport {
    /// Check whether any errors were recorded.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
