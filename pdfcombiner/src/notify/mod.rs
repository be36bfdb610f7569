//! Job report delivery.
//!
//! The job hands its final report to a [`Notifier`] exactly once and does
//! not care how it travels: over HTTP to a callback URL in server mode, or
//! straight into the log for local runs.

pub mod webhook;

pub use webhook::WebhookNotifier;

use async_trait::async_trait;

use crate::job::JobReport;

/// Errors that can occur while delivering a job report.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// The callback URL could not be parsed.
    #[error("invalid callback URL '{url}': {reason}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
        /// Why it failed to parse.
        reason: String,
    },

    /// The report could not be delivered to the callback target.
    #[error("failed to deliver report to {url}: {reason}")]
    Delivery {
        /// The callback URL.
        url: String,
        /// What went wrong during delivery.
        reason: String,
    },

    /// The report could not be serialized.
    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Delivers the final status of a job to whoever requested it.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers `report`. Called exactly once per job, after all phases
    /// have settled.
    async fn deliver(&self, report: &JobReport) -> Result<(), NotifyError>;
}

/// Notifier that writes the report to the log.
///
/// Used by one-shot runs and as a stand-in wherever no callback URL was
/// supplied.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl LogNotifier {
    /// Creates a log notifier.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn deliver(&self, report: &JobReport) -> Result<(), NotifyError> {
        let payload = serde_json::to_string(report)?;
        tracing::info!(success = report.success, report = %payload, "job report");
        Ok(())
    }
}
