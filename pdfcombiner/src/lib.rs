//! pdfcombiner - Combine PDF documents from object storage.
//!
//! This library implements the job orchestration pipeline behind the
//! pdfcombiner service: given a list of document references, it
//! concurrently retrieves each payload (from object storage or from inline
//! base64 data), merges them into a single PDF, uploads the result, and
//! delivers a consolidated success/failure report. A failing document is
//! recorded and skipped; it never aborts the rest of the job.
//!
//! # Examples
//!
//! ## Running a job
//!
//! ```no_run
//! use pdfcombiner::config::StorageConfig;
//! use pdfcombiner::document::Document;
//! use pdfcombiner::job::{Job, JobRequest};
//! use pdfcombiner::merge::PdfMerger;
//! use pdfcombiner::notify::LogNotifier;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let request = JobRequest {
//!     bucket_name: "my-bucket".to_string(),
//!     doc_list: vec![Document::remote("a.pdf"), Document::remote("b.pdf")],
//!     combined_key: "combined/result.pdf".to_string(),
//!     callback: None,
//!     prefix: None,
//! };
//!
//! let mut job = Job::new(request, StorageConfig::from_env()?)?;
//! let report = job.run(&PdfMerger::new(), &LogNotifier::new()).await;
//! println!("success: {}, errors: {}", report.success, report.errors.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Using individual components
//!
//! ```no_run
//! use pdfcombiner::document::Document;
//! use pdfcombiner::merge::{DocumentCombiner, PdfMerger, ResolvedDocument};
//! use pdfcombiner::storage::MemoryStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = MemoryStore::new();
//! let doc = Document::remote("a.pdf");
//! let bytes = doc.resolve(&store, None).await?;
//!
//! let merger = PdfMerger::new();
//! let merged = merger
//!     .combine(&[ResolvedDocument::new("a.pdf", bytes)])
//!     .await?;
//! assert!(!merged.is_empty());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod document;
pub mod error;
pub mod job;
pub mod merge;
pub mod notify;
pub mod server;
pub mod storage;

// Re-export commonly used types
pub use document::Document;
pub use error::{CombinerError, Result};
pub use job::{Job, JobReport, JobRequest};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
