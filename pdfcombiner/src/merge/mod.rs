//! The combine step.
//!
//! The orchestration core treats merging as an opaque collaborator behind
//! [`DocumentCombiner`]: ordered payloads in, one combined artifact out.
//! [`PdfMerger`] is the production implementation.

pub mod merger;

pub use merger::PdfMerger;

use async_trait::async_trait;

use crate::error::Result;

/// A successfully resolved document payload, still in request order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDocument {
    /// The document's name from the originating request.
    pub name: String,

    /// Raw payload bytes.
    pub bytes: Vec<u8>,
}

impl ResolvedDocument {
    /// Creates a resolved document.
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

/// Merges an ordered sequence of payloads into a single artifact.
///
/// A job calls this exactly once, only with the documents that resolved
/// successfully, preserving original request order.
#[async_trait]
pub trait DocumentCombiner: Send + Sync {
    /// Combines `inputs` into one artifact.
    async fn combine(&self, inputs: &[ResolvedDocument]) -> Result<Vec<u8>>;
}
