//! Error types for pdfcombiner.
//!
//! This module defines all error types that can occur while running a
//! combination job. Errors carry enough context to show up usefully in a
//! job report without the caller needing to inspect the failing layer.
//!
//! # Error Categories
//!
//! - **Connection errors**: the storage handle could not be established;
//!   fatal to the whole job.
//! - **Per-document errors**: a single document failed to download or
//!   decode; recorded and isolated, never fatal.
//! - **Combine/Upload errors**: the merge or the final store write failed;
//!   the job is marked failed but still reports everything it knows.

use std::fmt;
use std::io;

/// Result type alias for pdfcombiner operations.
pub type Result<T> = std::result::Result<T, CombinerError>;

/// Main error type for pdfcombiner operations.
///
/// Per-document variants (`Retrieval`, `Decode`) are recorded against the
/// document that produced them and never unwind a job. `Connection`,
/// `EmptyJob` and `Cancelled` are job-fatal.
#[derive(Debug)]
pub enum CombinerError {
    /// Could not establish or authenticate the storage handle.
    Connection {
        /// Why the connection could not be established.
        reason: String,
    },

    /// A single document's remote fetch failed.
    Retrieval {
        /// Storage key of the document that failed.
        key: String,
        /// Underlying store error, as reported by the backend.
        reason: String,
    },

    /// A document's inline payload was malformed.
    Decode {
        /// Name of the document carrying the bad payload.
        key: String,
        /// Details about the decode failure.
        reason: String,
    },

    /// The merge step itself failed.
    Combine {
        /// Description of what went wrong.
        reason: String,
    },

    /// The final put of the combined artifact failed.
    Upload {
        /// Destination key of the failed upload.
        key: String,
        /// Underlying store error, as reported by the backend.
        reason: String,
    },

    /// The job has no documents, or none of them resolved.
    EmptyJob,

    /// An incoming job request failed validation.
    InvalidRequest {
        /// Description of what's wrong with the request.
        message: String,
    },

    /// The job was cancelled before it finished resolving.
    Cancelled,

    /// Generic I/O error.
    Io {
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Generic error with a custom message.
    Other {
        /// Error message.
        message: String,
    },
}

impl fmt::Display for CombinerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connection { reason } => {
                write!(f, "Cannot connect to object storage: {reason}")
            }
            Self::Retrieval { key, reason } => {
                write!(f, "Failed to retrieve document '{key}': {reason}")
            }
            Self::Decode { key, reason } => {
                write!(f, "Failed to decode inline data for '{key}': {reason}")
            }
            Self::Combine { reason } => {
                write!(f, "Combine operation failed: {reason}")
            }
            Self::Upload { key, reason } => {
                write!(f, "Failed to upload combined file to '{key}': {reason}")
            }
            Self::EmptyJob => {
                write!(f, "No documents available to combine")
            }
            Self::InvalidRequest { message } => {
                write!(f, "Invalid job request: {message}")
            }
            Self::Cancelled => {
                write!(f, "Job cancelled")
            }
            Self::Io { source } => {
                write!(f, "I/O error: {source}")
            }
            Self::Other { message } => {
                write!(f, "{message}")
            }
        }
    }
}

impl std::error::Error for CombinerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source } => Some(source),
            _ => None,
        }
    }
}

impl From<io::Error> for CombinerError {
    fn from(err: io::Error) -> Self {
        Self::Io { source: err }
    }
}

impl From<lopdf::Error> for CombinerError {
    fn from(err: lopdf::Error) -> Self {
        Self::combine(err.to_string())
    }
}

impl CombinerError {
    /// Create a Connection error.
    pub fn connection(reason: impl Into<String>) -> Self {
        Self::Connection {
            reason: reason.into(),
        }
    }

    /// Create a Retrieval error for the given storage key.
    pub fn retrieval(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Retrieval {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create a Decode error for the given document.
    pub fn decode(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Decode {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create a Combine error.
    pub fn combine(reason: impl Into<String>) -> Self {
        Self::Combine {
            reason: reason.into(),
        }
    }

    /// Create an Upload error for the given destination key.
    pub fn upload(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Upload {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create an InvalidRequest error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Create an Other error with a custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Check if this error is isolated to a single document.
    ///
    /// Isolated errors are recorded against the offending document and the
    /// rest of the job carries on.
    pub fn is_isolated(&self) -> bool {
        matches!(self, Self::Retrieval { .. } | Self::Decode { .. })
    }

    /// Check if this error is fatal to the whole job.
    ///
    /// A fatal error means no combined artifact can possibly be produced.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. } | Self::EmptyJob | Self::InvalidRequest { .. } | Self::Cancelled
        )
    }

    /// Get the exit code for this error.
    ///
    /// Returns the appropriate process exit code based on error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Connection { .. } => 2,
            Self::Retrieval { .. } => 3,
            Self::Decode { .. } => 3,
            Self::Combine { .. } => 4,
            Self::Upload { .. } => 5,
            Self::EmptyJob => 1,
            Self::InvalidRequest { .. } => 1,
            Self::Cancelled => 130, // Standard exit code for SIGINT
            Self::Io { .. } => 5,
            Self::Other { .. } => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::error::Error;

    #[test]
    fn test_connection_display() {
        let err = CombinerError::connection("credentials missing");
        let msg = format!("{err}");
        assert!(msg.contains("Cannot connect"));
        assert!(msg.contains("credentials missing"));
    }

    #[test]
    fn test_retrieval_display() {
        let err = CombinerError::retrieval("docs/a.pdf", "not found");
        let msg = format!("{err}");
        assert!(msg.contains("retrieve"));
        assert!(msg.contains("docs/a.pdf"));
        assert!(msg.contains("not found"));
    }

    #[test]
    fn test_decode_display() {
        let err = CombinerError::decode("inline.pdf", "invalid padding");
        let msg = format!("{err}");
        assert!(msg.contains("decode"));
        assert!(msg.contains("inline.pdf"));
    }

    #[test]
    fn test_upload_display() {
        let err = CombinerError::upload("combined.pdf", "store unavailable");
        let msg = format!("{err}");
        assert!(msg.contains("upload"));
        assert!(msg.contains("combined.pdf"));
        assert!(msg.contains("store unavailable"));
    }

    #[test]
    fn test_is_isolated() {
        assert!(CombinerError::retrieval("a", "gone").is_isolated());
        assert!(CombinerError::decode("a", "bad").is_isolated());

        assert!(!CombinerError::connection("no auth").is_isolated());
        assert!(!CombinerError::combine("corrupt").is_isolated());
        assert!(!CombinerError::upload("k", "down").is_isolated());
    }

    #[test]
    fn test_is_fatal() {
        assert!(CombinerError::connection("no auth").is_fatal());
        assert!(CombinerError::EmptyJob.is_fatal());
        assert!(CombinerError::Cancelled.is_fatal());
        assert!(CombinerError::invalid_request("no documents").is_fatal());

        assert!(!CombinerError::retrieval("a", "gone").is_fatal());
        assert!(!CombinerError::upload("k", "down").is_fatal());
    }

    #[rstest]
    #[case(CombinerError::connection("x"), 2)]
    #[case(CombinerError::retrieval("a", "x"), 3)]
    #[case(CombinerError::combine("x"), 4)]
    #[case(CombinerError::upload("k", "x"), 5)]
    #[case(CombinerError::EmptyJob, 1)]
    #[case(CombinerError::Cancelled, 130)]
    fn test_exit_codes(#[case] err: CombinerError, #[case] code: i32) {
        assert_eq!(err.exit_code(), code);
    }

    #[test]
    fn test_from_io_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "not found");
        let err: CombinerError = io_err.into();
        assert!(matches!(err, CombinerError::Io { .. }));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_builder_methods() {
        assert!(matches!(
            CombinerError::connection("x"),
            CombinerError::Connection { .. }
        ));
        assert!(matches!(
            CombinerError::combine("x"),
            CombinerError::Combine { .. }
        ));
        assert!(matches!(
            CombinerError::other("x"),
            CombinerError::Other { .. }
        ));
    }
}
