//! Job state machine.
//!
//! Replaces the single "upload complete" boolean with an explicit state
//! variant, so callers can tell a job that has not settled from one that
//! failed, and the success signal cannot be read mid-flight.

use std::fmt;

/// The lifecycle state of a combination job.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum JobState {
    /// Created, nothing dispatched yet.
    #[default]
    Pending,
    /// Resolution tasks are in flight.
    Resolving,
    /// The combine step is running.
    Combining,
    /// The combined artifact is being uploaded.
    Uploading,
    /// The artifact was uploaded; the job succeeded.
    Complete,
    /// The job failed; the payload describes why.
    Failed(String),
}

impl JobState {
    /// Check whether the job has reached a terminal state.
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Complete | Self::Failed(_))
    }

    /// Check whether the job succeeded.
    ///
    /// Only true after the final upload returned without error.
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Resolving => write!(f, "resolving"),
            Self::Combining => write!(f, "combining"),
            Self::Uploading => write!(f, "uploading"),
            Self::Complete => write!(f, "complete"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_pending() {
        assert_eq!(JobState::default(), JobState::Pending);
    }

    #[test]
    fn test_is_settled() {
        assert!(!JobState::Pending.is_settled());
        assert!(!JobState::Resolving.is_settled());
        assert!(!JobState::Combining.is_settled());
        assert!(!JobState::Uploading.is_settled());

        assert!(JobState::Complete.is_settled());
        assert!(JobState::Failed("boom".into()).is_settled());
    }

    #[test]
    fn test_is_complete() {
        assert!(JobState::Complete.is_complete());
        assert!(!JobState::Failed("boom".into()).is_complete());
        assert!(!JobState::Uploading.is_complete());
    }

    #[test]
    fn test_display() {
        assert_eq!(JobState::Resolving.to_string(), "resolving");
        assert_eq!(
            JobState::Failed("no documents resolved".into()).to_string(),
            "failed: no documents resolved"
        );
    }
}
