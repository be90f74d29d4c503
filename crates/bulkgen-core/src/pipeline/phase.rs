use std::fmt;

use crate::job::JobStatus;

/// Client-side lifecycle of the active job.
///
/// Phases only advance after the server has acknowledged the call that moves
/// them; the three terminal phases accept nothing further.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    New,
    Brainstormed,
    ReviewSubmitted,
    Generating,
    Completed,
    Failed,
    Cancelled,
}

impl Phase {
    /// Phase implied by a server status, for jobs adopted from the server.
    /// Unrecognized labels are treated as work in progress.
    pub fn from_status(status: &JobStatus) -> Phase {
        match status {
            JobStatus::Pending | JobStatus::PendingReview => Phase::Brainstormed,
            JobStatus::Reviewed => Phase::ReviewSubmitted,
            JobStatus::Processing | JobStatus::Generating | JobStatus::Unknown(_) => {
                Phase::Generating
            }
            JobStatus::Completed => Phase::Completed,
            JobStatus::Failed => Phase::Failed,
            JobStatus::Cancelled => Phase::Cancelled,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Completed | Phase::Failed | Phase::Cancelled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::New => "new",
            Phase::Brainstormed => "brainstormed",
            Phase::ReviewSubmitted => "review submitted",
            Phase::Generating => "generating",
            Phase::Completed => "completed",
            Phase::Failed => "failed",
            Phase::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_to_phase() {
        assert_eq!(Phase::from_status(&JobStatus::PendingReview), Phase::Brainstormed);
        assert_eq!(Phase::from_status(&JobStatus::Reviewed), Phase::ReviewSubmitted);
        assert_eq!(
            Phase::from_status(&JobStatus::parse("queued")),
            Phase::Generating
        );
        assert_eq!(Phase::from_status(&JobStatus::Cancelled), Phase::Cancelled);
        assert!(Phase::from_status(&JobStatus::Failed).is_terminal());
        assert!(!Phase::Generating.is_terminal());
    }
}
