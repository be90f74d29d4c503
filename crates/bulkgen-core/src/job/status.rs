//! Server-defined job status labels.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a bulk job as reported by the server.
///
/// Parsing never fails: labels outside the known set become `Unknown`, which is
/// treated as non-terminal so polling keeps going.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    /// Brainstorm requested, ideas not generated yet.
    Pending,
    /// Ideas generated, waiting for a human.
    PendingReview,
    Reviewed,
    Processing,
    Generating,
    Completed,
    Failed,
    Cancelled,
    Unknown(String),
}

impl JobStatus {
    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::PendingReview => "pending_review",
            JobStatus::Reviewed => "reviewed",
            JobStatus::Processing => "processing",
            JobStatus::Generating => "generating",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
            JobStatus::Unknown(s) => s,
        }
    }

    pub fn parse(s: &str) -> Self {
        let norm = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match norm.as_str() {
            "pending" => JobStatus::Pending,
            "pending_review" => JobStatus::PendingReview,
            "reviewed" => JobStatus::Reviewed,
            "processing" => JobStatus::Processing,
            "generating" => JobStatus::Generating,
            "completed" => JobStatus::Completed,
            "failed" => JobStatus::Failed,
            "cancelled" | "canceled" => JobStatus::Cancelled,
            _ => JobStatus::Unknown(s.trim().to_string()),
        }
    }

    /// Only the known terminal labels count; unknown labels are never terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled
        )
    }

    pub fn is_pending_review(&self) -> bool {
        matches!(self, JobStatus::PendingReview)
    }
}

impl From<String> for JobStatus {
    fn from(s: String) -> Self {
        JobStatus::parse(&s)
    }
}

impl From<JobStatus> for String {
    fn from(s: JobStatus) -> Self {
        s.as_str().to_string()
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
