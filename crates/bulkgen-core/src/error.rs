//! Domain errors for the bulk job pipeline.

use crate::api::ApiError;
use crate::identity::JobId;
use crate::pipeline::Phase;

/// Errors raised by the reconciler, the state machine and the list view model.
///
/// Domain variants are raised before any network call; the `*Failed` variants wrap
/// the adapter error that stopped the operation.
#[derive(Debug, thiserror::Error)]
pub enum BulkError {
    #[error("job document has no identifier (job_id, _id or id)")]
    MissingJobIdentity,
    #[error("response contains no article ideas")]
    NoIdeasFound,
    #[error("no ideas approved; approve at least one idea before submitting")]
    NoIdeasApproved,
    #[error("approved idea {idea_id} has an empty title")]
    EmptyIdeaTitle { idea_id: String },
    #[error("brainstorm produced no ideas for this topic")]
    NoIdeasGenerated,
    #[error("no active job")]
    NoActiveJob,
    #[error("job {job_id} is {status} and accepts no further changes")]
    JobTerminated { job_id: JobId, status: String },
    #[error("cannot {operation} while the job is {phase}")]
    InvalidTransition {
        operation: &'static str,
        phase: Phase,
    },
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("no idea at position {}", .0 + 1)]
    UnknownIdea(usize),

    #[error("brainstorm failed")]
    BrainstormFailed(#[source] ApiError),
    #[error("review submission failed")]
    ReviewSubmissionFailed(#[source] ApiError),
    #[error("could not start generation")]
    GenerationStartFailed(#[source] ApiError),
    #[error("{operation} failed for job {job_id}")]
    JobOperationFailed {
        operation: &'static str,
        job_id: JobId,
        #[source]
        source: ApiError,
    },
    #[error("could not load jobs")]
    FetchFailed(#[source] ApiError),
}

impl BulkError {
    /// Underlying adapter error, if this failure came from the API.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            BulkError::BrainstormFailed(e)
            | BulkError::ReviewSubmissionFailed(e)
            | BulkError::GenerationStartFailed(e)
            | BulkError::FetchFailed(e)
            | BulkError::JobOperationFailed { source: e, .. } => Some(e),
            _ => None,
        }
    }
}
