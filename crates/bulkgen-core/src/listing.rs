//! Job list view model: one page of jobs split into "awaiting review" and the rest.

use serde::Serialize;
use serde_json::Value;

use crate::api::ApiClient;
use crate::error::BulkError;
use crate::job::{BulkJob, JobStatus};

pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Filter and page window for a job listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobQuery {
    pub status_filter: Option<JobStatus>,
    pub skip: u32,
    pub limit: u32,
}

impl Default for JobQuery {
    fn default() -> Self {
        Self {
            status_filter: None,
            skip: 0,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl JobQuery {
    pub fn with_limit(limit: u32) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    /// Page size actually sent: at least 1, at most [`MAX_PAGE_SIZE`].
    pub fn effective_limit(&self) -> u32 {
        self.limit.clamp(1, MAX_PAGE_SIZE)
    }
}

/// A page of jobs, partitioned by whether they wait for human review.
/// Both groups keep server order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JobListing {
    pub pending_review: Vec<BulkJob>,
    pub others: Vec<BulkJob>,
}

impl JobListing {
    pub fn total(&self) -> usize {
        self.pending_review.len() + self.others.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// All jobs in this page, review queue first.
    pub fn iter(&self) -> impl Iterator<Item = &BulkJob> {
        self.pending_review.iter().chain(self.others.iter())
    }

    /// Partition raw job documents. Documents without an identifier are skipped.
    pub fn from_documents<'a>(docs: impl IntoIterator<Item = &'a Value>) -> Self {
        let mut listing = JobListing::default();
        for (index, doc) in docs.into_iter().enumerate() {
            let job = match BulkJob::from_value(doc) {
                Ok(job) => job,
                Err(e) => {
                    tracing::warn!(index, "skipping job in listing: {}", e);
                    continue;
                }
            };
            if job.status.is_pending_review() {
                listing.pending_review.push(job);
            } else {
                listing.others.push(job);
            }
        }
        listing
    }
}

/// Accepts a bare array or an object wrapping one under `jobs`.
fn job_documents(payload: &Value) -> Result<&[Value], String> {
    match payload {
        Value::Array(items) => Ok(items),
        Value::Object(map) => match map.get("jobs") {
            Some(Value::Array(items)) => Ok(items),
            Some(Value::Null) | None => Ok(&[]),
            Some(_) => Err("`jobs` is not a list".to_string()),
        },
        _ => Err("job list response is neither a list nor an object".to_string()),
    }
}

/// Fetch one page of jobs and partition it. No state is kept between calls.
pub async fn list_jobs(api: &ApiClient, query: &JobQuery) -> Result<JobListing, BulkError> {
    let status = query.status_filter.as_ref().map(JobStatus::as_str);
    let payload = api
        .list_jobs(status, query.skip, query.effective_limit())
        .await
        .map_err(BulkError::FetchFailed)?;
    let docs = job_documents(&payload).map_err(|message| {
        BulkError::FetchFailed(crate::api::ApiError::Decode { message })
    })?;
    let listing = JobListing::from_documents(docs);
    tracing::debug!(
        pending_review = listing.pending_review.len(),
        others = listing.others.len(),
        "loaded job listing"
    );
    Ok(listing)
}
