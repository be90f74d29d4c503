//! Typed wrappers for the `/bulk/*` endpoints.

use serde::Serialize;
use serde_json::Value;

use super::{ApiBody, ApiClient, ApiError, Method};
use crate::identity::JobId;
use crate::ideas::ReviewSubmission;

/// Body of `POST /bulk/brainstorm`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BrainstormPayload {
    pub topic: String,
    pub category: String,
    pub num_articles: u32,
    pub target_length: Option<String>,
    pub content_type: Option<String>,
    pub target_audience: Option<String>,
    pub brand_voice: Option<String>,
    pub competitor_insights: Option<String>,
}

/// Body of `POST /bulk/direct`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DirectPayload {
    pub topic: String,
    pub category: String,
    pub num_articles: u32,
}

fn to_value<T: Serialize>(body: &T) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::Decode {
        message: format!("encode request body: {}", e),
    })
}

impl ApiClient {
    /// `POST /bulk/brainstorm` → job document with generated ideas.
    pub async fn brainstorm(&self, payload: &BrainstormPayload) -> Result<Value, ApiError> {
        let url = self.endpoint(&["bulk", "brainstorm"], &[])?;
        self.request(Method::Post, url, Some(&to_value(payload)?))
            .await?
            .into_json()
    }

    /// `PUT /bulk/review/{job_id}`.
    pub async fn submit_review(
        &self,
        job_id: &JobId,
        submission: &ReviewSubmission,
    ) -> Result<ApiBody, ApiError> {
        let url = self.endpoint(&["bulk", "review", job_id.as_str()], &[])?;
        self.request(Method::Put, url, Some(&to_value(submission)?))
            .await
    }

    /// `POST /bulk/generate/{job_id}` (no body).
    pub async fn start_generation(&self, job_id: &JobId) -> Result<ApiBody, ApiError> {
        let url = self.endpoint(&["bulk", "generate", job_id.as_str()], &[])?;
        self.request(Method::Post, url, None).await
    }

    /// `POST /bulk/direct` → job document, generation already running.
    pub async fn direct_generation(&self, payload: &DirectPayload) -> Result<Value, ApiError> {
        let url = self.endpoint(&["bulk", "direct"], &[])?;
        self.request(Method::Post, url, Some(&to_value(payload)?))
            .await?
            .into_json()
    }

    /// `GET /bulk/jobs?status_filter=&skip=&limit=`.
    pub async fn list_jobs(
        &self,
        status_filter: Option<&str>,
        skip: u32,
        limit: u32,
    ) -> Result<Value, ApiError> {
        let mut query = Vec::with_capacity(3);
        if let Some(status) = status_filter {
            query.push(("status_filter", status.to_string()));
        }
        query.push(("skip", skip.to_string()));
        query.push(("limit", limit.to_string()));
        let url = self.endpoint(&["bulk", "jobs"], &query)?;
        self.request(Method::Get, url, None).await?.into_json()
    }

    /// `GET /bulk/jobs/{job_id}` → full job document.
    pub async fn get_job(&self, job_id: &JobId) -> Result<Value, ApiError> {
        let url = self.endpoint(&["bulk", "jobs", job_id.as_str()], &[])?;
        self.request(Method::Get, url, None).await?.into_json()
    }

    /// `PATCH /bulk/jobs/{job_id}/cancel`.
    pub async fn cancel_job(&self, job_id: &JobId) -> Result<ApiBody, ApiError> {
        let url = self.endpoint(&["bulk", "jobs", job_id.as_str(), "cancel"], &[])?;
        self.request(Method::Patch, url, None).await
    }

    /// `DELETE /bulk/jobs/{job_id}`; 204 and `{}` both count as success.
    pub async fn delete_job(&self, job_id: &JobId) -> Result<ApiBody, ApiError> {
        let url = self.endpoint(&["bulk", "jobs", job_id.as_str()], &[])?;
        self.request(Method::Delete, url, None).await
    }
}
