//! Bulk job documents.
//!
//! A [`BulkJob`] is the client's normalized view of one server job document:
//! identity resolved once, status parsed, counts clamped, ideas normalized.

mod progress;
mod status;

pub use progress::JobProgress;
pub use status::JobStatus;

use serde::Serialize;
use serde_json::Value;

use crate::error::BulkError;
use crate::identity::{self, JobId};
use crate::ideas::{self, ArticleIdea};

/// One request to generate a batch of articles around a topic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkJob {
    pub job_id: JobId,
    pub topic: String,
    pub category: String,
    pub status: JobStatus,
    pub total_articles: u32,
    pub completed_articles: u32,
    pub progress_percent: f64,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub target_length: Option<String>,
    pub content_type: Option<String>,
    pub target_audience: Option<String>,
    pub brand_voice: Option<String>,
    /// Server-side failure reason for failed jobs.
    pub error: Option<String>,
    pub ideas: Vec<ArticleIdea>,
    #[serde(skip)]
    reported: ReportedCounts,
}

/// Progress values the document actually carried, before defaults and clamping.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct ReportedCounts {
    total: Option<u32>,
    completed: Option<u32>,
    percent: Option<f64>,
}

fn text(doc: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| match doc.get(k)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn count(doc: &Value, keys: &[&str]) -> Option<u32> {
    keys.iter().find_map(|k| match doc.get(k)? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .map(|v| v.min(u32::MAX as u64) as u32),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    })
}

fn percent(doc: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|k| match doc.get(k)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').parse::<f64>().ok(),
        _ => None,
    })
}

impl BulkJob {
    /// Normalize a job document. Fails only when the document has no identity.
    pub fn from_value(doc: &Value) -> Result<Self, BulkError> {
        Ok(Self::build(identity::require_id(doc)?, doc))
    }

    /// Normalize a document fetched for a known job; status documents may omit the id.
    pub fn from_value_or(doc: &Value, known: &JobId) -> Self {
        let job_id = identity::resolve_id(doc).unwrap_or_else(|| known.clone());
        Self::build(job_id, doc)
    }

    fn build(job_id: JobId, doc: &Value) -> Self {
        let ideas = ideas::normalize_embedded(doc);

        let reported = ReportedCounts {
            total: count(doc, &["total_articles", "num_articles"]),
            completed: count(doc, &["completed_articles", "articles_completed"]),
            percent: percent(doc, &["progress_percent", "progress"]),
        };
        let progress = JobProgress::new(
            reported.completed.unwrap_or(0),
            reported.total.unwrap_or(ideas.len() as u32),
            reported.percent,
        );

        BulkJob {
            job_id,
            topic: text(doc, &["topic"]).unwrap_or_default(),
            category: text(doc, &["category"]).unwrap_or_else(|| "general".to_string()),
            status: text(doc, &["status"])
                .map(|s| JobStatus::parse(&s))
                .unwrap_or_else(|| JobStatus::Unknown(String::new())),
            total_articles: progress.total_articles,
            completed_articles: progress.completed_articles,
            progress_percent: progress.percent(),
            created_at: text(doc, &["created_at"]),
            updated_at: text(doc, &["updated_at"]),
            target_length: text(doc, &["target_length"]),
            content_type: text(doc, &["content_type"]),
            target_audience: text(doc, &["target_audience"]),
            brand_voice: text(doc, &["brand_voice"]),
            error: text(doc, &["error", "error_message"]),
            ideas,
            reported,
        }
    }

    pub fn progress(&self) -> JobProgress {
        JobProgress::new(
            self.completed_articles,
            self.total_articles,
            Some(self.progress_percent),
        )
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Set the article total locally, e.g. to the approved count after a review.
    pub fn set_total_articles(&mut self, total: u32) {
        self.reported.total = Some(total);
        self.apply_progress(JobProgress::new(
            self.completed_articles,
            total,
            self.reported.percent,
        ));
    }

    /// Start counting from zero against a new total (a freshly reviewed job).
    pub fn reset_progress(&mut self, total: u32) {
        self.reported = ReportedCounts {
            total: Some(total),
            completed: Some(0),
            percent: None,
        };
        self.apply_progress(JobProgress::new(0, total, None));
    }

    fn apply_progress(&mut self, progress: JobProgress) {
        self.total_articles = progress.total_articles;
        self.completed_articles = progress.completed_articles;
        self.progress_percent = progress.percent();
    }

    /// Fold a fresher snapshot of the same job into this one. Fields the snapshot
    /// leaves blank keep their current value; counts are clamped against the
    /// merged total.
    pub fn merge_from(&mut self, newer: &BulkJob) {
        debug_assert_eq!(self.job_id, newer.job_id);
        if !matches!(&newer.status, JobStatus::Unknown(s) if s.is_empty()) {
            self.status = newer.status.clone();
        }
        let total = match newer.reported.total {
            Some(total) => total,
            None if self.total_articles == 0 => newer.total_articles,
            None => self.total_articles,
        };
        let completed = newer
            .reported
            .completed
            .or(self.reported.completed)
            .unwrap_or(self.completed_articles);
        self.reported = ReportedCounts {
            total: newer.reported.total.or(self.reported.total),
            completed: newer.reported.completed.or(self.reported.completed),
            percent: newer.reported.percent,
        };
        self.apply_progress(JobProgress::new(completed, total, newer.reported.percent));
        if newer.updated_at.is_some() {
            self.updated_at = newer.updated_at.clone();
        }
        if newer.error.is_some() {
            self.error = newer.error.clone();
        }
        if !newer.ideas.is_empty() {
            self.ideas = newer.ideas.clone();
        }
    }
}
