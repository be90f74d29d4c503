//! Caller-facing request types, validated before anything is sent.

use crate::api::{BrainstormPayload, DirectPayload};
use crate::error::BulkError;

/// Category used when the caller does not pick one.
pub const DEFAULT_CATEGORY: &str = "general";

/// Free-form content hints echoed back on the job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentParams {
    pub target_length: Option<String>,
    pub content_type: Option<String>,
    pub target_audience: Option<String>,
    pub brand_voice: Option<String>,
    pub competitor_insights: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrainstormRequest {
    pub topic: String,
    pub category: Option<String>,
    pub article_count: u32,
    pub content: ContentParams,
}

/// Generate straight away, skipping brainstorm and review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectRequest {
    pub topic: String,
    pub category: Option<String>,
    pub article_count: u32,
}

impl BrainstormRequest {
    pub fn new(topic: impl Into<String>, article_count: u32) -> Self {
        Self {
            topic: topic.into(),
            category: None,
            article_count,
            content: ContentParams::default(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_content(mut self, content: ContentParams) -> Self {
        self.content = content;
        self
    }

    pub(crate) fn to_payload(&self) -> Result<BrainstormPayload, BulkError> {
        Ok(BrainstormPayload {
            topic: checked_topic(&self.topic)?,
            category: category_or_default(self.category.as_deref()),
            num_articles: checked_count(self.article_count)?,
            target_length: non_blank(&self.content.target_length),
            content_type: non_blank(&self.content.content_type),
            target_audience: non_blank(&self.content.target_audience),
            brand_voice: non_blank(&self.content.brand_voice),
            competitor_insights: non_blank(&self.content.competitor_insights),
        })
    }
}

impl DirectRequest {
    pub fn new(topic: impl Into<String>, article_count: u32) -> Self {
        Self {
            topic: topic.into(),
            category: None,
            article_count,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub(crate) fn to_payload(&self) -> Result<DirectPayload, BulkError> {
        Ok(DirectPayload {
            topic: checked_topic(&self.topic)?,
            category: category_or_default(self.category.as_deref()),
            num_articles: checked_count(self.article_count)?,
        })
    }
}

fn checked_topic(topic: &str) -> Result<String, BulkError> {
    let topic = topic.trim();
    if topic.is_empty() {
        return Err(BulkError::InvalidRequest("topic must not be empty".to_string()));
    }
    Ok(topic.to_string())
}

fn checked_count(count: u32) -> Result<u32, BulkError> {
    if count == 0 {
        return Err(BulkError::InvalidRequest(
            "article count must be at least 1".to_string(),
        ));
    }
    Ok(count)
}

fn category_or_default(category: Option<&str>) -> String {
    category
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_CATEGORY)
        .to_string()
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
