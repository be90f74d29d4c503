//! Article ideas produced by a brainstorm and the local review roster.
//!
//! Brainstorm and job-detail responses expose their ideas under different keys;
//! [`normalize`] turns any of them into one ordered list. The [`IdeaRoster`] then
//! tracks approve/reject and edits locally until the review is submitted.

mod normalize;
mod roster;

pub use normalize::{normalize, normalize_embedded};
pub use roster::{build_review_submission, ApprovedIdea, IdeaRoster, ReviewSubmission, RosterEntry};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Search intent of an idea. Labels the server invents are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SearchIntent {
    Informational,
    Commercial,
    Navigational,
    Transactional,
    Other(String),
}

impl From<String> for SearchIntent {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "informational" => SearchIntent::Informational,
            "commercial" => SearchIntent::Commercial,
            "navigational" => SearchIntent::Navigational,
            "transactional" => SearchIntent::Transactional,
            _ => SearchIntent::Other(s),
        }
    }
}

impl From<SearchIntent> for String {
    fn from(i: SearchIntent) -> Self {
        i.to_string()
    }
}

impl fmt::Display for SearchIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchIntent::Informational => f.write_str("informational"),
            SearchIntent::Commercial => f.write_str("commercial"),
            SearchIntent::Navigational => f.write_str("navigational"),
            SearchIntent::Transactional => f.write_str("transactional"),
            SearchIntent::Other(s) => f.write_str(s),
        }
    }
}

/// One candidate article within a job.
///
/// Deserialization never rejects an entry over one badly typed field: numbers
/// are read as text and anything else unusable is left empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleIdea {
    /// Filled in by [`normalize`]: the server's id, or the zero-based position.
    #[serde(skip_deserializing)]
    pub idea_id: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub title: String,
    #[serde(default, alias = "primaryKeyword", deserialize_with = "loose_string")]
    pub primary_keyword: String,
    #[serde(default, alias = "secondaryKeywords", deserialize_with = "string_or_list")]
    pub secondary_keywords: Vec<String>,
    #[serde(default, alias = "longTailKeywords", deserialize_with = "string_or_list")]
    pub long_tail_keywords: Vec<String>,
    #[serde(default, alias = "clusterRole", deserialize_with = "loose_text")]
    pub cluster_role: Option<String>,
    #[serde(default, alias = "searchIntent", deserialize_with = "loose_intent")]
    pub search_intent: Option<SearchIntent>,
    #[serde(default, alias = "funnelStage", deserialize_with = "loose_text")]
    pub funnel_stage: Option<String>,
    #[serde(default, alias = "contentType", deserialize_with = "loose_text")]
    pub content_type: Option<String>,
    #[serde(default, alias = "targetAudience", deserialize_with = "loose_text")]
    pub target_audience: Option<String>,
    #[serde(default, alias = "brandVoice", deserialize_with = "loose_text")]
    pub brand_voice: Option<String>,
    #[serde(default, alias = "contentStrategy", deserialize_with = "loose_text")]
    pub content_strategy: Option<String>,
    /// Generation guidance written by the server (not the operator's custom guidance).
    #[serde(default, deserialize_with = "loose_text")]
    pub guidance: Option<String>,
}

impl ArticleIdea {
    /// Primary, secondary and long-tail keywords in that order, blanks dropped.
    pub fn flattened_keywords(&self) -> Vec<String> {
        std::iter::once(&self.primary_keyword)
            .chain(&self.secondary_keywords)
            .chain(&self.long_tail_keywords)
            .filter(|k| !k.trim().is_empty())
            .cloned()
            .collect()
    }
}

/// Text of a scalar JSON value; numbers and booleans are printed.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn loose_text<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(d)?.as_ref().and_then(scalar_text))
}

fn loose_string<'de, D>(d: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(loose_text(d)?.unwrap_or_default())
}

fn loose_intent<'de, D>(d: D) -> Result<Option<SearchIntent>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(loose_text(d)?
        .filter(|s| !s.trim().is_empty())
        .map(SearchIntent::from))
}

/// Keyword lists sometimes arrive as one comma-separated string. Entries that
/// are not text or numbers are dropped.
fn string_or_list<'de, D>(d: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::Array(items)) => items.iter().filter_map(scalar_text).collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect(),
        Some(other) => scalar_text(&other).into_iter().collect(),
        None => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_snake_and_camel_case() {
        let idea: ArticleIdea = serde_json::from_value(json!({
            "title": "Pour-over basics",
            "primaryKeyword": "pour over coffee",
            "secondary_keywords": ["v60", "chemex"],
            "longTailKeywords": "best pour over kettle, pour over ratio",
            "search_intent": "Informational",
            "funnel_stage": null
        }))
        .unwrap();
        assert_eq!(idea.primary_keyword, "pour over coffee");
        assert_eq!(idea.secondary_keywords, vec!["v60", "chemex"]);
        assert_eq!(
            idea.long_tail_keywords,
            vec!["best pour over kettle", "pour over ratio"]
        );
        assert_eq!(idea.search_intent, Some(SearchIntent::Informational));
        assert!(idea.funnel_stage.is_none());
    }

    #[test]
    fn null_title_and_unknown_intent() {
        let idea: ArticleIdea = serde_json::from_value(json!({
            "title": null,
            "search_intent": "local"
        }))
        .unwrap();
        assert_eq!(idea.title, "");
        assert_eq!(idea.search_intent, Some(SearchIntent::Other("local".into())));
    }

    #[test]
    fn flattened_keywords_keep_order_and_drop_blanks() {
        let idea = ArticleIdea {
            primary_keyword: "espresso".into(),
            secondary_keywords: vec!["".into(), "crema".into(), "espresso".into()],
            long_tail_keywords: vec!["  ".into(), "espresso at home".into()],
            ..Default::default()
        };
        assert_eq!(
            idea.flattened_keywords(),
            vec!["espresso", "crema", "espresso", "espresso at home"]
        );
    }

    #[test]
    fn mistyped_fields_are_coerced_or_ignored() {
        let idea: ArticleIdea = serde_json::from_value(json!({
            "title": 2026,
            "secondary_keywords": ["ratio", 3, {"k": "v"}, null],
            "cluster_role": 1,
            "searchIntent": ["informational"],
            "brand_voice": {"tone": "warm"},
            "longTailKeywords": 42
        }))
        .unwrap();
        assert_eq!(idea.title, "2026");
        assert_eq!(idea.secondary_keywords, vec!["ratio", "3"]);
        assert_eq!(idea.cluster_role.as_deref(), Some("1"));
        assert!(idea.search_intent.is_none());
        assert!(idea.brand_voice.is_none());
        assert_eq!(idea.long_tail_keywords, vec!["42"]);
    }
}
