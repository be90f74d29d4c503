//! Idea payload normalization.

use serde_json::Value;

use super::{scalar_text, ArticleIdea};
use crate::error::BulkError;
use crate::identity::id_field;

/// Where ideas may live in a response, checked in order.
const IDEA_PATHS: [&[&str]; 3] = [&["article_ideas"], &["ideas"], &["data", "article_ideas"]];

/// Keys an idea may use for its own identifier.
const IDEA_ID_KEYS: [&str; 3] = ["idea_id", "id", "_id"];

fn lookup<'a>(payload: &'a Value, path: &[&str]) -> Option<&'a Vec<Value>> {
    path.iter()
        .try_fold(payload, |node, key| node.get(key))?
        .as_array()
}

/// Normalize a brainstorm or job payload into an ordered idea list.
///
/// The first non-empty list among `article_ideas`, `ideas` and
/// `data.article_ideas` wins. Fails with `NoIdeasFound` when none has entries.
pub fn normalize(payload: &Value) -> Result<Vec<ArticleIdea>, BulkError> {
    let items = IDEA_PATHS
        .iter()
        .filter_map(|path| lookup(payload, path))
        .find(|items| !items.is_empty())
        .ok_or(BulkError::NoIdeasFound)?;

    Ok(items
        .iter()
        .enumerate()
        .map(|(index, item)| parse_idea(index, item))
        .collect())
}

/// Like [`normalize`] for documents where ideas are optional (job detail, listings).
pub fn normalize_embedded(payload: &Value) -> Vec<ArticleIdea> {
    normalize(payload).unwrap_or_default()
}

/// Every entry yields an idea so the review covers the job's full idea set.
fn parse_idea(index: usize, item: &Value) -> ArticleIdea {
    let mut idea = match item {
        Value::Object(_) => serde_json::from_value::<ArticleIdea>(item.clone())
            .unwrap_or_else(|e| {
                tracing::warn!(index, "idea fields unreadable, keeping title only: {}", e);
                ArticleIdea {
                    title: item.get("title").and_then(scalar_text).unwrap_or_default(),
                    ..Default::default()
                }
            }),
        other => {
            if !other.is_string() {
                tracing::warn!(index, "idea is not an object: {}", other);
            }
            ArticleIdea {
                title: scalar_text(other).unwrap_or_default(),
                ..Default::default()
            }
        }
    };
    if idea.title.trim().is_empty() {
        idea.title = format!("Untitled idea {}", index + 1);
    }
    idea.idea_id = IDEA_ID_KEYS
        .iter()
        .find_map(|key| id_field(item, key))
        .unwrap_or_else(|| index.to_string());
    idea
}
