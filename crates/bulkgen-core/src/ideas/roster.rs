//! Local review roster: approve/reject and edit ideas, then build the submission.

use serde::Serialize;

use super::ArticleIdea;
use crate::error::BulkError;

/// One roster row. `approved` and `custom_guidance` live only on the client until
/// the review is submitted.
#[derive(Debug, Clone, PartialEq)]
pub struct RosterEntry {
    pub idea: ArticleIdea,
    pub approved: bool,
    pub custom_guidance: Option<String>,
}

/// Editable, ordered set of ideas for one job.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdeaRoster {
    entries: Vec<RosterEntry>,
}

impl IdeaRoster {
    /// Every idea starts approved.
    pub fn new(ideas: Vec<ArticleIdea>) -> Self {
        Self {
            entries: ideas
                .into_iter()
                .map(|idea| RosterEntry {
                    idea,
                    approved: true,
                    custom_guidance: None,
                })
                .collect(),
        }
    }

    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn approved_count(&self) -> usize {
        self.entries.iter().filter(|e| e.approved).count()
    }

    /// Zero-based index of the idea with this id.
    pub fn position_of(&self, idea_id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.idea.idea_id == idea_id)
    }

    fn entry_mut(&mut self, index: usize) -> Result<&mut RosterEntry, BulkError> {
        self.entries
            .get_mut(index)
            .ok_or(BulkError::UnknownIdea(index))
    }

    /// Set the approval flag of the idea at `index`.
    pub fn toggle(&mut self, index: usize, approved: bool) -> Result<(), BulkError> {
        self.entry_mut(index)?.approved = approved;
        Ok(())
    }

    pub fn set_title(&mut self, index: usize, title: impl Into<String>) -> Result<(), BulkError> {
        self.entry_mut(index)?.idea.title = title.into();
        Ok(())
    }

    /// Operator guidance sent with the approval; blank clears it.
    pub fn set_custom_guidance(
        &mut self,
        index: usize,
        guidance: Option<String>,
    ) -> Result<(), BulkError> {
        self.entry_mut(index)?.custom_guidance =
            guidance.filter(|g| !g.trim().is_empty());
        Ok(())
    }
}

/// One approved idea as sent to `PUT /bulk/review/{job_id}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApprovedIdea {
    pub idea_id: String,
    pub title: String,
    pub keywords: Vec<String>,
    pub guidance: Option<String>,
}

/// Review body: approved ideas plus the ids of rejected ones.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewSubmission {
    pub approved_ideas: Vec<ApprovedIdea>,
    pub rejected_idea_ids: Vec<String>,
}

/// Partition the roster into the review submission.
///
/// Fails with `NoIdeasApproved` when nothing is approved and with `EmptyIdeaTitle`
/// when an approved idea has a blank title.
pub fn build_review_submission(roster: &IdeaRoster) -> Result<ReviewSubmission, BulkError> {
    let mut approved_ideas = Vec::new();
    let mut rejected_idea_ids = Vec::new();

    for entry in roster.entries() {
        if !entry.approved {
            rejected_idea_ids.push(entry.idea.idea_id.clone());
            continue;
        }
        let title = entry.idea.title.trim();
        if title.is_empty() {
            return Err(BulkError::EmptyIdeaTitle {
                idea_id: entry.idea.idea_id.clone(),
            });
        }
        approved_ideas.push(ApprovedIdea {
            idea_id: entry.idea.idea_id.clone(),
            title: title.to_string(),
            keywords: entry.idea.flattened_keywords(),
            guidance: entry
                .custom_guidance
                .as_deref()
                .map(str::trim)
                .filter(|g| !g.is_empty())
                .map(str::to_string),
        });
    }

    if approved_ideas.is_empty() {
        return Err(BulkError::NoIdeasApproved);
    }
    Ok(ReviewSubmission {
        approved_ideas,
        rejected_idea_ids,
    })
}
