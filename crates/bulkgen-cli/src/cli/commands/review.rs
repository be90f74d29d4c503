//! `bulkgen review <job-id>` – approve/reject ideas and submit the review.

use anyhow::{anyhow, bail, Context, Result};
use bulkgen_core::ideas::IdeaRoster;
use bulkgen_core::{BulkPipeline, JobId, Phase};

use super::display;
use super::generate::start_and_follow;

/// Roster edits from the command line. Positions are 1-based as printed.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ReviewEdits {
    pub reject: Vec<usize>,
    pub titles: Vec<(usize, String)>,
    pub guidance: Vec<(usize, String)>,
}

impl ReviewEdits {
    pub fn parse(reject: &[usize], titles: &[String], guidance: &[String]) -> Result<Self> {
        if let Some(zero) = reject.iter().find(|&&n| n == 0) {
            bail!("idea positions start at 1, got {}", zero);
        }
        Ok(Self {
            reject: reject.to_vec(),
            titles: titles
                .iter()
                .map(|s| parse_assignment(s))
                .collect::<Result<_>>()
                .context("--title")?,
            guidance: guidance
                .iter()
                .map(|s| parse_assignment(s))
                .collect::<Result<_>>()
                .context("--guidance")?,
        })
    }

    fn apply(&self, roster: &mut IdeaRoster) -> Result<()> {
        for &n in &self.reject {
            roster.toggle(n - 1, false)?;
        }
        for (n, title) in &self.titles {
            roster.set_title(n - 1, title.clone())?;
        }
        for (n, text) in &self.guidance {
            roster.set_custom_guidance(n - 1, Some(text.clone()))?;
        }
        Ok(())
    }
}

/// `N=TEXT` with N ≥ 1.
fn parse_assignment(s: &str) -> Result<(usize, String)> {
    let (n, text) = s
        .split_once('=')
        .ok_or_else(|| anyhow!("expected N=TEXT, got {:?}", s))?;
    let n: usize = n
        .trim()
        .parse()
        .with_context(|| format!("invalid idea position {:?}", n.trim()))?;
    if n == 0 {
        bail!("idea positions start at 1");
    }
    Ok((n, text.to_string()))
}

pub async fn run_review(
    pipeline: &mut BulkPipeline,
    job_id: &JobId,
    edits: &ReviewEdits,
    generate: bool,
    watch: bool,
) -> Result<()> {
    pipeline.open_job(job_id).await?;
    if pipeline.phase() != Phase::Brainstormed {
        bail!(
            "job {} is {}, there is nothing to review",
            job_id,
            pipeline.phase()
        );
    }
    let roster = pipeline
        .roster_mut()
        .ok_or_else(|| anyhow!("job {} has no ideas to review yet", job_id))?;
    edits.apply(roster)?;
    display::print_roster(roster);

    let submission = pipeline.submit_review().await?;
    println!(
        "Review submitted: {} approved, {} rejected",
        submission.approved_ideas.len(),
        submission.rejected_idea_ids.len()
    );

    if generate {
        start_and_follow(pipeline, watch).await?;
    } else {
        println!("Next: bulkgen generate {}", job_id);
    }
    Ok(())
}
