//! `bulkgen show <job-id>` – print one job and its ideas.

use anyhow::Result;
use bulkgen_core::{BulkJob, BulkPipeline, JobId};

use super::display;

/// Read-only: fetches the job once without adopting it.
pub async fn run_show(pipeline: &BulkPipeline, job_id: &JobId, json: bool) -> Result<()> {
    let doc = pipeline.api().get_job(job_id).await?;
    let job = BulkJob::from_value_or(&doc, job_id);
    if json {
        println!("{}", serde_json::to_string_pretty(&job)?);
        return Ok(());
    }
    display::print_job(&job);
    if !job.ideas.is_empty() {
        println!("  ideas:");
        for (i, idea) in job.ideas.iter().enumerate() {
            println!("    {:>2}. {}", i + 1, idea.title);
        }
    }
    Ok(())
}
