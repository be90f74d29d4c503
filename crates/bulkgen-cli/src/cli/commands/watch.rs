//! `bulkgen watch <job-id>` – follow a job's progress until it finishes.

use anyhow::{bail, Result};
use bulkgen_core::{BulkPipeline, JobId, JobStatus};

use super::display;

pub async fn run_watch(pipeline: &mut BulkPipeline, job_id: &JobId) -> Result<()> {
    let job = pipeline.open_job(job_id).await?;
    let line = display::progress_line(job);
    if !pipeline.is_monitoring() {
        // Finished, or not generating yet.
        println!("{}", line);
        return Ok(());
    }
    follow(pipeline).await
}

/// Print each progress snapshot of the active job until it reaches a terminal status.
/// Fails when the job ends as failed.
pub(super) async fn follow(pipeline: &mut BulkPipeline) -> Result<()> {
    let mut last = None;
    while let Some(job) = pipeline.next_update().await {
        let line = display::progress_line(&job);
        if last.as_ref() != Some(&line) {
            println!("{}", line);
            last = Some(line);
        }
        if job.is_terminal() {
            match job.status {
                JobStatus::Failed => match job.error {
                    Some(reason) => bail!("job {} failed: {}", job.job_id, reason),
                    None => bail!("job {} failed", job.job_id),
                },
                JobStatus::Cancelled => println!("Job {} was cancelled.", job.job_id),
                _ => println!(
                    "Job {} finished: {} article(s) generated.",
                    job.job_id, job.completed_articles
                ),
            }
            break;
        }
    }
    Ok(())
}
