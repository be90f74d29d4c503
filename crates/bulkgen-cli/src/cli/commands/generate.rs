//! `bulkgen generate <job-id>` – start generation for a reviewed job.

use anyhow::Result;
use bulkgen_core::{BulkPipeline, JobId};

use super::watch::follow;

pub async fn run_generate(pipeline: &mut BulkPipeline, job_id: &JobId, watch: bool) -> Result<()> {
    pipeline.open_job(job_id).await?;
    start_and_follow(pipeline, watch).await
}

/// Start generation for the active job, then follow it or return right away.
pub(super) async fn start_and_follow(pipeline: &mut BulkPipeline, watch: bool) -> Result<()> {
    pipeline.start_generation().await?;
    if let Some(job) = pipeline.active_job() {
        println!(
            "Generation started for job {} ({} article(s))",
            job.job_id, job.total_articles
        );
    }
    if watch {
        follow(pipeline).await?;
    } else {
        pipeline.stop_monitoring();
    }
    Ok(())
}
