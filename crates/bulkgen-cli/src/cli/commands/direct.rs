//! `bulkgen direct` – generate articles without brainstorm or review.

use anyhow::Result;
use bulkgen_core::pipeline::DirectRequest;
use bulkgen_core::BulkPipeline;

use super::watch::follow;

pub async fn run_direct(pipeline: &mut BulkPipeline, request: DirectRequest, watch: bool) -> Result<()> {
    let job = pipeline.start_direct(request).await?;
    println!(
        "Job {} started: {} article(s) on \"{}\"",
        job.job_id, job.total_articles, job.topic
    );
    if watch {
        follow(pipeline).await?;
    } else {
        pipeline.stop_monitoring();
    }
    Ok(())
}
