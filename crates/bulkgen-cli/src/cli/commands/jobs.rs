//! `bulkgen jobs` – list jobs, those awaiting review first.

use anyhow::Result;
use bulkgen_core::listing::JobQuery;
use bulkgen_core::{BulkPipeline, JobStatus};

use super::display;

pub async fn run_jobs(
    pipeline: &mut BulkPipeline,
    status: Option<&str>,
    skip: u32,
    limit: u32,
    json: bool,
) -> Result<()> {
    let query = JobQuery {
        status_filter: status.map(JobStatus::parse),
        skip,
        limit,
    };
    let listing = pipeline.list_jobs(&query).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&listing)?);
    } else {
        display::print_listing(&listing);
    }
    Ok(())
}
