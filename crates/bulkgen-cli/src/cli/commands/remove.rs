//! `bulkgen cancel <id>` / `bulkgen delete <id>` – mutate a job on the server.
//! Both refuse to act without `--yes`.

use anyhow::{bail, Result};
use bulkgen_core::listing::JobListing;
use bulkgen_core::{BulkPipeline, JobId};

use super::display;

pub async fn run_cancel(pipeline: &mut BulkPipeline, job_id: &JobId, yes: bool) -> Result<()> {
    if !yes {
        bail!("refusing to cancel job {} without --yes", job_id);
    }
    let listing = pipeline.cancel_job(job_id).await?;
    println!("Cancelled job {}", job_id);
    print_refreshed(listing.as_ref());
    Ok(())
}

pub async fn run_delete(pipeline: &mut BulkPipeline, job_id: &JobId, yes: bool) -> Result<()> {
    if !yes {
        bail!("refusing to delete job {} without --yes", job_id);
    }
    let listing = pipeline.delete_job(job_id).await?;
    println!("Deleted job {}", job_id);
    print_refreshed(listing.as_ref());
    Ok(())
}

fn print_refreshed(listing: Option<&JobListing>) {
    match listing {
        Some(listing) => display::print_listing(listing),
        None => eprintln!("Could not reload the job list; run `bulkgen jobs` to retry."),
    }
}
