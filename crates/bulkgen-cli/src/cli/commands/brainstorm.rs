//! `bulkgen brainstorm` – generate ideas for a topic and print them for review.

use anyhow::Result;
use bulkgen_core::pipeline::BrainstormRequest;
use bulkgen_core::BulkPipeline;

use super::display;

pub async fn run_brainstorm(pipeline: &mut BulkPipeline, request: BrainstormRequest) -> Result<()> {
    let job = pipeline.start_brainstorm(request).await?;
    let job_id = job.job_id.clone();
    println!(
        "Job {} ({}): {} idea(s) for \"{}\"",
        job_id,
        job.category,
        job.ideas.len(),
        job.topic
    );
    if let Some(roster) = pipeline.roster() {
        display::print_roster(roster);
    }
    println!();
    println!("Next: bulkgen review {} [--reject N,..] --generate", job_id);
    Ok(())
}
