//! Plain-text rendering shared by the commands.

use bulkgen_core::ideas::IdeaRoster;
use bulkgen_core::listing::JobListing;
use bulkgen_core::BulkJob;

pub(super) fn progress_line(job: &BulkJob) -> String {
    format!(
        "{:<14} {:>3}/{:<3} ({:.0}%)",
        job.status.as_str(),
        job.completed_articles,
        job.total_articles,
        job.progress_percent
    )
}

pub(super) fn print_job(job: &BulkJob) {
    println!("Job {}", job.job_id);
    println!("  topic:    {}", job.topic);
    println!("  category: {}", job.category);
    println!("  progress: {}", progress_line(job));
    if let Some(created) = &job.created_at {
        println!("  created:  {}", created);
    }
    if let Some(error) = &job.error {
        println!("  error:    {}", error);
    }
}

pub(super) fn print_roster(roster: &IdeaRoster) {
    for (i, entry) in roster.entries().iter().enumerate() {
        let mark = if entry.approved { "x" } else { " " };
        println!("  [{}] {:>2}. {}", mark, i + 1, entry.idea.title);
        let keywords = entry.idea.flattened_keywords();
        if !keywords.is_empty() {
            println!("          keywords: {}", keywords.join(", "));
        }
        if let Some(intent) = &entry.idea.search_intent {
            println!("          intent:   {}", intent);
        }
    }
}

pub(super) fn print_listing(listing: &JobListing) {
    if listing.is_empty() {
        println!("No jobs.");
        return;
    }
    if !listing.pending_review.is_empty() {
        println!("Awaiting review:");
        for job in &listing.pending_review {
            print_row(job);
        }
    }
    if !listing.others.is_empty() {
        if !listing.pending_review.is_empty() {
            println!();
        }
        println!("{:<26} {:<28} {}", "ID", "PROGRESS", "TOPIC");
        for job in &listing.others {
            print_row(job);
        }
    }
}

fn print_row(job: &BulkJob) {
    println!("{:<26} {:<28} {}", job.job_id.as_str(), progress_line(job), job.topic);
}
