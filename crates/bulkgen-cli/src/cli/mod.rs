//! CLI for the bulk article-generation pipeline.

mod commands;

use anyhow::Result;
use bulkgen_core::{config, logging};
use bulkgen_core::pipeline::{BrainstormRequest, ContentParams, DirectRequest};
use bulkgen_core::BulkPipeline;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::{
    run_brainstorm, run_cancel, run_delete, run_direct, run_generate, run_jobs, run_review,
    run_show, run_watch, ReviewEdits,
};

/// Top-level CLI for bulkgen.
#[derive(Debug, Parser)]
#[command(name = "bulkgen")]
#[command(about = "bulkgen: brainstorm, review and generate article batches", long_about = None)]
pub struct Cli {
    /// Config file to use instead of ~/.config/bulkgen/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Brainstorm article ideas for a topic and print them for review.
    Brainstorm {
        #[arg(long)]
        topic: String,
        /// Number of articles to plan.
        #[arg(long, value_name = "N")]
        count: u32,
        /// Category slug (default: general).
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        target_length: Option<String>,
        #[arg(long)]
        content_type: Option<String>,
        #[arg(long)]
        audience: Option<String>,
        #[arg(long)]
        brand_voice: Option<String>,
        #[arg(long)]
        competitor_insights: Option<String>,
    },

    /// Review a brainstormed job: everything is approved unless rejected.
    Review {
        job_id: String,
        /// Idea positions to reject (1-based, comma separated).
        #[arg(long, value_delimiter = ',', value_name = "N")]
        reject: Vec<usize>,
        /// Replace an idea's title.
        #[arg(long = "title", value_name = "N=TEXT")]
        titles: Vec<String>,
        /// Extra guidance for an idea's writer.
        #[arg(long = "guidance", value_name = "N=TEXT")]
        guidance: Vec<String>,
        /// Start generation right after the review is accepted.
        #[arg(long)]
        generate: bool,
        /// With --generate, return instead of following progress.
        #[arg(long)]
        no_watch: bool,
    },

    /// Start generation for a reviewed job.
    Generate {
        job_id: String,
        /// Return instead of following progress.
        #[arg(long)]
        no_watch: bool,
    },

    /// Generate articles directly, skipping brainstorm and review.
    Direct {
        #[arg(long)]
        topic: String,
        #[arg(long, value_name = "N")]
        count: u32,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        no_watch: bool,
    },

    /// List jobs, those awaiting review first.
    Jobs {
        /// Only jobs with this status (e.g. pending_review, completed).
        #[arg(long)]
        status: Option<String>,
        #[arg(long, default_value = "0", value_name = "N")]
        skip: u32,
        /// Page size (default from config, at most 100).
        #[arg(long, value_name = "N")]
        limit: Option<u32>,
        /// Print the listing as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show one job with its ideas.
    Show {
        job_id: String,
        /// Print the normalized job as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Follow a job's progress until it finishes.
    Watch { job_id: String },

    /// Cancel a job on the server.
    Cancel {
        job_id: String,
        /// Confirm the cancellation.
        #[arg(long)]
        yes: bool,
    },

    /// Delete a job on the server.
    Delete {
        job_id: String,
        /// Confirm the deletion.
        #[arg(long)]
        yes: bool,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let mut cfg = match &cli.config {
            Some(path) => config::load_or_init_at(path)?,
            None => config::load_or_init()?,
        };
        cfg.apply_env();
        tracing::debug!(
            base_url = %logging::redact_url(&cfg.base_url),
            user = %cfg.credentials.username,
            "loaded config"
        );
        let mut pipeline = BulkPipeline::from_config(&cfg)?;

        match cli.command {
            CliCommand::Brainstorm {
                topic,
                count,
                category,
                target_length,
                content_type,
                audience,
                brand_voice,
                competitor_insights,
            } => {
                let request = BrainstormRequest {
                    topic,
                    category,
                    article_count: count,
                    content: ContentParams {
                        target_length,
                        content_type,
                        target_audience: audience,
                        brand_voice,
                        competitor_insights,
                    },
                };
                run_brainstorm(&mut pipeline, request).await?
            }
            CliCommand::Review {
                job_id,
                reject,
                titles,
                guidance,
                generate,
                no_watch,
            } => {
                let edits = ReviewEdits::parse(&reject, &titles, &guidance)?;
                run_review(&mut pipeline, &job_id.into(), &edits, generate, !no_watch).await?
            }
            CliCommand::Generate { job_id, no_watch } => {
                run_generate(&mut pipeline, &job_id.into(), !no_watch).await?
            }
            CliCommand::Direct {
                topic,
                count,
                category,
                no_watch,
            } => {
                let request = DirectRequest {
                    topic,
                    category,
                    article_count: count,
                };
                run_direct(&mut pipeline, request, !no_watch).await?
            }
            CliCommand::Jobs {
                status,
                skip,
                limit,
                json,
            } => {
                let limit = limit.unwrap_or(cfg.list_page_size);
                run_jobs(&mut pipeline, status.as_deref(), skip, limit, json).await?
            }
            CliCommand::Show { job_id, json } => run_show(&pipeline, &job_id.into(), json).await?,
            CliCommand::Watch { job_id } => run_watch(&mut pipeline, &job_id.into()).await?,
            CliCommand::Cancel { job_id, yes } => {
                run_cancel(&mut pipeline, &job_id.into(), yes).await?
            }
            CliCommand::Delete { job_id, yes } => {
                run_delete(&mut pipeline, &job_id.into(), yes).await?
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
