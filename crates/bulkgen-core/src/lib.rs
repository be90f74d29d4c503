pub mod api;
pub mod config;
pub mod error;
pub mod identity;
pub mod ideas;
pub mod job;
pub mod listing;
pub mod logging;
pub mod pipeline;
pub mod poller;
pub mod retry;

pub use error::BulkError;
pub use identity::JobId;
pub use job::{BulkJob, JobStatus};
pub use pipeline::{BulkPipeline, Phase};
