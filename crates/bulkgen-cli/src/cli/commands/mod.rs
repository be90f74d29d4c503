//! CLI command handlers. Each command is in its own file.

mod brainstorm;
mod direct;
mod display;
mod generate;
mod jobs;
mod remove;
mod review;
mod show;
mod watch;

pub use brainstorm::run_brainstorm;
pub use direct::run_direct;
pub use generate::run_generate;
pub use jobs::run_jobs;
pub use remove::{run_cancel, run_delete};
pub use review::{run_review, ReviewEdits};
pub use show::run_show;
pub use watch::run_watch;
