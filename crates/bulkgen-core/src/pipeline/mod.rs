//! Bulk job state machine.
//!
//! [`BulkPipeline`] owns the active job and is the only thing that replaces it.
//! Every operation checks its preconditions first (no network call on failure),
//! then talks to the server, and only then moves the phase forward. A failed call
//! leaves phase, job and roster as they were.
//!
//! Generation progress arrives from a [`crate::poller`] monitor over a channel.
//! Each update carries the epoch of the active job it was started for, and
//! [`BulkPipeline::next_update`] drops anything that no longer matches.

mod phase;
mod request;


pub use phase::Phase;
pub use request::{BrainstormRequest, ContentParams, DirectRequest, DEFAULT_CATEGORY};

use std::collections::HashMap;

use tokio::sync::mpsc;

use crate::api::{ApiClient, ApiError};
use crate::config::BulkgenConfig;
use crate::error::BulkError;
use crate::identity::JobId;
use crate::ideas::{self, build_review_submission, IdeaRoster, ReviewSubmission};
use crate::job::{BulkJob, JobStatus};
use crate::listing::{self, JobListing, JobQuery};
use crate::poller::{self, MonitorHandle, PollIntervals};
use crate::retry::{run_with_retry, RetryPolicy};

/// The job the pipeline is working on.
#[derive(Debug, Clone)]
struct ActiveJob {
    job: BulkJob,
    phase: Phase,
    /// Present only between brainstorm and a successful review.
    roster: Option<IdeaRoster>,
    epoch: u64,
}

#[derive(Debug)]
struct PollUpdate {
    epoch: u64,
    job: BulkJob,
}

/// Running monitor plus the receiving end of its update channel.
struct Watch {
    handle: MonitorHandle,
    epoch: u64,
    updates: mpsc::UnboundedReceiver<PollUpdate>,
}

pub struct BulkPipeline {
    api: ApiClient,
    intervals: PollIntervals,
    retry: RetryPolicy,
    active: Option<ActiveJob>,
    watch: Option<Watch>,
    /// Terminal statuses observed for any job, from polls, opens or listings.
    terminal: HashMap<JobId, JobStatus>,
    /// Listing refreshed after cancel/delete.
    listing_query: JobQuery,
    epoch: u64,
}

impl std::fmt::Debug for BulkPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BulkPipeline")
            .field("api", &self.api)
            .field("phase", &self.phase())
            .field("active", &self.active.as_ref().map(|a| &a.job.job_id))
            .field("monitoring", &self.is_monitoring())
            .finish_non_exhaustive()
    }
}

impl BulkPipeline {
    pub fn new(api: ApiClient, intervals: PollIntervals, retry: RetryPolicy) -> Self {
        Self {
            api,
            intervals,
            retry,
            active: None,
            watch: None,
            terminal: HashMap::new(),
            listing_query: JobQuery::default(),
            epoch: 0,
        }
    }

    /// Pipeline over libcurl with intervals, retry policy and page size from config.
    pub fn from_config(cfg: &BulkgenConfig) -> Result<Self, ApiError> {
        let mut pipeline = Self::new(
            ApiClient::new(cfg)?,
            cfg.poll_intervals(),
            cfg.retry_policy(),
        );
        pipeline.listing_query = JobQuery::with_limit(cfg.list_page_size);
        Ok(pipeline)
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn set_listing_query(&mut self, query: JobQuery) {
        self.listing_query = query;
    }

    pub fn active_job(&self) -> Option<&BulkJob> {
        self.active.as_ref().map(|a| &a.job)
    }

    /// `New` when there is no active job.
    pub fn phase(&self) -> Phase {
        self.active.as_ref().map_or(Phase::New, |a| a.phase)
    }

    pub fn roster(&self) -> Option<&IdeaRoster> {
        self.active.as_ref().and_then(|a| a.roster.as_ref())
    }

    /// Local edits (approve/reject, titles, guidance) before the review is sent.
    pub fn roster_mut(&mut self) -> Option<&mut IdeaRoster> {
        self.active.as_mut().and_then(|a| a.roster.as_mut())
    }

    pub fn is_monitoring(&self) -> bool {
        self.watch.is_some()
    }

    /// Terminal status observed for `job_id`, if any.
    pub fn observed_terminal(&self, job_id: &JobId) -> Option<&JobStatus> {
        self.terminal.get(job_id)
    }

    /// Ask the server for ideas and make the new job active.
    pub async fn start_brainstorm(&mut self, request: BrainstormRequest) -> Result<&BulkJob, BulkError> {
        let payload = request.to_payload()?;
        tracing::info!(
            topic = %payload.topic,
            category = %payload.category,
            articles = payload.num_articles,
            "starting brainstorm"
        );

        let api = &self.api;
        let payload_ref = &payload;
        let doc = run_with_retry(&self.retry, "brainstorm", move || api.brainstorm(payload_ref))
            .await
            .map_err(BulkError::BrainstormFailed)?;

        let mut job = BulkJob::from_value(&doc)?;
        let ideas = ideas::normalize(&doc).map_err(|e| match e {
            BulkError::NoIdeasFound => BulkError::NoIdeasGenerated,
            other => other,
        })?;
        if matches!(&job.status, JobStatus::Unknown(s) if s.is_empty()) {
            job.status = JobStatus::PendingReview;
        }
        if job.topic.is_empty() {
            job.topic = payload.topic.clone();
        }
        if job.total_articles == 0 {
            job.set_total_articles(ideas.len() as u32);
        }
        job.ideas = ideas.clone();

        tracing::info!(job_id = %job.job_id, ideas = ideas.len(), "brainstorm finished");
        let roster = IdeaRoster::new(ideas);
        Ok(&self.install(job, Phase::Brainstormed, Some(roster)).job)
    }

    /// Send the approved/rejected partition of the roster.
    pub async fn submit_review(&mut self) -> Result<ReviewSubmission, BulkError> {
        let active = self.mutable_active()?;
        if active.phase != Phase::Brainstormed {
            return Err(BulkError::InvalidTransition {
                operation: "submit a review",
                phase: active.phase,
            });
        }
        let roster = active.roster.as_ref().ok_or(BulkError::NoIdeasFound)?;
        let submission = build_review_submission(roster)?;
        let job_id = active.job.job_id.clone();
        let epoch = active.epoch;

        self.api
            .submit_review(&job_id, &submission)
            .await
            .map_err(BulkError::ReviewSubmissionFailed)?;

        let approved = submission.approved_ideas.len();
        if let Some(active) = self.current_mut(epoch) {
            active.phase = Phase::ReviewSubmitted;
            active.roster = None;
            active.job.status = JobStatus::Reviewed;
            active.job.reset_progress(approved as u32);
        }
        tracing::info!(
            job_id = %job_id,
            approved,
            rejected = submission.rejected_idea_ids.len(),
            "review submitted"
        );
        Ok(submission)
    }

    /// Kick off article generation and start monitoring progress.
    pub async fn start_generation(&mut self) -> Result<(), BulkError> {
        let active = self.mutable_active()?;
        if active.phase != Phase::ReviewSubmitted {
            return Err(BulkError::InvalidTransition {
                operation: "start generation",
                phase: active.phase,
            });
        }
        let job_id = active.job.job_id.clone();
        let epoch = active.epoch;

        self.api
            .start_generation(&job_id)
            .await
            .map_err(BulkError::GenerationStartFailed)?;

        if let Some(active) = self.current_mut(epoch) {
            active.phase = Phase::Generating;
            active.job.status = JobStatus::Generating;
        }
        tracing::info!(job_id = %job_id, "generation started");
        self.start_monitor();
        Ok(())
    }

    /// Create a job that goes straight to generation.
    pub async fn start_direct(&mut self, request: DirectRequest) -> Result<&BulkJob, BulkError> {
        let payload = request.to_payload()?;
        tracing::info!(topic = %payload.topic, articles = payload.num_articles, "starting direct generation");
        let doc = self
            .api
            .direct_generation(&payload)
            .await
            .map_err(BulkError::GenerationStartFailed)?;

        let mut job = BulkJob::from_value(&doc)?;
        if matches!(&job.status, JobStatus::Unknown(s) if s.is_empty()) {
            job.status = JobStatus::Generating;
        }
        if job.topic.is_empty() {
            job.topic = payload.topic.clone();
        }
        if job.total_articles == 0 {
            job.set_total_articles(payload.num_articles);
        }
        let phase = Phase::from_status(&job.status);
        self.note_status(&job);
        self.install(job, phase, None);
        if phase == Phase::Generating {
            self.start_monitor();
        }
        self.require_active().map(|a| &a.job)
    }

    /// Adopt an existing server job as the active one, in the phase its status implies.
    /// Jobs still generating get a monitor.
    pub async fn open_job(&mut self, job_id: &JobId) -> Result<&BulkJob, BulkError> {
        let doc = self
            .api
            .get_job(job_id)
            .await
            .map_err(|source| BulkError::JobOperationFailed {
                operation: "open",
                job_id: job_id.clone(),
                source,
            })?;
        let job = BulkJob::from_value_or(&doc, job_id);
        let phase = Phase::from_status(&job.status);
        let roster = (phase == Phase::Brainstormed && !job.ideas.is_empty())
            .then(|| IdeaRoster::new(job.ideas.clone()));

        tracing::debug!(job_id = %job.job_id, status = %job.status, %phase, "opened job");
        self.note_status(&job);
        self.install(job, phase, roster);
        if phase == Phase::Generating {
            self.start_monitor();
        }
        self.require_active().map(|a| &a.job)
    }

    /// Cancel a job on the server. The caller has already confirmed.
    ///
    /// Returns the refreshed listing, or `None` when the cancel went through but
    /// the listing could not be reloaded.
    pub async fn cancel_job(&mut self, job_id: &JobId) -> Result<Option<JobListing>, BulkError> {
        if let Some(status) = self.known_terminal(job_id) {
            return Err(BulkError::JobTerminated {
                job_id: job_id.clone(),
                status: status.to_string(),
            });
        }

        self.api
            .cancel_job(job_id)
            .await
            .map_err(|source| BulkError::JobOperationFailed {
                operation: "cancel",
                job_id: job_id.clone(),
                source,
            })?;
        tracing::info!(job_id = %job_id, "job cancelled");

        if self.is_active(job_id) {
            self.stop_monitoring();
            if let Some(active) = self.active.as_mut() {
                active.phase = Phase::Cancelled;
                active.roster = None;
                active.job.status = JobStatus::Cancelled;
            }
        }
        self.terminal.insert(job_id.clone(), JobStatus::Cancelled);
        Ok(self.refresh_after("cancel").await)
    }

    /// Delete a job on the server. The caller has already confirmed.
    /// Finished jobs may be deleted. The listing is returned as for [`Self::cancel_job`].
    pub async fn delete_job(&mut self, job_id: &JobId) -> Result<Option<JobListing>, BulkError> {
        self.api
            .delete_job(job_id)
            .await
            .map_err(|source| BulkError::JobOperationFailed {
                operation: "delete",
                job_id: job_id.clone(),
                source,
            })?;
        tracing::info!(job_id = %job_id, "job deleted");

        if self.is_active(job_id) {
            self.stop_monitoring();
            self.active = None;
            self.epoch += 1;
        }
        self.terminal.remove(job_id);
        Ok(self.refresh_after("delete").await)
    }

    /// Reload the job listing and remember any terminal statuses it shows.
    pub async fn refresh_jobs(&mut self) -> Result<JobListing, BulkError> {
        let query = self.listing_query.clone();
        self.list_jobs(&query).await
    }

    /// A listing failure must not hide a mutation the server already accepted.
    async fn refresh_after(&mut self, operation: &'static str) -> Option<JobListing> {
        match self.refresh_jobs().await {
            Ok(listing) => Some(listing),
            Err(e) => {
                tracing::warn!(operation, "job listing not refreshed: {}", e);
                None
            }
        }
    }

    pub async fn list_jobs(&mut self, query: &JobQuery) -> Result<JobListing, BulkError> {
        let listing = listing::list_jobs(&self.api, query).await?;
        for job in listing.iter() {
            self.note_status(job);
        }
        Ok(listing)
    }

    /// Wait for the next progress snapshot of the active job.
    ///
    /// Returns `None` once no monitor is running (never started, stopped, or the job
    /// reached a terminal state and its final snapshot was already returned).
    pub async fn next_update(&mut self) -> Option<BulkJob> {
        loop {
            let watch = self.watch.as_mut()?;
            let received = watch.updates.recv().await;
            match received {
                Some(update) => {
                    if let Some(job) = self.apply_update(update) {
                        return Some(job);
                    }
                }
                None => {
                    self.watch = None;
                    return None;
                }
            }
        }
    }

    /// Stop observing the active job. The server keeps generating.
    pub fn stop_monitoring(&mut self) {
        if let Some(watch) = self.watch.take() {
            watch.handle.stop();
            tracing::debug!(job_id = %watch.handle.job_id(), "stopped monitoring");
        }
    }

    fn apply_update(&mut self, update: PollUpdate) -> Option<BulkJob> {
        let active = match self.active.as_mut() {
            Some(a) if a.epoch == update.epoch && a.job.job_id == update.job.job_id => a,
            _ => {
                tracing::debug!(job_id = %update.job.job_id, "discarding stale progress update");
                return None;
            }
        };
        if active.phase.is_terminal() {
            return None;
        }
        active.job.merge_from(&update.job);
        if active.job.is_terminal() {
            active.phase = Phase::from_status(&active.job.status);
            active.roster = None;
            self.terminal
                .insert(active.job.job_id.clone(), active.job.status.clone());
            tracing::info!(
                job_id = %active.job.job_id,
                status = %active.job.status,
                completed = active.job.completed_articles,
                total = active.job.total_articles,
                "job finished"
            );
        }
        Some(active.job.clone())
    }

    /// At most one monitor runs. A live monitor for the same job and epoch is kept;
    /// anything else is replaced.
    fn start_monitor(&mut self) {
        let Some((job_id, epoch)) = self
            .active
            .as_ref()
            .map(|a| (a.job.job_id.clone(), a.epoch))
        else {
            return;
        };
        if let Some(watch) = &self.watch {
            if watch.epoch == epoch
                && watch.handle.job_id() == &job_id
                && !watch.handle.is_finished()
            {
                return;
            }
        }
        self.stop_monitoring();

        let (tx, updates) = mpsc::unbounded_channel();
        let handle = poller::monitor(
            self.api.clone(),
            job_id,
            self.intervals,
            move |job: &BulkJob| {
                let _ = tx.send(PollUpdate {
                    epoch,
                    job: job.clone(),
                });
            },
        );
        self.watch = Some(Watch {
            handle,
            epoch,
            updates,
        });
    }

    fn install(&mut self, job: BulkJob, phase: Phase, roster: Option<IdeaRoster>) -> &ActiveJob {
        self.stop_monitoring();
        self.epoch += 1;
        self.active.insert(ActiveJob {
            job,
            phase,
            roster,
            epoch: self.epoch,
        })
    }

    fn note_status(&mut self, job: &BulkJob) {
        if job.is_terminal() {
            self.terminal.insert(job.job_id.clone(), job.status.clone());
        }
    }

    fn is_active(&self, job_id: &JobId) -> bool {
        self.active.as_ref().is_some_and(|a| &a.job.job_id == job_id)
    }

    fn require_active(&self) -> Result<&ActiveJob, BulkError> {
        self.active.as_ref().ok_or(BulkError::NoActiveJob)
    }

    /// Terminal status known for this job, from the active job or past observations.
    fn known_terminal(&self, job_id: &JobId) -> Option<JobStatus> {
        if let Some(status) = self.terminal.get(job_id) {
            return Some(status.clone());
        }
        self.active
            .as_ref()
            .filter(|a| &a.job.job_id == job_id && a.phase.is_terminal())
            .map(|a| a.job.status.clone())
    }

    /// Active job that still accepts mutating operations.
    fn mutable_active(&self) -> Result<&ActiveJob, BulkError> {
        let active = self.require_active()?;
        if let Some(status) = self.known_terminal(&active.job.job_id) {
            return Err(BulkError::JobTerminated {
                job_id: active.job.job_id.clone(),
                status: status.to_string(),
            });
        }
        Ok(active)
    }

    /// The active job, if it is still the one started at `epoch`.
    fn current_mut(&mut self, epoch: u64) -> Option<&mut ActiveJob> {
        self.active.as_mut().filter(|a| a.epoch == epoch)
    }
}
