//! Progress poller: repeatedly fetch a job's status until it reaches a terminal state.
//!
//! [`monitor`] spawns one task per job. The task fetches immediately, reports every
//! snapshot to the `on_update` observer, and sleeps `interval` between fetches.
//! Failed fetches are logged and retried after `error_backoff`; they never end the
//! monitor. [`MonitorHandle::stop`] sets the abort token and wakes the sleeping
//! task so no further fetch fires. A fetch already in flight is allowed to finish,
//! but its result is dropped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::api::ApiClient;
use crate::identity::JobId;
use crate::job::BulkJob;

/// Delays between status fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollIntervals {
    /// After a successful, non-terminal fetch.
    pub interval: Duration,
    /// After a failed fetch.
    pub error_backoff: Duration,
}

impl Default for PollIntervals {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(5000),
            error_backoff: Duration::from_millis(10000),
        }
    }
}

/// Handle to a running monitor. Dropping it stops the monitor.
#[derive(Debug)]
pub struct MonitorHandle {
    job_id: JobId,
    stop: Arc<AtomicBool>,
    wake: Arc<Notify>,
    task: Option<JoinHandle<Option<BulkJob>>>,
}

impl MonitorHandle {
    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    /// Stop observing. Idempotent; the server-side job keeps running.
    pub fn stop(&self) {
        if !self.stop.swap(true, Ordering::SeqCst) {
            tracing::debug!(job_id = %self.job_id, "monitor stop requested");
        }
        self.wake.notify_one();
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    /// True once the task has exited (terminal status seen or stopped).
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Wait for the monitor to end. Returns the terminal snapshot, or `None` if it
    /// was stopped first.
    pub async fn join(mut self) -> Option<BulkJob> {
        let task = self.task.take()?;
        match task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(job_id = %self.job_id, "monitor task ended abnormally: {}", e);
                None
            }
        }
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        if self.task.is_some() {
            self.stop();
        }
    }
}

/// Start monitoring `job_id`. `on_update` sees every successful snapshot, in order,
/// including the terminal one.
pub fn monitor<F>(
    api: ApiClient,
    job_id: JobId,
    intervals: PollIntervals,
    on_update: F,
) -> MonitorHandle
where
    F: FnMut(&BulkJob) + Send + 'static,
{
    let stop = Arc::new(AtomicBool::new(false));
    let wake = Arc::new(Notify::new());
    let task = tokio::spawn(poll_loop(
        api,
        job_id.clone(),
        intervals,
        Arc::clone(&stop),
        Arc::clone(&wake),
        on_update,
    ));
    tracing::info!(job_id = %job_id, interval_ms = intervals.interval.as_millis() as u64, "monitoring job");
    MonitorHandle {
        job_id,
        stop,
        wake,
        task: Some(task),
    }
}

async fn fetch_status(api: &ApiClient, job_id: &JobId) -> Result<BulkJob, String> {
    let doc = api.get_job(job_id).await.map_err(|e| e.to_string())?;
    let job = BulkJob::from_value_or(&doc, job_id);
    if &job.job_id != job_id {
        return Err(format!("status document is for job {}", job.job_id));
    }
    Ok(job)
}

async fn poll_loop<F>(
    api: ApiClient,
    job_id: JobId,
    intervals: PollIntervals,
    stop: Arc<AtomicBool>,
    wake: Arc<Notify>,
    mut on_update: F,
) -> Option<BulkJob>
where
    F: FnMut(&BulkJob) + Send + 'static,
{
    let mut attempt: u64 = 0;
    loop {
        if stop.load(Ordering::SeqCst) {
            return None;
        }
        attempt += 1;

        let delay = match fetch_status(&api, &job_id).await {
            Ok(job) => {
                if stop.load(Ordering::SeqCst) {
                    tracing::debug!(job_id = %job_id, "discarding status fetched after stop");
                    return None;
                }
                on_update(&job);
                if job.is_terminal() {
                    tracing::info!(job_id = %job_id, status = %job.status, attempt, "job reached terminal state");
                    return Some(job);
                }
                intervals.interval
            }
            Err(e) => {
                tracing::warn!(
                    job_id = %job_id,
                    attempt,
                    backoff_ms = intervals.error_backoff.as_millis() as u64,
                    "status poll failed: {}",
                    e
                );
                intervals.error_backoff
            }
        };

        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = wake.notified() => {}
        }
    }
}
