//! Async job waiter
//!
//! Submits a long-running remote job, polls its status on a fixed interval with
//! a bounded attempt count, and fetches the results once it has succeeded.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::core::{JobError, Result};
use crate::jobs::timer::Timer;

/// Items produced by a finished job
pub type ResultSet = Vec<serde_json::Value>;

/// Remote job state as last observed by polling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl JobStatus {
    /// Whether polling can stop
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Succeeded | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Running => write!(f, "running"),
            JobStatus::Succeeded => write!(f, "succeeded"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

/// What to run on the remote service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSpec {
    /// Remote program (actor) identifier
    pub actor: String,
    /// Input payload passed to the actor
    pub input: serde_json::Value,
}

impl JobSpec {
    pub fn new(actor: impl Into<String>, input: serde_json::Value) -> Self {
        Self {
            actor: actor.into(),
            input,
        }
    }
}

/// Identifiers returned by a successful submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub job_id: String,
    pub result_locator: String,
    pub status: JobStatus,
}

/// A submitted job and its polling progress
#[derive(Debug, Clone)]
pub struct RemoteJob {
    pub job_id: String,
    pub status: JobStatus,
    pub result_locator: String,
    /// Status queries issued so far
    pub attempts: u32,
}

impl From<Submission> for RemoteJob {
    fn from(submission: Submission) -> Self {
        Self {
            job_id: submission.job_id,
            status: submission.status,
            result_locator: submission.result_locator,
            attempts: 0,
        }
    }
}

impl RemoteJob {
    fn record_poll(&mut self, status: JobStatus) {
        self.attempts += 1;
        self.status = status;
    }
}

/// Interval and attempt cap for one job run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl PollSettings {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }
}

/// A remote service that runs jobs asynchronously
///
/// Transport failures and non-success HTTP statuses are reported as `Err`;
/// the remote job's own state is reported through [`JobStatus`].
#[async_trait]
pub trait JobService: Send + Sync {
    /// Start a job
    async fn submit(&self, spec: &JobSpec) -> Result<Submission>;

    /// Query the current status of a job
    async fn get_status(&self, job_id: &str) -> Result<JobStatus>;

    /// Read the output of a finished job
    async fn fetch_results(&self, result_locator: &str) -> Result<ResultSet>;
}

/// Runs remote jobs to completion by bounded polling
#[derive(Clone)]
pub struct AsyncJobWaiter {
    service: Arc<dyn JobService>,
    timer: Arc<dyn Timer>,
}

impl AsyncJobWaiter {
    /// Create a waiter over a job service and a timer
    pub fn new(service: Arc<dyn JobService>, timer: Arc<dyn Timer>) -> Self {
        Self { service, timer }
    }

    /// Submit `spec`, wait for it to finish and return its results.
    ///
    /// Issues at most `settings.max_attempts` status queries. A failed
    /// submission issues none.
    pub async fn run_job(
        &self,
        spec: &JobSpec,
        settings: PollSettings,
    ) -> std::result::Result<ResultSet, JobError> {
        let submission = self
            .service
            .submit(spec)
            .await
            .map_err(|e| JobError::Submission(e.to_string()))?;

        let mut job = RemoteJob::from(submission);
        info!(
            job_id = %job.job_id,
            actor = %spec.actor,
            status = %job.status,
            "Submitted remote job"
        );

        while !job.status.is_terminal() && job.attempts < settings.max_attempts {
            self.timer.sleep(settings.interval).await;

            let status = self
                .service
                .get_status(&job.job_id)
                .await
                .map_err(|e| JobError::StatusQuery {
                    job_id: job.job_id.clone(),
                    reason: e.to_string(),
                })?;
            job.record_poll(status);

            debug!(
                job_id = %job.job_id,
                attempt = job.attempts,
                max_attempts = settings.max_attempts,
                status = %job.status,
                "Polled remote job"
            );
        }

        match job.status {
            JobStatus::Succeeded => {
                let results = self
                    .service
                    .fetch_results(&job.result_locator)
                    .await
                    .map_err(|e| JobError::ResultFetch {
                        job_id: job.job_id.clone(),
                        reason: e.to_string(),
                    })?;
                info!(
                    job_id = %job.job_id,
                    items = results.len(),
                    attempts = job.attempts,
                    "Remote job finished"
                );
                Ok(results)
            }
            JobStatus::Failed => {
                warn!(job_id = %job.job_id, "Remote job failed");
                Err(JobError::Execution {
                    job_id: job.job_id,
                    status: job.status,
                })
            }
            JobStatus::Pending | JobStatus::Running => {
                warn!(
                    job_id = %job.job_id,
                    attempts = job.attempts,
                    status = %job.status,
                    "Gave up waiting for remote job"
                );
                Err(JobError::Timeout {
                    job_id: job.job_id,
                    last_status: job.status,
                    attempts: job.attempts,
                })
            }
        }
    }
}
