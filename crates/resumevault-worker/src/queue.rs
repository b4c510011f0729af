//! Job queue backed by the job repository.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use resumevault_core::result::AppResult;
use resumevault_core::traits::queue::RecomputeQueue;
use resumevault_database::repositories::JobRepository;
use resumevault_entity::job::{CreateJob, Job, JobPayload};

/// Job queue for enqueuing and claiming work.
#[derive(Debug, Clone)]
pub struct JobQueue {
    repo: Arc<dyn JobRepository>,
    /// Attempts allowed per job (first run included).
    max_attempts: i32,
}

impl JobQueue {
    pub fn new(repo: Arc<dyn JobRepository>, max_attempts: i32) -> Self {
        Self {
            repo,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Enqueue a job. Returns `None` when an equivalent job is already
    /// pending and this one was coalesced into it.
    pub async fn enqueue(&self, payload: JobPayload) -> AppResult<Option<Job>> {
        let job = self
            .repo
            .create(&CreateJob {
                job_type: payload.job_type().to_string(),
                payload: serde_json::to_value(&payload)?,
                max_attempts: self.max_attempts,
                dedup_key: payload.dedup_key(),
                run_at: None,
            })
            .await?;

        match &job {
            Some(job) => debug!(job_id = %job.id, job_type = %job.job_type, "Enqueued job"),
            None => debug!(job_type = payload.job_type(), "Job already pending; coalesced"),
        }
        Ok(job)
    }

    /// Claim the next due job.
    pub async fn dequeue(&self) -> AppResult<Option<Job>> {
        self.repo.claim_next().await
    }

    pub async fn complete(&self, job_id: Uuid) -> AppResult<()> {
        self.repo.complete(job_id).await
    }

    pub async fn fail(&self, job_id: Uuid, error: &str) -> AppResult<()> {
        self.repo.fail(job_id, error).await
    }

    /// Put a job back for another attempt at `run_at`. Returns `false`
    /// when a newer equivalent job is already pending.
    pub async fn retry_at(&self, job_id: Uuid, run_at: DateTime<Utc>, error: &str) -> AppResult<bool> {
        self.repo.reschedule(job_id, run_at, error).await
    }
}

#[async_trait]
impl RecomputeQueue for JobQueue {
    async fn enqueue_recompute(&self, resume_id: Uuid) -> AppResult<()> {
        self.enqueue(JobPayload::StatsRecompute { resume_id }).await?;
        Ok(())
    }
}
