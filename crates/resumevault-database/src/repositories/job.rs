//! Background job repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use resumevault_core::error::{AppError, ErrorKind};
use resumevault_core::result::AppResult;
use resumevault_entity::job::{CreateJob, Job, JobStatus};

/// Persistence operations backing the job queue.
#[async_trait]
pub trait JobRepository: Send + Sync + std::fmt::Debug + 'static {
    /// Insert a job. Returns `None` when a pending job with the same
    /// `dedup_key` already exists.
    async fn create(&self, data: &CreateJob) -> AppResult<Option<Job>>;

    /// Find a job by ID.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Job>>;

    /// Claim the oldest due pending job, marking it running and counting
    /// the attempt.
    async fn claim_next(&self) -> AppResult<Option<Job>>;

    /// Mark a job as completed.
    async fn complete(&self, id: Uuid) -> AppResult<()>;

    /// Mark a job as failed for good.
    async fn fail(&self, id: Uuid, error: &str) -> AppResult<()>;

    /// Put a running job back to pending at `run_at`.
    ///
    /// Returns `false` when another pending job with the same key exists;
    /// the caller should then retire this one.
    async fn reschedule(&self, id: Uuid, run_at: DateTime<Utc>, error: &str) -> AppResult<bool>;

    /// Count jobs in a status.
    async fn count_by_status(&self, status: JobStatus) -> AppResult<u64>;
}

/// PostgreSQL job repository.
#[derive(Debug, Clone)]
pub struct PgJobRepository {
    pool: PgPool,
}

impl PgJobRepository {
    /// Create a new job repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobRepository for PgJobRepository {
    async fn create(&self, data: &CreateJob) -> AppResult<Option<Job>> {
        sqlx::query_as::<_, Job>(
            "INSERT INTO jobs (job_type, payload, max_attempts, dedup_key, run_at) \
             VALUES ($1, $2, $3, $4, COALESCE($5, NOW())) \
             ON CONFLICT (dedup_key) WHERE status = 'pending' DO NOTHING \
             RETURNING *",
        )
        .bind(&data.job_type)
        .bind(&data.payload)
        .bind(data.max_attempts)
        .bind(&data.dedup_key)
        .bind(data.run_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create job", e))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Job>> {
        sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find job", e))
    }

    async fn claim_next(&self) -> AppResult<Option<Job>> {
        sqlx::query_as::<_, Job>(
            "UPDATE jobs SET status = 'running', attempts = attempts + 1, updated_at = NOW() \
             WHERE id = ( \
                SELECT id FROM jobs \
                WHERE status = 'pending' AND run_at <= NOW() \
                ORDER BY run_at ASC, created_at ASC \
                FOR UPDATE SKIP LOCKED \
                LIMIT 1 \
             ) RETURNING *",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to claim job", e))
    }

    async fn complete(&self, id: Uuid) -> AppResult<()> {
        sqlx::query(
            "UPDATE jobs SET status = 'completed', last_error = NULL, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to complete job", e))?;
        Ok(())
    }

    async fn fail(&self, id: Uuid, error: &str) -> AppResult<()> {
        sqlx::query(
            "UPDATE jobs SET status = 'failed', last_error = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(error)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark job as failed", e))?;
        Ok(())
    }

    async fn reschedule(&self, id: Uuid, run_at: DateTime<Utc>, error: &str) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE jobs j SET status = 'pending', run_at = $2, last_error = $3, updated_at = NOW() \
             WHERE j.id = $1 AND NOT EXISTS ( \
                SELECT 1 FROM jobs o WHERE o.status = 'pending' \
                AND o.dedup_key = j.dedup_key AND o.id <> j.id \
             )",
        )
        .bind(id)
        .bind(run_at)
        .bind(error)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to reschedule job", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_by_status(&self, status: JobStatus) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM jobs WHERE status = $1")
            .bind(status)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count jobs", e))?;
        Ok(count as u64)
    }
}
