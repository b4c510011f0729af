//! Resume access log repository. Rows are append-only.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use resumevault_core::error::{AppError, ErrorKind};
use resumevault_core::result::AppResult;
use resumevault_entity::access::{CreateAccessLog, ResumeAccessLog};

/// Log rows for one (resume, company) pair inside a trailing window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowUsage {
    /// Rows in the window.
    pub count: u64,
    /// Oldest row in the window.
    pub oldest: Option<DateTime<Utc>>,
}

/// Persistence operations on the access log.
#[async_trait]
pub trait AccessLogRepository: Send + Sync + std::fmt::Debug + 'static {
    /// Append a row.
    async fn append(&self, data: &CreateAccessLog) -> AppResult<ResumeAccessLog>;

    /// Every row for a resume, oldest first.
    async fn list_for_resume(&self, resume_id: Uuid) -> AppResult<Vec<ResumeAccessLog>>;

    /// Rows for (resume, company) with `accessed_at > since`.
    async fn window_usage(
        &self,
        resume_id: Uuid,
        company_id: Uuid,
        since: DateTime<Utc>,
    ) -> AppResult<WindowUsage>;

    /// Delete rows older than `cutoff`. Returns the distinct affected resumes.
    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> AppResult<Vec<Uuid>>;
}

/// Deletes rows before the cutoff and returns each affected resume once.
const PURGE_OLDER_THAN_SQL: &str = "WITH purged AS (\
     DELETE FROM resume_access_logs WHERE accessed_at < $1 RETURNING resume_id) \
     SELECT DISTINCT resume_id FROM purged ORDER BY resume_id";

/// PostgreSQL access log repository.
#[derive(Debug, Clone)]
pub struct PgAccessLogRepository {
    pool: PgPool,
}

impl PgAccessLogRepository {
    /// Create a new access log repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccessLogRepository for PgAccessLogRepository {
    async fn append(&self, data: &CreateAccessLog) -> AppResult<ResumeAccessLog> {
        sqlx::query_as::<_, ResumeAccessLog>(
            "INSERT INTO resume_access_logs (resume_id, company_id, actor_id, access_type, \
             accessed_at, ip_address, user_agent, token_hash) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
        )
        .bind(data.resume_id)
        .bind(data.company_id)
        .bind(data.actor_id)
        .bind(data.access_type)
        .bind(data.accessed_at)
        .bind(&data.ip_address)
        .bind(&data.user_agent)
        .bind(&data.token_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to append access log", e))
    }

    async fn list_for_resume(&self, resume_id: Uuid) -> AppResult<Vec<ResumeAccessLog>> {
        sqlx::query_as::<_, ResumeAccessLog>(
            "SELECT * FROM resume_access_logs WHERE resume_id = $1 ORDER BY accessed_at ASC, id ASC",
        )
        .bind(resume_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list access logs", e))
    }

    async fn window_usage(
        &self,
        resume_id: Uuid,
        company_id: Uuid,
        since: DateTime<Utc>,
    ) -> AppResult<WindowUsage> {
        let (count, oldest): (i64, Option<DateTime<Utc>>) = sqlx::query_as(
            "SELECT COUNT(*), MIN(accessed_at) FROM resume_access_logs \
             WHERE resume_id = $1 AND company_id = $2 AND accessed_at > $3",
        )
        .bind(resume_id)
        .bind(company_id)
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count access window", e))?;

        Ok(WindowUsage {
            count: count as u64,
            oldest,
        })
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> AppResult<Vec<Uuid>> {
        sqlx::query_scalar(PURGE_OLDER_THAN_SQL)
            .bind(cutoff)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to purge access logs", e))
    }
}
