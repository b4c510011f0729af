//! Resume share repository.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use resumevault_core::error::{AppError, ErrorKind};
use resumevault_core::result::AppResult;
use resumevault_entity::share::{CreateShare, ResumeShare};

/// Persistence operations on share grants. (resume, company) is unique.
#[async_trait]
pub trait ShareRepository: Send + Sync + std::fmt::Debug + 'static {
    /// Find the grant for a (resume, company) pair, active or not.
    async fn find(&self, resume_id: Uuid, company_id: Uuid) -> AppResult<Option<ResumeShare>>;

    /// List all grants on a resume.
    async fn list_for_resume(&self, resume_id: Uuid) -> AppResult<Vec<ResumeShare>>;

    /// Insert a grant, or replace an existing one that has expired.
    ///
    /// Returns `None` when an active grant already exists for the pair.
    async fn create_or_replace_expired(&self, data: &CreateShare) -> AppResult<Option<ResumeShare>>;

    /// Idempotently ensure a download-level, non-expiring grant exists for
    /// the pair. An existing grant is upgraded in place.
    async fn upsert_application_grant(&self, data: &CreateShare) -> AppResult<ResumeShare>;

    /// Delete the grant for a pair. Returns `true` if one existed.
    async fn delete(&self, resume_id: Uuid, company_id: Uuid) -> AppResult<bool>;
}

/// PostgreSQL share repository.
#[derive(Debug, Clone)]
pub struct PgShareRepository {
    pool: PgPool,
}

impl PgShareRepository {
    /// Create a new share repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShareRepository for PgShareRepository {
    async fn find(&self, resume_id: Uuid, company_id: Uuid) -> AppResult<Option<ResumeShare>> {
        sqlx::query_as::<_, ResumeShare>(
            "SELECT * FROM resume_shares WHERE resume_id = $1 AND company_id = $2",
        )
        .bind(resume_id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find share", e))
    }

    async fn list_for_resume(&self, resume_id: Uuid) -> AppResult<Vec<ResumeShare>> {
        sqlx::query_as::<_, ResumeShare>(
            "SELECT * FROM resume_shares WHERE resume_id = $1 ORDER BY created_at ASC",
        )
        .bind(resume_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list shares", e))
    }

    async fn create_or_replace_expired(&self, data: &CreateShare) -> AppResult<Option<ResumeShare>> {
        sqlx::query_as::<_, ResumeShare>(
            "INSERT INTO resume_shares (resume_id, owner_id, company_id, access_level, source, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (resume_id, company_id) DO UPDATE SET \
                access_level = EXCLUDED.access_level, source = EXCLUDED.source, \
                expires_at = EXCLUDED.expires_at, created_at = NOW() \
             WHERE resume_shares.expires_at IS NOT NULL AND resume_shares.expires_at <= NOW() \
             RETURNING *",
        )
        .bind(data.resume_id)
        .bind(data.owner_id)
        .bind(data.company_id)
        .bind(data.access_level)
        .bind(data.source)
        .bind(data.expires_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create share", e))
    }

    async fn upsert_application_grant(&self, data: &CreateShare) -> AppResult<ResumeShare> {
        sqlx::query_as::<_, ResumeShare>(
            "INSERT INTO resume_shares (resume_id, owner_id, company_id, access_level, source, expires_at) \
             VALUES ($1, $2, $3, 'download', 'application', NULL) \
             ON CONFLICT (resume_id, company_id) DO UPDATE SET \
                access_level = 'download', expires_at = NULL \
             RETURNING *",
        )
        .bind(data.resume_id)
        .bind(data.owner_id)
        .bind(data.company_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to upsert application grant", e)
        })
    }

    async fn delete(&self, resume_id: Uuid, company_id: Uuid) -> AppResult<bool> {
        let result =
            sqlx::query("DELETE FROM resume_shares WHERE resume_id = $1 AND company_id = $2")
                .bind(resume_id)
                .bind(company_id)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to delete share", e)
                })?;
        Ok(result.rows_affected() > 0)
    }
}
