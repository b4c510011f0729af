//! Application mirror repository.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use resumevault_core::error::{AppError, ErrorKind};
use resumevault_core::result::AppResult;
use resumevault_entity::application::Application;

/// Read and record marketplace applications.
#[async_trait]
pub trait ApplicationRepository: Send + Sync + std::fmt::Debug + 'static {
    /// Find an application by ID.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Application>>;

    /// Whether any application binds `resume_id` to `company_id`.
    async fn exists_for(&self, resume_id: Uuid, company_id: Uuid) -> AppResult<bool>;

    /// Record an application. Re-recording the same ID is a no-op.
    async fn record(&self, application: &Application) -> AppResult<()>;
}

/// PostgreSQL application repository.
#[derive(Debug, Clone)]
pub struct PgApplicationRepository {
    pool: PgPool,
}

impl PgApplicationRepository {
    /// Create a new application repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApplicationRepository for PgApplicationRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Application>> {
        sqlx::query_as::<_, Application>("SELECT * FROM applications WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find application", e))
    }

    async fn exists_for(&self, resume_id: Uuid, company_id: Uuid) -> AppResult<bool> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM applications WHERE resume_id = $1 AND company_id = $2)",
        )
        .bind(resume_id)
        .bind(company_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to check application", e))
    }

    async fn record(&self, application: &Application) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO applications (id, resume_id, posting_id, company_id, created_at) \
             VALUES ($1, $2, $3, $4, $5) ON CONFLICT (id) DO NOTHING",
        )
        .bind(application.id)
        .bind(application.resume_id)
        .bind(application.posting_id)
        .bind(application.company_id)
        .bind(application.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to record application", e))?;
        Ok(())
    }
}
