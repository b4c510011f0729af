//! Resume stats repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use resumevault_core::error::{AppError, ErrorKind};
use resumevault_core::result::AppResult;
use resumevault_entity::stats::{ResumeStats, StatsRecord};

/// Persistence operations on stats aggregates.
#[async_trait]
pub trait StatsRepository: Send + Sync + std::fmt::Debug + 'static {
    /// Replace the aggregate for `stats.resume_id` wholesale.
    async fn upsert(&self, stats: &ResumeStats, computed_at: DateTime<Utc>) -> AppResult<StatsRecord>;

    /// Read the cached aggregate.
    async fn find(&self, resume_id: Uuid) -> AppResult<Option<StatsRecord>>;
}

/// PostgreSQL stats repository.
#[derive(Debug, Clone)]
pub struct PgStatsRepository {
    pool: PgPool,
}

impl PgStatsRepository {
    /// Create a new stats repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StatsRepository for PgStatsRepository {
    async fn upsert(&self, stats: &ResumeStats, computed_at: DateTime<Utc>) -> AppResult<StatsRecord> {
        // The resume may have been deleted since the job started; the
        // INSERT ... SELECT then writes nothing.
        let record = sqlx::query_as::<_, StatsRecord>(
            "INSERT INTO resume_stats (resume_id, stats, computed_at) \
             SELECT $1, $2, $3 WHERE EXISTS (SELECT 1 FROM resumes WHERE id = $1) \
             ON CONFLICT (resume_id) DO UPDATE SET stats = EXCLUDED.stats, computed_at = EXCLUDED.computed_at \
             RETURNING *",
        )
        .bind(stats.resume_id)
        .bind(Json(stats))
        .bind(computed_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to upsert stats", e))?;

        Ok(record.unwrap_or_else(|| StatsRecord {
            resume_id: stats.resume_id,
            stats: Json(stats.clone()),
            computed_at,
        }))
    }

    async fn find(&self, resume_id: Uuid) -> AppResult<Option<StatsRecord>> {
        sqlx::query_as::<_, StatsRecord>("SELECT * FROM resume_stats WHERE resume_id = $1")
            .bind(resume_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find stats", e))
    }
}
