//! Repository traits and PostgreSQL implementations for ResumeVault entities.
//!
//! Each module defines the repository trait consumed by the services and a
//! `Pg*Repository` implementing it. [`crate::memory::MemoryDatabase`]
//! implements every trait as well.

pub mod access_log;
pub mod application;
pub mod job;
pub mod resume;
pub mod share;
pub mod stats;

use std::sync::Arc;

use sqlx::PgPool;

use resumevault_core::error::{AppError, ErrorKind};
use resumevault_core::result::AppResult;

pub use access_log::{AccessLogRepository, PgAccessLogRepository, WindowUsage};
pub use application::{ApplicationRepository, PgApplicationRepository};
pub use job::{JobRepository, PgJobRepository};
pub use resume::{PgResumeRepository, ResumeRepository};
pub use share::{PgShareRepository, ShareRepository};
pub use stats::{PgStatsRepository, StatsRepository};

use crate::connection::DatabasePool;
use crate::memory::MemoryDatabase;

/// Which backend the repositories were built on.
#[derive(Debug, Clone)]
pub enum Backend {
    /// PostgreSQL pool.
    Postgres(DatabasePool),
    /// In-process store.
    Memory(Arc<MemoryDatabase>),
}

/// The full set of repositories the engine needs.
#[derive(Debug, Clone)]
pub struct Repositories {
    /// Resume records.
    pub resumes: Arc<dyn ResumeRepository>,
    /// Share grants.
    pub shares: Arc<dyn ShareRepository>,
    /// Access log.
    pub access_logs: Arc<dyn AccessLogRepository>,
    /// Stats aggregates.
    pub stats: Arc<dyn StatsRepository>,
    /// Application mirror.
    pub applications: Arc<dyn ApplicationRepository>,
    /// Background jobs.
    pub jobs: Arc<dyn JobRepository>,
    /// Backend handle (health checks, shutdown).
    pub backend: Backend,
}

impl Repositories {
    /// Build PostgreSQL-backed repositories sharing one pool.
    pub fn postgres(db: DatabasePool) -> Self {
        let pool: PgPool = db.pool().clone();
        Self {
            resumes: Arc::new(PgResumeRepository::new(pool.clone())),
            shares: Arc::new(PgShareRepository::new(pool.clone())),
            access_logs: Arc::new(PgAccessLogRepository::new(pool.clone())),
            stats: Arc::new(PgStatsRepository::new(pool.clone())),
            applications: Arc::new(PgApplicationRepository::new(pool.clone())),
            jobs: Arc::new(PgJobRepository::new(pool)),
            backend: Backend::Postgres(db),
        }
    }

    /// Build repositories over one shared in-process store.
    pub fn memory(db: Arc<MemoryDatabase>) -> Self {
        Self {
            resumes: db.clone(),
            shares: db.clone(),
            access_logs: db.clone(),
            stats: db.clone(),
            applications: db.clone(),
            jobs: db.clone(),
            backend: Backend::Memory(db),
        }
    }

    /// Check that the backend is reachable.
    pub async fn health_check(&self) -> AppResult<bool> {
        match &self.backend {
            Backend::Postgres(pool) => pool.health_check().await,
            Backend::Memory(_) => Ok(true),
        }
    }
}

/// Map an sqlx error, turning unique violations into `Conflict`.
pub(crate) fn map_write_error(err: sqlx::Error, message: &str, conflict: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return AppError::with_source(ErrorKind::Conflict, conflict, err);
        }
    }
    AppError::with_source(ErrorKind::Database, message, err)
}
