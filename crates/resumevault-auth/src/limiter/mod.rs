//! Per-(resume, company) access rate limiting.
//!
//! Two strategies are available:
//!
//! - [`AuditLogLimiter`] counts access-log rows in the trailing window. The
//!   log write that follows a successful issuance is the record.
//! - [`CounterLimiter`] keeps a fixed-window counter in the cache and
//!   records on every check.

pub mod audit_log;
pub mod counter;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use resumevault_cache::CacheManager;
use resumevault_core::config::{AccessConfig, RateLimiterBackend};
use resumevault_core::error::AppError;
use resumevault_core::result::AppResult;
use resumevault_database::repositories::AccessLogRepository;

pub use audit_log::AuditLogLimiter;
pub use counter::CounterLimiter;

/// Outcome of a limiter check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allow,
    Deny { retry_after: Duration },
}

impl RateDecision {
    /// Convert a denial into a `RateLimited` error.
    pub fn into_result(self) -> AppResult<()> {
        match self {
            Self::Allow => Ok(()),
            Self::Deny { retry_after } => Err(AppError::rate_limited(
                "Too many link requests for this resume",
                retry_after,
            )),
        }
    }
}

/// Limits how often one company may obtain links to one resume.
#[async_trait]
pub trait AccessRateLimiter: Send + Sync + std::fmt::Debug + 'static {
    /// Check the pair against the limit, recording the attempt if the
    /// strategy keeps its own count.
    async fn check_and_record(
        &self,
        resume_id: Uuid,
        company_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<RateDecision>;
}

/// Build the limiter selected by configuration.
pub fn from_config(
    config: &AccessConfig,
    access_logs: Arc<dyn AccessLogRepository>,
    cache: CacheManager,
) -> Arc<dyn AccessRateLimiter> {
    let window = Duration::from_secs(config.rate_limit_window_seconds);
    match config.rate_limiter {
        RateLimiterBackend::AuditLog => Arc::new(AuditLogLimiter::new(
            access_logs,
            window,
            config.rate_limit_max,
        )),
        RateLimiterBackend::Counter => {
            Arc::new(CounterLimiter::new(cache, window, config.rate_limit_max))
        }
    }
}

/// Floor applied to retry hints so clients never busy-loop.
pub(crate) const MIN_RETRY_AFTER: Duration = Duration::from_secs(1);
