//! Age-based access-log retention.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use resumevault_core::config::worker::MAX_RETENTION_DAYS;
use resumevault_core::error::AppError;
use resumevault_core::result::AppResult;
use resumevault_core::traits::queue::RecomputeQueue;
use resumevault_database::repositories::AccessLogRepository;

use crate::context::RequestContext;

/// Outcome of a purge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionReport {
    /// Rows accessed before this instant were removed.
    pub cutoff: DateTime<Utc>,
    /// Resumes that lost at least one row; their stats were re-queued.
    pub affected_resumes: Vec<Uuid>,
}

#[derive(Debug, Clone)]
pub struct RetentionService {
    access_logs: Arc<dyn AccessLogRepository>,
    queue: Arc<dyn RecomputeQueue>,
}

impl RetentionService {
    pub fn new(access_logs: Arc<dyn AccessLogRepository>, queue: Arc<dyn RecomputeQueue>) -> Self {
        Self { access_logs, queue }
    }

    /// Administrative purge of access-log rows older than `older_than_days`.
    pub async fn cleanup_logs_older_than(
        &self,
        ctx: &RequestContext,
        older_than_days: u32,
    ) -> AppResult<RetentionReport> {
        ctx.require_admin()?;
        self.purge(older_than_days, ctx.request_time).await
    }

    /// Purge without an identity check, for the scheduler and CLI.
    pub async fn purge(&self, older_than_days: u32, now: DateTime<Utc>) -> AppResult<RetentionReport> {
        if older_than_days == 0 || older_than_days > MAX_RETENTION_DAYS {
            return Err(AppError::invalid_input(format!(
                "Retention window must be between 1 and {MAX_RETENTION_DAYS} days"
            )));
        }
        let cutoff = now
            .checked_sub_signed(Duration::days(i64::from(older_than_days)))
            .ok_or_else(|| AppError::invalid_input("Retention window reaches before the earliest date"))?;
        let affected_resumes = self.access_logs.delete_older_than(cutoff).await?;

        for resume_id in &affected_resumes {
            if let Err(e) = self.queue.enqueue_recompute(*resume_id).await {
                warn!(resume_id = %resume_id, error = %e, "Failed to enqueue stats recompute after purge");
            }
        }

        info!(
            cutoff = %cutoff,
            affected = affected_resumes.len(),
            "Access logs purged"
        );
        Ok(RetentionReport {
            cutoff,
            affected_resumes,
        })
    }
}
