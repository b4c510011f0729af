//! Stats read path and recompute entry point.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use resumevault_core::result::AppResult;
use resumevault_database::repositories::{
    AccessLogRepository, ResumeRepository, StatsRepository,
};
use resumevault_entity::stats::ResumeStats;

use super::aggregate::compute_stats;
use crate::context::RequestContext;
use crate::resume::service::load_owned;

/// Stats as last computed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSnapshot {
    #[serde(flatten)]
    pub stats: ResumeStats,
    /// `None` until the first recompute has run.
    pub computed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct StatsService {
    resumes: Arc<dyn ResumeRepository>,
    access_logs: Arc<dyn AccessLogRepository>,
    stats: Arc<dyn StatsRepository>,
}

impl StatsService {
    pub fn new(
        resumes: Arc<dyn ResumeRepository>,
        access_logs: Arc<dyn AccessLogRepository>,
        stats: Arc<dyn StatsRepository>,
    ) -> Self {
        Self {
            resumes,
            access_logs,
            stats,
        }
    }

    /// Read the cached aggregate. Never triggers a recompute.
    pub async fn get_stats(&self, ctx: &RequestContext, resume_id: Uuid) -> AppResult<StatsSnapshot> {
        load_owned(self.resumes.as_ref(), ctx, resume_id).await?;
        Ok(match self.stats.find(resume_id).await? {
            Some(record) => StatsSnapshot {
                stats: record.stats.0,
                computed_at: Some(record.computed_at),
            },
            None => StatsSnapshot {
                stats: ResumeStats::empty(resume_id),
                computed_at: None,
            },
        })
    }

    /// Recompute and replace the aggregate for one resume.
    ///
    /// Returns `None` when the resume no longer exists.
    pub async fn recompute(&self, resume_id: Uuid) -> AppResult<Option<ResumeStats>> {
        if self.resumes.find_by_id(resume_id).await?.is_none() {
            debug!(resume_id = %resume_id, "Resume gone; skipping stats recompute");
            return Ok(None);
        }

        let logs = self.access_logs.list_for_resume(resume_id).await?;
        let stats = compute_stats(resume_id, &logs);
        self.stats.upsert(&stats, Utc::now()).await?;

        debug!(
            resume_id = %resume_id,
            total_views = stats.total_views,
            total_downloads = stats.total_downloads,
            "Stats recomputed"
        );
        Ok(Some(stats))
    }
}
