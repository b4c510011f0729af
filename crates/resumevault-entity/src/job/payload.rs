//! Typed job payload definitions.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Job type of [`JobPayload::StatsRecompute`].
pub const JOB_TYPE_STATS_RECOMPUTE: &str = "stats_recompute";
/// Job type of [`JobPayload::Retention`].
pub const JOB_TYPE_RETENTION: &str = "access_log_retention";

/// Typed payloads for known job types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "job_type")]
pub enum JobPayload {
    /// Rebuild the stats aggregate of one resume.
    #[serde(rename = "stats_recompute")]
    StatsRecompute {
        /// Resume to recompute.
        resume_id: Uuid,
    },
    /// Purge access logs past the retention window.
    #[serde(rename = "access_log_retention")]
    Retention {
        /// Age threshold in days.
        older_than_days: u32,
    },
}

impl JobPayload {
    /// Return the job type string.
    pub fn job_type(&self) -> &'static str {
        match self {
            Self::StatsRecompute { .. } => JOB_TYPE_STATS_RECOMPUTE,
            Self::Retention { .. } => JOB_TYPE_RETENTION,
        }
    }

    /// Coalescing key for jobs of this payload.
    pub fn dedup_key(&self) -> Option<String> {
        match self {
            Self::StatsRecompute { resume_id } => Some(format!("stats:{resume_id}")),
            Self::Retention { .. } => Some("retention".to_string()),
        }
    }
}
