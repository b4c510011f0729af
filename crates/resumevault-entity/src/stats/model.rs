//! Resume statistics aggregate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use uuid::Uuid;

/// Per-company usage of one resume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyAccessBreakdown {
    /// Company.
    pub company_id: Uuid,
    /// View links issued to this company.
    pub views: u64,
    /// Download links issued to this company.
    pub downloads: u64,
    /// Most recent access by this company.
    pub last_accessed_at: DateTime<Utc>,
}

/// Aggregate computed from the full access log of one resume.
///
/// The value is a pure function of the log set: companies are ordered by
/// id and every timestamp comes from a log row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeStats {
    /// Resume these stats describe.
    pub resume_id: Uuid,
    /// Total view links issued.
    pub total_views: u64,
    /// Total download links issued.
    pub total_downloads: u64,
    /// Distinct companies with at least one view.
    pub unique_viewers: u64,
    /// Distinct companies with at least one download.
    pub unique_downloaders: u64,
    /// Per-company breakdown ordered by company id.
    pub companies: Vec<CompanyAccessBreakdown>,
    /// Most recent access across all companies.
    pub last_accessed_at: Option<DateTime<Utc>>,
}

impl ResumeStats {
    /// Stats for a resume with no logged accesses.
    pub fn empty(resume_id: Uuid) -> Self {
        Self {
            resume_id,
            total_views: 0,
            total_downloads: 0,
            unique_viewers: 0,
            unique_downloaders: 0,
            companies: Vec::new(),
            last_accessed_at: None,
        }
    }
}

/// Persisted stats document.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StatsRecord {
    /// Resume these stats describe.
    pub resume_id: Uuid,
    /// The aggregate.
    pub stats: Json<ResumeStats>,
    /// When the aggregate was last recomputed.
    pub computed_at: DateTime<Utc>,
}
