//! Pure aggregation of access-log rows into [`ResumeStats`].
//!
//! The result depends only on the set of rows, never on their order, so
//! recomputing over an unchanged log yields identical output.

use std::collections::BTreeMap;

use uuid::Uuid;

use resumevault_entity::access::{AccessType, ResumeAccessLog};
use resumevault_entity::stats::{CompanyAccessBreakdown, ResumeStats};

/// Aggregate all access-log rows of one resume.
pub fn compute_stats(resume_id: Uuid, logs: &[ResumeAccessLog]) -> ResumeStats {
    let mut by_company: BTreeMap<Uuid, CompanyAccessBreakdown> = BTreeMap::new();

    for log in logs.iter().filter(|log| log.resume_id == resume_id) {
        let entry = by_company
            .entry(log.company_id)
            .or_insert_with(|| CompanyAccessBreakdown {
                company_id: log.company_id,
                views: 0,
                downloads: 0,
                last_accessed_at: log.accessed_at,
            });
        match log.access_type {
            AccessType::View => entry.views += 1,
            AccessType::Download => entry.downloads += 1,
        }
        entry.last_accessed_at = entry.last_accessed_at.max(log.accessed_at);
    }

    let companies: Vec<CompanyAccessBreakdown> = by_company.into_values().collect();
    ResumeStats {
        resume_id,
        total_views: companies.iter().map(|c| c.views).sum(),
        total_downloads: companies.iter().map(|c| c.downloads).sum(),
        unique_viewers: companies.iter().filter(|c| c.views > 0).count() as u64,
        unique_downloaders: companies.iter().filter(|c| c.downloads > 0).count() as u64,
        last_accessed_at: companies.iter().map(|c| c.last_accessed_at).max(),
        companies,
    }
}
