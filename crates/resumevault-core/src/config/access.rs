//! Signed-link issuance and access rate limiting configuration.

use serde::{Deserialize, Serialize};

/// Which store backs the per-(resume, company) access limiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateLimiterBackend {
    /// Count access-log rows in the trailing window.
    #[default]
    AuditLog,
    /// Fixed-window counter in the cache, keyed by (resume, company).
    Counter,
}

/// Settings for the signed-link issuer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessConfig {
    /// Signed URL lifetime for company actors.
    #[serde(default = "default_company_ttl")]
    pub company_link_ttl_seconds: u64,
    /// Signed URL lifetime for the resume owner.
    #[serde(default = "default_owner_ttl")]
    pub owner_link_ttl_seconds: u64,
    /// Rate limit window length.
    #[serde(default = "default_window")]
    pub rate_limit_window_seconds: u64,
    /// Maximum link issuances per (resume, company) within the window.
    #[serde(default = "default_max")]
    pub rate_limit_max: u32,
    /// Limiter backend.
    #[serde(default)]
    pub rate_limiter: RateLimiterBackend,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            company_link_ttl_seconds: default_company_ttl(),
            owner_link_ttl_seconds: default_owner_ttl(),
            rate_limit_window_seconds: default_window(),
            rate_limit_max: default_max(),
            rate_limiter: RateLimiterBackend::default(),
        }
    }
}

fn default_company_ttl() -> u64 {
    300
}

fn default_owner_ttl() -> u64 {
    3600
}

fn default_window() -> u64 {
    3600
}

fn default_max() -> u32 {
    50
}
