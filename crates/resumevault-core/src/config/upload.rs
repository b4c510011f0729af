//! Upload protocol configuration.

use serde::{Deserialize, Serialize};

/// Hard upper bound on upload token lifetime.
pub const MAX_TOKEN_TTL_SECONDS: u64 = 30 * 60;

/// Settings for the two-phase upload protocol and record validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Maximum resumes an owner may create per local calendar day.
    #[serde(default = "default_daily_quota")]
    pub daily_quota: u32,
    /// Upload token lifetime in seconds (at most 30 minutes).
    #[serde(default = "default_token_ttl")]
    pub token_ttl_seconds: u64,
    /// Maximum accepted resume size in bytes.
    #[serde(default = "default_max_size")]
    pub max_size_bytes: u64,
    /// Whitelisted MIME types.
    #[serde(default = "default_allowed_mime_types")]
    pub allowed_mime_types: Vec<String>,
    /// When false, new resumes are created already `clean`.
    #[serde(default = "default_true")]
    pub require_scan_verdict: bool,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            daily_quota: default_daily_quota(),
            token_ttl_seconds: default_token_ttl(),
            max_size_bytes: default_max_size(),
            allowed_mime_types: default_allowed_mime_types(),
            require_scan_verdict: true,
        }
    }
}

fn default_daily_quota() -> u32 {
    20
}

fn default_token_ttl() -> u64 {
    MAX_TOKEN_TTL_SECONDS
}

fn default_max_size() -> u64 {
    10 * 1024 * 1024 // 10 MiB
}

fn default_allowed_mime_types() -> Vec<String> {
    vec![
        "application/pdf".to_string(),
        "application/msword".to_string(),
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document".to_string(),
    ]
}

fn default_true() -> bool {
    true
}
