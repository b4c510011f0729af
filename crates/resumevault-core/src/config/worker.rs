//! Background worker configuration.

use serde::{Deserialize, Serialize};

/// Longest accepted access-log retention window (about a century).
pub const MAX_RETENTION_DAYS: u32 = 36_500;

/// Background job worker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the worker runs inside the server process.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Number of concurrent job processing tasks.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Interval in milliseconds between job queue polls.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    /// Attempts per stats recompute before the job is dropped.
    #[serde(default = "default_stats_attempts")]
    pub stats_max_attempts: i32,
    /// Base delay for exponential retry backoff.
    #[serde(default = "default_retry_base")]
    pub retry_base_delay_ms: u64,
    /// Access logs older than this are purged by the retention job.
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
    /// Cron expression (with seconds) for the retention job.
    #[serde(default = "default_retention_cron")]
    pub retention_cron: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            concurrency: default_concurrency(),
            poll_interval_ms: default_poll_interval(),
            stats_max_attempts: default_stats_attempts(),
            retry_base_delay_ms: default_retry_base(),
            retention_days: default_retention_days(),
            retention_cron: default_retention_cron(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_concurrency() -> usize {
    4
}

fn default_poll_interval() -> u64 {
    500
}

fn default_stats_attempts() -> i32 {
    3
}

fn default_retry_base() -> u64 {
    500
}

fn default_retention_days() -> u32 {
    365
}

fn default_retention_cron() -> String {
    "0 0 3 * * *".to_string()
}
