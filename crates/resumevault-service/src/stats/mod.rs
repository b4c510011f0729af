//! Usage statistics derived from the access log.

pub mod aggregate;
pub mod service;

pub use aggregate::compute_stats;
pub use service::{StatsService, StatsSnapshot};
