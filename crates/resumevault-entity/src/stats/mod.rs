//! Derived usage statistics.

pub mod model;

pub use model::{CompanyAccessBreakdown, ResumeStats, StatsRecord};
