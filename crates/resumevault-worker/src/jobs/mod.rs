//! Built-in job handler implementations.

pub mod retention;
pub mod stats;

use std::sync::Arc;

use resumevault_service::{RetentionService, StatsService};

use crate::executor::JobExecutor;

pub use retention::RetentionJobHandler;
pub use stats::StatsRecomputeJobHandler;

/// Executor with every built-in handler registered.
pub fn default_executor(stats: StatsService, retention: RetentionService) -> JobExecutor {
    let mut executor = JobExecutor::new();
    executor.register(Arc::new(StatsRecomputeJobHandler::new(stats)));
    executor.register(Arc::new(RetentionJobHandler::new(retention)));
    executor
}
