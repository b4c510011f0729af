//! Cron scheduler for periodic maintenance tasks.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing::{debug, error, info};

use resumevault_core::config::WorkerConfig;
use resumevault_core::error::AppError;
use resumevault_core::result::AppResult;
use resumevault_entity::job::JobPayload;

use crate::queue::JobQueue;

/// Cron-based scheduler that enqueues periodic jobs.
pub struct CronScheduler {
    scheduler: JobScheduler,
    queue: Arc<JobQueue>,
    config: WorkerConfig,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler")
            .field("retention_cron", &self.config.retention_cron)
            .finish()
    }
}

impl CronScheduler {
    pub async fn new(queue: Arc<JobQueue>, config: WorkerConfig) -> AppResult<Self> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {e}")))?;
        Ok(Self {
            scheduler,
            queue,
            config,
        })
    }

    /// Register all scheduled tasks.
    pub async fn register_default_tasks(&self) -> AppResult<()> {
        self.register_retention().await?;
        info!("All scheduled tasks registered");
        Ok(())
    }

    pub async fn start(&self) -> AppResult<()> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;
        info!("Cron scheduler started");
        Ok(())
    }

    pub async fn shutdown(&mut self) -> AppResult<()> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shut down scheduler: {e}")))?;
        info!("Cron scheduler shut down");
        Ok(())
    }

    /// Access-log retention purge, daily by default.
    async fn register_retention(&self) -> AppResult<()> {
        let queue = Arc::clone(&self.queue);
        let older_than_days = self.config.retention_days;
        let job = CronJob::new_async(self.config.retention_cron.as_str(), move |_uuid, _lock| {
            let queue = Arc::clone(&queue);
            Box::pin(async move {
                debug!("Scheduling access-log retention job");
                if let Err(e) = queue.enqueue(JobPayload::Retention { older_than_days }).await {
                    error!(error = %e, "Failed to enqueue access-log retention");
                }
            })
        })
        .map_err(|e| {
            AppError::configuration(format!(
                "Invalid retention schedule '{}': {e}",
                self.config.retention_cron
            ))
        })?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| AppError::internal(format!("Failed to add retention schedule: {e}")))?;

        info!(
            cron = %self.config.retention_cron,
            retention_days = older_than_days,
            "Registered: access_log_retention"
        );
        Ok(())
    }
}
