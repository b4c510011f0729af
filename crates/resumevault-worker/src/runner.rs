//! Worker runner: main loop that polls for jobs and executes them.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Semaphore, watch};
use tokio::time;
use tracing::{debug, error, info, trace, warn};

use resumevault_core::config::WorkerConfig;
use resumevault_core::result::AppResult;
use resumevault_entity::job::Job;

use crate::executor::{JobExecutionError, JobExecutor};
use crate::queue::JobQueue;

/// Longest backoff exponent; keeps the delay bounded.
const MAX_BACKOFF_EXPONENT: u32 = 10;

/// Polls the queue and executes jobs on a bounded pool of tasks.
#[derive(Debug)]
pub struct WorkerRunner {
    queue: Arc<JobQueue>,
    executor: Arc<JobExecutor>,
    config: WorkerConfig,
    worker_id: String,
}

impl WorkerRunner {
    pub fn new(
        queue: Arc<JobQueue>,
        executor: Arc<JobExecutor>,
        config: WorkerConfig,
        worker_id: String,
    ) -> Self {
        Self {
            queue,
            executor,
            config,
            worker_id,
        }
    }

    /// Run until the cancel signal is received, then wait for in-flight jobs.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) {
        info!(
            worker_id = %self.worker_id,
            concurrency = self.config.concurrency,
            poll_interval_ms = self.config.poll_interval_ms,
            "Worker started"
        );

        let concurrency = self.config.concurrency.max(1);
        let semaphore = Arc::new(Semaphore::new(concurrency));
        let poll_interval = Duration::from_millis(self.config.poll_interval_ms);

        loop {
            tokio::select! {
                _ = cancel.changed() => {
                    if *cancel.borrow() {
                        info!(worker_id = %self.worker_id, "Worker received shutdown signal");
                        break;
                    }
                }
                picked = self.poll_and_execute(&semaphore) => {
                    if picked {
                        continue;
                    }
                    tokio::select! {
                        _ = cancel.changed() => {
                            if *cancel.borrow() {
                                info!(worker_id = %self.worker_id, "Worker shutting down");
                                break;
                            }
                        }
                        _ = time::sleep(poll_interval) => {}
                    }
                }
            }
        }

        info!(worker_id = %self.worker_id, "Waiting for in-flight jobs to complete");
        let _ = time::timeout(
            Duration::from_secs(30),
            semaphore.acquire_many(concurrency as u32),
        )
        .await;
        info!(worker_id = %self.worker_id, "Worker shut down complete");
    }

    /// Claim one job and spawn its execution. Returns `true` if a job was
    /// picked up.
    async fn poll_and_execute(&self, semaphore: &Arc<Semaphore>) -> bool {
        let permit = match semaphore.clone().try_acquire_owned() {
            Ok(p) => p,
            Err(_) => {
                trace!("All worker slots occupied");
                return false;
            }
        };

        match self.queue.dequeue().await {
            Ok(Some(job)) => {
                let queue = Arc::clone(&self.queue);
                let executor = Arc::clone(&self.executor);
                let base_delay = Duration::from_millis(self.config.retry_base_delay_ms);
                tokio::spawn(async move {
                    let _permit = permit;
                    process(&queue, &executor, job, base_delay).await;
                });
                true
            }
            Ok(None) => {
                trace!("No jobs due");
                false
            }
            Err(e) => {
                error!(error = %e, "Failed to dequeue job");
                false
            }
        }
    }

    /// Execute every due job inline until the queue has nothing due.
    /// Returns how many jobs were processed.
    pub async fn drain(&self) -> AppResult<usize> {
        let base_delay = Duration::from_millis(self.config.retry_base_delay_ms);
        let mut processed = 0;
        while let Some(job) = self.queue.dequeue().await? {
            process(&self.queue, &self.executor, job, base_delay).await;
            processed += 1;
        }
        Ok(processed)
    }
}

/// Run one claimed job and record its outcome.
async fn process(queue: &JobQueue, executor: &JobExecutor, job: Job, base_delay: Duration) {
    debug!(
        job_id = %job.id,
        job_type = %job.job_type,
        attempt = job.attempts,
        max_attempts = job.max_attempts,
        "Processing job"
    );

    match executor.execute(&job).await {
        Ok(()) => {
            if let Err(e) = queue.complete(job.id).await {
                error!(job_id = %job.id, error = %e, "Failed to mark job as completed");
            }
        }
        Err(err) if err.is_retryable() && job.can_retry() => retry(queue, &job, &err, base_delay).await,
        Err(err) => {
            let message = err.to_string();
            error!(
                job_id = %job.id,
                job_type = %job.job_type,
                attempts = job.attempts,
                error = %message,
                "Job failed; giving up"
            );
            if let Err(e) = queue.fail(job.id, &message).await {
                error!(job_id = %job.id, error = %e, "Failed to mark job as failed");
            }
        }
    }
}

async fn retry(queue: &JobQueue, job: &Job, err: &JobExecutionError, base_delay: Duration) {
    let delay = backoff(base_delay, job.attempts);
    let message = err.to_string();
    warn!(
        job_id = %job.id,
        job_type = %job.job_type,
        attempt = job.attempts,
        retry_in_ms = delay.as_millis() as u64,
        error = %message,
        "Job failed; retrying"
    );

    let run_at = Utc::now() + chrono::Duration::from_std(delay).unwrap_or_else(|_| chrono::Duration::zero());
    match queue.retry_at(job.id, run_at, &message).await {
        Ok(true) => {}
        Ok(false) => {
            // A newer equivalent job is pending and will do the work.
            if let Err(e) = queue.complete(job.id).await {
                error!(job_id = %job.id, error = %e, "Failed to retire superseded job");
            }
        }
        Err(e) => error!(job_id = %job.id, error = %e, "Failed to reschedule job"),
    }
}

/// `base * 2^(attempt - 1)`.
fn backoff(base: Duration, attempt: i32) -> Duration {
    let exponent = (attempt.max(1) - 1).min(MAX_BACKOFF_EXPONENT as i32) as u32;
    base.saturating_mul(2u32.pow(exponent))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use resumevault_core::error::AppError;
    use resumevault_database::MemoryDatabase;
    use resumevault_entity::job::{JobPayload, JobStatus, JOB_TYPE_STATS_RECOMPUTE};
    use uuid::Uuid;

    use crate::executor::JobHandler;

    #[derive(Debug, Default)]
    struct FlakyHandler {
        calls: AtomicUsize,
        failures_before_success: usize,
        transient: bool,
    }

    #[async_trait]
    impl JobHandler for FlakyHandler {
        fn job_type(&self) -> &str {
            JOB_TYPE_STATS_RECOMPUTE
        }

        async fn execute(&self, _job: &Job) -> Result<(), JobExecutionError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures_before_success {
                if self.transient {
                    return Err(AppError::storage_unavailable("storage timed out").into());
                }
                return Err(AppError::invalid_input("bad data").into());
            }
            Ok(())
        }
    }

    fn runner(db: Arc<MemoryDatabase>, handler: Arc<FlakyHandler>) -> WorkerRunner {
        let mut executor = JobExecutor::new();
        executor.register(handler);
        let config = WorkerConfig {
            retry_base_delay_ms: 0,
            ..WorkerConfig::default()
        };
        WorkerRunner::new(
            Arc::new(JobQueue::new(db, config.stats_max_attempts)),
            Arc::new(executor),
            config,
            "test".to_string(),
        )
    }

    async fn enqueue(db: &Arc<MemoryDatabase>) {
        JobQueue::new(db.clone(), 3)
            .enqueue(JobPayload::StatsRecompute {
                resume_id: Uuid::new_v4(),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_transient_failures_are_retried() {
        let db = Arc::new(MemoryDatabase::new());
        let handler = Arc::new(FlakyHandler {
            failures_before_success: 2,
            transient: true,
            ..Default::default()
        });
        enqueue(&db).await;

        runner(db.clone(), handler.clone()).drain().await.unwrap();
        assert_eq!(handler.calls.load(Ordering::SeqCst), 3);
        let jobs = db.jobs().await;
        assert_eq!(jobs[0].status, JobStatus::Completed);
        assert_eq!(jobs[0].attempts, 3);
    }

    #[tokio::test]
    async fn test_exhausted_retries_fail_the_job() {
        let db = Arc::new(MemoryDatabase::new());
        let handler = Arc::new(FlakyHandler {
            failures_before_success: usize::MAX,
            transient: true,
            ..Default::default()
        });
        enqueue(&db).await;

        runner(db.clone(), handler.clone()).drain().await.unwrap();
        assert_eq!(handler.calls.load(Ordering::SeqCst), 3);
        let job = &db.jobs().await[0];
        assert_eq!(job.status, JobStatus::Failed);
        assert!(job.last_error.is_some());
    }

    #[tokio::test]
    async fn test_permanent_failures_are_not_retried() {
        let db = Arc::new(MemoryDatabase::new());
        let handler = Arc::new(FlakyHandler {
            failures_before_success: 1,
            transient: false,
            ..Default::default()
        });
        enqueue(&db).await;

        runner(db.clone(), handler.clone()).drain().await.unwrap();
        assert_eq!(handler.calls.load(Ordering::SeqCst), 1);
        assert_eq!(db.jobs().await[0].status, JobStatus::Failed);
    }

    #[tokio::test]
    async fn test_run_stops_on_cancel() {
        let db = Arc::new(MemoryDatabase::new());
        let handler = Arc::new(FlakyHandler::default());
        enqueue(&db).await;
        let runner = Arc::new(runner(db.clone(), handler.clone()));

        let (tx, rx) = watch::channel(false);
        let task = tokio::spawn({
            let runner = runner.clone();
            async move { runner.run(rx).await }
        });
        for _ in 0..50 {
            if handler.calls.load(Ordering::SeqCst) > 0 {
                break;
            }
            time::sleep(Duration::from_millis(10)).await;
        }
        tx.send(true).unwrap();
        task.await.unwrap();
        assert_eq!(handler.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_backoff_doubles() {
        let base = Duration::from_millis(500);
        assert_eq!(backoff(base, 1), Duration::from_millis(500));
        assert_eq!(backoff(base, 2), Duration::from_millis(1000));
        assert_eq!(backoff(base, 3), Duration::from_millis(2000));
    }
}
