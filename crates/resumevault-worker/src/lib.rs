//! Background job processing and scheduled tasks for ResumeVault.
//!
//! This crate provides:
//! - A job queue persisted through the job repository, with pending-job
//!   de-duplication
//! - A worker runner that polls for and executes queued jobs with bounded
//!   concurrency and exponential-backoff retries
//! - A cron scheduler for the access-log retention purge
//! - Job handlers for stats recomputation and retention

pub mod executor;
pub mod jobs;
pub mod queue;
pub mod runner;
pub mod scheduler;

pub use executor::{JobExecutionError, JobExecutor, JobHandler};
pub use queue::JobQueue;
pub use runner::WorkerRunner;
pub use scheduler::CronScheduler;
