//! Job queue commands.

use std::sync::Arc;

use clap::{Args, Subcommand};

use resumevault_core::error::AppError;
use resumevault_entity::job::JobStatus;
use resumevault_service::{RetentionService, StatsService};
use resumevault_worker::WorkerRunner;
use resumevault_worker::jobs::default_executor;

use crate::output;

/// Arguments for worker commands
#[derive(Debug, Args)]
pub struct WorkerArgs {
    #[command(subcommand)]
    pub command: WorkerCommand,
}

/// Worker subcommands
#[derive(Debug, Subcommand)]
pub enum WorkerCommand {
    /// Show queue counts by status
    Status,
    /// Run every due job once, then exit
    Drain,
}

/// Execute worker commands
pub async fn execute(args: &WorkerArgs, env: &str) -> Result<(), AppError> {
    let (config, repos, queue) = super::open(env).await?;

    match &args.command {
        WorkerCommand::Status => {
            println!("Job queue:");
            for status in [
                JobStatus::Pending,
                JobStatus::Running,
                JobStatus::Completed,
                JobStatus::Failed,
            ] {
                let count = repos.jobs.count_by_status(status).await?;
                output::print_kv(status.as_str(), &count.to_string());
            }
        }
        WorkerCommand::Drain => {
            let stats = StatsService::new(
                repos.resumes.clone(),
                repos.access_logs.clone(),
                repos.stats.clone(),
            );
            let retention = RetentionService::new(repos.access_logs.clone(), queue.clone());
            let runner = WorkerRunner::new(
                queue,
                Arc::new(default_executor(stats, retention)),
                config.worker.clone(),
                "cli-drain".to_string(),
            );
            let processed = runner.drain().await?;
            output::print_success(&format!("Processed {processed} job(s)."));
        }
    }
    Ok(())
}
