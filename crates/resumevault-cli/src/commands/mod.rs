//! CLI command definitions and shared helpers.

pub mod config;
pub mod logs;
pub mod migrate;
pub mod stats;
pub mod worker;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use resumevault_core::config::AppConfig;
use resumevault_core::error::AppError;
use resumevault_database::Repositories;
use resumevault_worker::JobQueue;

use crate::output::OutputFormat;

/// ResumeVault maintenance CLI
#[derive(Debug, Parser)]
#[command(name = "resumevault-cli", version, about)]
pub struct Cli {
    /// Configuration environment (`config/{env}.toml`)
    #[arg(long, global = true, env = "RESUMEVAULT_ENV", default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Apply database migrations
    Migrate,
    /// Validate and print the effective configuration
    Config,
    /// Access log maintenance
    Logs(logs::LogsArgs),
    /// Inspect or recompute resume stats
    Stats(stats::StatsArgs),
    /// Inspect or drain the background job queue
    Worker(worker::WorkerArgs),
}

impl Cli {
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Command::Migrate => migrate::execute(&self.env).await,
            Command::Config => config::execute(&self.env),
            Command::Logs(args) => logs::execute(args, &self.env).await,
            Command::Stats(args) => stats::execute(args, &self.env, self.format).await,
            Command::Worker(args) => worker::execute(args, &self.env).await,
        }
    }
}

/// Load configuration for the selected environment.
pub(crate) fn load_config(env: &str) -> Result<AppConfig, AppError> {
    AppConfig::load(env)
}

/// Open repositories and the job queue for maintenance commands.
pub(crate) async fn open(env: &str) -> Result<(AppConfig, Repositories, Arc<JobQueue>), AppError> {
    let config = load_config(env)?;
    let repos = resumevault_api::app::open_repositories(&config).await?;
    let queue = Arc::new(JobQueue::new(
        repos.jobs.clone(),
        config.worker.stats_max_attempts,
    ));
    Ok((config, repos, queue))
}
