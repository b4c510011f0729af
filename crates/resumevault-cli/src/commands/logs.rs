//! Access log maintenance commands.

use chrono::Utc;
use clap::{Args, Subcommand};

use resumevault_core::config::worker::MAX_RETENTION_DAYS;
use resumevault_core::error::AppError;
use resumevault_service::RetentionService;

use crate::output;

/// Arguments for the logs command
#[derive(Debug, Args)]
pub struct LogsArgs {
    #[command(subcommand)]
    pub command: LogsCommand,
}

/// Log subcommands
#[derive(Debug, Subcommand)]
pub enum LogsCommand {
    /// Delete access log rows older than the given age
    Purge {
        /// Age threshold in days
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_RETENTION_DAYS)))]
        older_than_days: u32,
        /// Skip confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

/// Execute log commands
pub async fn execute(args: &LogsArgs, env: &str) -> Result<(), AppError> {
    match &args.command {
        LogsCommand::Purge {
            older_than_days,
            yes,
        } => {
            if !yes {
                let confirm = dialoguer::Confirm::new()
                    .with_prompt(format!(
                        "Permanently delete access logs older than {older_than_days} days?"
                    ))
                    .default(false)
                    .interact()
                    .map_err(|e| AppError::internal(format!("Prompt failed: {e}")))?;
                if !confirm {
                    println!("Aborted.");
                    return Ok(());
                }
            }

            let (_, repos, queue) = super::open(env).await?;
            let retention = RetentionService::new(repos.access_logs.clone(), queue);
            let report = retention.purge(*older_than_days, Utc::now()).await?;

            output::print_kv("Cutoff", &report.cutoff.to_rfc3339());
            output::print_kv(
                "Affected resumes",
                &report.affected_resumes.len().to_string(),
            );
            output::print_success("Purge complete; stats recomputes queued.");
        }
    }
    Ok(())
}
