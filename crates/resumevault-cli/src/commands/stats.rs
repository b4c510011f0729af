//! Stats inspection commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;
use uuid::Uuid;

use resumevault_core::error::AppError;
use resumevault_entity::stats::ResumeStats;
use resumevault_service::StatsService;

use crate::output::{self, OutputFormat};

/// Arguments for the stats command
#[derive(Debug, Args)]
pub struct StatsArgs {
    #[command(subcommand)]
    pub command: StatsCommand,
}

/// Stats subcommands
#[derive(Debug, Subcommand)]
pub enum StatsCommand {
    /// Show the stored aggregate of one resume
    Show {
        resume_id: Uuid,
    },
    /// Recompute one resume's aggregate from its access log now
    Recompute {
        resume_id: Uuid,
    },
}

/// One company row of a stats table.
#[derive(Debug, Serialize, Tabled)]
struct CompanyRow {
    #[tabled(rename = "Company")]
    company_id: Uuid,
    #[tabled(rename = "Views")]
    views: u64,
    #[tabled(rename = "Downloads")]
    downloads: u64,
    #[tabled(rename = "Last access")]
    last_accessed_at: String,
}

/// Execute stats commands
pub async fn execute(args: &StatsArgs, env: &str, format: OutputFormat) -> Result<(), AppError> {
    let (_, repos, _) = super::open(env).await?;

    let stats = match &args.command {
        StatsCommand::Show { resume_id } => repos
            .stats
            .find(*resume_id)
            .await?
            .map(|record| record.stats.0)
            .ok_or_else(|| AppError::not_found(format!("No stats stored for {resume_id}")))?,
        StatsCommand::Recompute { resume_id } => {
            let service = StatsService::new(
                repos.resumes.clone(),
                repos.access_logs.clone(),
                repos.stats.clone(),
            );
            let stats = service
                .recompute(*resume_id)
                .await?
                .ok_or_else(|| AppError::not_found(format!("Resume {resume_id} not found")))?;
            output::print_success("Stats recomputed.");
            stats
        }
    };

    print_stats(&stats, format);
    Ok(())
}

fn print_stats(stats: &ResumeStats, format: OutputFormat) {
    if format == OutputFormat::Table {
        output::print_kv("Resume", &stats.resume_id.to_string());
        output::print_kv("Views", &stats.total_views.to_string());
        output::print_kv("Downloads", &stats.total_downloads.to_string());
        output::print_kv("Unique viewers", &stats.unique_viewers.to_string());
        output::print_kv("Unique downloaders", &stats.unique_downloaders.to_string());
    }
    let rows: Vec<CompanyRow> = stats
        .companies
        .iter()
        .map(|c| CompanyRow {
            company_id: c.company_id,
            views: c.views,
            downloads: c.downloads,
            last_accessed_at: c.last_accessed_at.to_rfc3339(),
        })
        .collect();
    output::print_list(&rows, format);
}
