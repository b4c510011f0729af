//! Configuration check command.

use resumevault_core::error::AppError;

use crate::output;

/// Load, validate and summarize the configuration.
pub fn execute(env: &str) -> Result<(), AppError> {
    let config = super::load_config(env)?;
    println!("Configuration ({env}):");
    output::print_kv("Listen", &config.server.bind_address());
    output::print_kv("Database", &format!("{:?}", config.database.backend));
    output::print_kv("Cache", &config.cache.provider);
    output::print_kv("Storage", &config.storage.provider);
    output::print_kv("Rate limiter", &format!("{:?}", config.access.rate_limiter));
    output::print_kv(
        "Rate limit",
        &format!(
            "{} / {}s",
            config.access.rate_limit_max, config.access.rate_limit_window_seconds
        ),
    );
    output::print_kv("Daily upload quota", &config.upload.daily_quota.to_string());
    output::print_kv("Retention", &format!("{} days", config.worker.retention_days));
    output::print_success("Configuration is valid.");
    Ok(())
}
