//! Database migration command.

use resumevault_core::error::AppError;
use resumevault_database::{DatabasePool, migration};

use crate::output;

/// Apply all pending migrations.
pub async fn execute(env: &str) -> Result<(), AppError> {
    let config = super::load_config(env)?;
    let pool = DatabasePool::connect(&config.database).await?;
    println!("Running database migrations...");
    migration::run_migrations(pool.pool()).await?;
    pool.close().await;
    output::print_success("All migrations applied successfully.");
    Ok(())
}
