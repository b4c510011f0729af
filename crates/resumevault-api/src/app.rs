//! Application builder: wires router, middleware and state into an Axum
//! app, and runs the server with its background worker.

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;

use resumevault_cache::CacheManager;
use resumevault_core::config::{AppConfig, DatabaseBackend};
use resumevault_core::error::AppError;
use resumevault_database::repositories::Backend;
use resumevault_database::{DatabasePool, MemoryDatabase, Repositories, migration};
use resumevault_storage::StorageManager;
use resumevault_worker::jobs::default_executor;
use resumevault_worker::{CronScheduler, JobQueue, WorkerRunner};

use crate::middleware::build_cors_layer;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server);
    build_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Open the configured persistence backend, migrating PostgreSQL.
pub async fn open_repositories(config: &AppConfig) -> Result<Repositories, AppError> {
    match config.database.backend {
        DatabaseBackend::Postgres => {
            tracing::info!("Connecting to database...");
            let pool = DatabasePool::connect(&config.database).await?;
            tracing::info!("Running database migrations...");
            migration::run_migrations(pool.pool()).await?;
            Ok(Repositories::postgres(pool))
        }
        DatabaseBackend::Memory => {
            tracing::warn!("Using in-process database; state is lost on restart");
            Ok(Repositories::memory(Arc::new(MemoryDatabase::new())))
        }
    }
}

/// Runs the ResumeVault server with the given configuration.
pub async fn run_server(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting ResumeVault server...");

    // ── Step 1: Persistence ──────────────────────────────────────
    let repos = open_repositories(&config).await?;

    // ── Step 2: Initialize cache ─────────────────────────────────
    tracing::info!(
        "Initializing cache (provider: {})...",
        config.cache.provider
    );
    let cache = CacheManager::new(&config.cache).await?;

    // ── Step 3: Initialize storage ───────────────────────────────
    let storage = Arc::new(StorageManager::new(&config.storage).await?);

    // ── Step 4: Job queue ────────────────────────────────────────
    let queue = Arc::new(JobQueue::new(
        repos.jobs.clone(),
        config.worker.stats_max_attempts,
    ));

    // ── Step 5: Services and state ───────────────────────────────
    let state = AppState::new(
        config.clone(),
        repos.clone(),
        cache,
        storage,
        queue.clone(),
    );

    // ── Step 6: Background worker and scheduler ──────────────────
    let (cancel_tx, cancel_rx) = watch::channel(false);
    let mut worker_handle = None;
    let mut scheduler = None;
    if config.worker.enabled {
        let executor = Arc::new(default_executor(
            (*state.stats).clone(),
            (*state.retention).clone(),
        ));
        let runner = WorkerRunner::new(
            queue.clone(),
            executor,
            config.worker.clone(),
            format!("worker-{}", std::process::id()),
        );
        worker_handle = Some(tokio::spawn(async move { runner.run(cancel_rx).await }));

        let cron = CronScheduler::new(queue.clone(), config.worker.clone()).await?;
        cron.register_default_tasks().await?;
        cron.start().await?;
        scheduler = Some(cron);
    } else {
        tracing::info!("Background worker disabled");
    }

    // ── Step 7: Serve ────────────────────────────────────────────
    let app = build_app(state);
    let addr = config.server.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;
    tracing::info!(address = %addr, "ResumeVault listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    // ── Step 8: Shutdown ─────────────────────────────────────────
    tracing::info!("Shutting down...");
    let _ = cancel_tx.send(true);
    if let Some(handle) = worker_handle {
        if let Err(e) = handle.await {
            tracing::error!(error = %e, "Worker task panicked");
        }
    }
    if let Some(mut cron) = scheduler {
        if let Err(e) = cron.shutdown().await {
            tracing::warn!(error = %e, "Scheduler shutdown failed");
        }
    }
    if let Backend::Postgres(pool) = &repos.backend {
        pool.close().await;
    }
    tracing::info!("ResumeVault stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
