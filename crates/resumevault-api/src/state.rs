//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use resumevault_auth::IdentityDecoder;
use resumevault_auth::limiter;
use resumevault_auth::policy::GrantEvaluator;
use resumevault_cache::CacheManager;
use resumevault_core::config::AppConfig;
use resumevault_core::traits::queue::RecomputeQueue;
use resumevault_database::Repositories;
use resumevault_service::{
    LinkIssuer, ResumeService, RetentionService, ShareService, StatsService, UploadTokenManager,
};
use resumevault_storage::StorageManager;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// Repositories over the configured backend
    pub repos: Repositories,
    /// Cache manager (Redis or in-memory)
    pub cache: CacheManager,
    /// Blob storage collaborator
    pub storage: Arc<StorageManager>,

    // ── Auth ─────────────────────────────────────────────────
    /// Identity token validator
    pub identity: Arc<IdentityDecoder>,

    // ── Services ─────────────────────────────────────────────
    /// Upload slot issuance
    pub uploads: Arc<UploadTokenManager>,
    /// Resume records
    pub resumes: Arc<ResumeService>,
    /// Share grants
    pub shares: Arc<ShareService>,
    /// Signed link issuance
    pub links: Arc<LinkIssuer>,
    /// Stats reads
    pub stats: Arc<StatsService>,
    /// Access log retention
    pub retention: Arc<RetentionService>,
}

impl AppState {
    /// Wire every service from the infrastructure handles.
    pub fn new(
        config: AppConfig,
        repos: Repositories,
        cache: CacheManager,
        storage: Arc<StorageManager>,
        queue: Arc<dyn RecomputeQueue>,
    ) -> Self {
        let uploads = UploadTokenManager::new(
            repos.resumes.clone(),
            cache.clone(),
            storage.clone(),
            config.upload.clone(),
        );
        let resumes = ResumeService::new(
            repos.resumes.clone(),
            storage.clone(),
            uploads.clone(),
            config.upload.clone(),
        );
        let shares = ShareService::new(
            repos.resumes.clone(),
            repos.shares.clone(),
            repos.applications.clone(),
        );
        let links = LinkIssuer::new(
            repos.resumes.clone(),
            repos.access_logs.clone(),
            GrantEvaluator::new(repos.shares.clone(), repos.applications.clone()),
            limiter::from_config(&config.access, repos.access_logs.clone(), cache.clone()),
            storage.clone(),
            queue.clone(),
            config.access.clone(),
        );
        let stats = StatsService::new(
            repos.resumes.clone(),
            repos.access_logs.clone(),
            repos.stats.clone(),
        );
        let retention = RetentionService::new(repos.access_logs.clone(), queue);

        Self {
            identity: Arc::new(IdentityDecoder::new(&config.identity)),
            config: Arc::new(config),
            repos,
            cache,
            storage,
            uploads: Arc::new(uploads),
            resumes: Arc::new(resumes),
            shares: Arc::new(shares),
            links: Arc::new(links),
            stats: Arc::new(stats),
            retention: Arc::new(retention),
        }
    }
}
