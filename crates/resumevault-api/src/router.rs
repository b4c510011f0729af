//! Route definitions for the ResumeVault HTTP API.
//!
//! Domain routes are mounted under `/api`; signed blob URLs live under
//! `/blob`. The router receives `AppState` and passes it to all handlers
//! via Axum's `State` extractor.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post},
};

use crate::handlers;
use crate::state::AppState;

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.server.request_body_limit_bytes;

    let api_routes = Router::new()
        .merge(upload_routes())
        .merge(resume_routes())
        .merge(share_routes())
        .merge(internal_routes())
        .merge(admin_routes())
        .merge(health_routes());

    Router::new()
        .nest("/api", api_routes)
        .merge(blob_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Upload slot protocol
fn upload_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/resumes/upload-slots",
            post(handlers::upload::issue_slot),
        )
        .route("/resumes/confirm", post(handlers::upload::confirm_upload))
}

/// Owner lifecycle, links and stats
fn resume_routes() -> Router<AppState> {
    Router::new()
        .route("/resumes", get(handlers::resume::list_resumes))
        .route(
            "/resumes/{id}",
            get(handlers::resume::get_resume).delete(handlers::resume::delete_resume),
        )
        .route(
            "/resumes/{id}/visibility",
            patch(handlers::resume::set_visibility),
        )
        .route("/resumes/{id}/primary", post(handlers::resume::set_primary))
        .route("/resumes/{id}/links", post(handlers::link::issue_link))
        .route("/resumes/{id}/stats", get(handlers::stats::get_stats))
}

/// Explicit shares
fn share_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/resumes/{id}/shares",
            get(handlers::share::list_shares).post(handlers::share::create_share),
        )
        .route(
            "/resumes/{id}/shares/{company_id}",
            delete(handlers::share::revoke_share),
        )
}

/// Application pipeline and scanner callbacks
fn internal_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/internal/application-links",
            post(handlers::internal::record_application_link),
        )
        .route(
            "/internal/scan-verdicts",
            post(handlers::internal::record_scan_verdict),
        )
}

/// Administration
fn admin_routes() -> Router<AppState> {
    Router::new().route(
        "/admin/access-logs",
        delete(handlers::admin::purge_access_logs),
    )
}

fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

/// Signed local blob URLs
fn blob_routes() -> Router<AppState> {
    Router::new().route(
        "/blob/{*key}",
        get(handlers::blob::download_blob).put(handlers::blob::upload_blob),
    )
}
