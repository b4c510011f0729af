//! Health check handler.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use resumevault_core::traits::cache::CacheProvider;
use resumevault_core::traits::storage::StorageProvider;

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<ApiResponse<HealthResponse>>) {
    let database = state.repos.health_check().await.unwrap_or(false);
    let cache = state.cache.health_check().await.unwrap_or(false);
    let storage = state.storage.health_check().await.unwrap_or(false);

    let healthy = database && cache && storage;
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ApiResponse::ok(HealthResponse {
            status: if healthy { "ok" } else { "degraded" }.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            database,
            cache,
            storage,
        })),
    )
}
