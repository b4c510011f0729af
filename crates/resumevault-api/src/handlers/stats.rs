//! Stats read handler.

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use resumevault_service::StatsSnapshot;

use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/resumes/{id}/stats
pub async fn get_stats(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<StatsSnapshot>>, ApiError> {
    let snapshot = state.stats.get_stats(&auth, id).await?;
    Ok(Json(ApiResponse::ok(snapshot)))
}
