//! Administrative handlers.

use axum::Json;
use axum::extract::{Query, State};
use validator::Validate;

use crate::dto::request::PurgeLogsQuery;
use crate::dto::response::{ApiResponse, PurgeResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// DELETE /api/admin/access-logs?older_than_days=N
pub async fn purge_access_logs(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<PurgeLogsQuery>,
) -> Result<Json<ApiResponse<PurgeResponse>>, ApiError> {
    auth.require_admin()?;
    query.validate()?;
    let report = state
        .retention
        .cleanup_logs_older_than(&auth, query.older_than_days)
        .await?;
    Ok(Json(ApiResponse::ok(PurgeResponse {
        cutoff: report.cutoff,
        affected_resumes: report.affected_resumes.len(),
    })))
}
