//! Owner resume lifecycle handlers.

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use resumevault_entity::resume::{Resume, Visibility};

use crate::dto::request::{SetVisibilityRequest, parse_enum};
use crate::dto::response::{ApiResponse, DeletedResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/resumes
pub async fn list_resumes(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<Resume>>>, ApiError> {
    let resumes = state.resumes.list(&auth).await?;
    Ok(Json(ApiResponse::ok(resumes)))
}

/// GET /api/resumes/{id}
pub async fn get_resume(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Resume>>, ApiError> {
    let resume = state.resumes.get(&auth, id).await?;
    Ok(Json(ApiResponse::ok(resume)))
}

/// PATCH /api/resumes/{id}/visibility
pub async fn set_visibility(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<SetVisibilityRequest>,
) -> Result<Json<ApiResponse<Resume>>, ApiError> {
    let visibility = parse_enum::<Visibility>(&req.visibility)?;
    let resume = state.resumes.set_visibility(&auth, id, visibility).await?;
    Ok(Json(ApiResponse::ok(resume)))
}

/// POST /api/resumes/{id}/primary
pub async fn set_primary(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Resume>>, ApiError> {
    let resume = state.resumes.set_primary(&auth, id).await?;
    Ok(Json(ApiResponse::ok(resume)))
}

/// DELETE /api/resumes/{id}
pub async fn delete_resume(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DeletedResponse>>, ApiError> {
    state.resumes.delete(&auth, id).await?;
    Ok(Json(ApiResponse::ok(DeletedResponse { id, deleted: true })))
}
