//! Share (grant) handlers.

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;
use validator::Validate;

use resumevault_entity::share::{AccessLevel, ResumeShare};
use resumevault_service::CreateShareRequest;

use crate::dto::request::{CreateShareBody, parse_enum};
use crate::dto::response::{ApiResponse, DeletedResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/resumes/{id}/shares
pub async fn list_shares(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<ResumeShare>>>, ApiError> {
    let shares = state.shares.list_shares(&auth, id).await?;
    Ok(Json(ApiResponse::ok(shares)))
}

/// POST /api/resumes/{id}/shares
pub async fn create_share(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<CreateShareBody>,
) -> Result<Json<ApiResponse<ResumeShare>>, ApiError> {
    req.validate()?;
    let access_level = parse_enum::<AccessLevel>(&req.access_level)?;
    let share = state
        .shares
        .create_share(
            &auth,
            id,
            CreateShareRequest {
                company_id: req.company_id,
                access_level,
                expires_in_days: req.expires_in_days,
            },
        )
        .await?;
    Ok(Json(ApiResponse::ok(share)))
}

/// DELETE /api/resumes/{id}/shares/{company_id}
pub async fn revoke_share(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, company_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<DeletedResponse>>, ApiError> {
    state.shares.revoke_share(&auth, id, company_id).await?;
    Ok(Json(ApiResponse::ok(DeletedResponse {
        id: company_id,
        deleted: true,
    })))
}
