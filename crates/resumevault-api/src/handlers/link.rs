//! Signed link issuance.

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use resumevault_entity::access::AccessType;
use resumevault_service::{IssuedLink, LinkRequest};

use crate::dto::request::{IssueLinkRequest, parse_enum};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/resumes/{id}/links
pub async fn issue_link(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<IssueLinkRequest>,
) -> Result<Json<ApiResponse<IssuedLink>>, ApiError> {
    let access_type = parse_enum::<AccessType>(&req.access_type)?;
    let link = state
        .links
        .issue_link(
            &auth,
            id,
            LinkRequest {
                access_type,
                application_id: req.application_id,
            },
        )
        .await?;
    Ok(Json(ApiResponse::ok(link)))
}
