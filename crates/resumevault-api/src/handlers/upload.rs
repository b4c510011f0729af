//! Upload slot handlers.

use axum::Json;
use axum::extract::State;
use validator::Validate;

use resumevault_entity::resume::{Resume, Visibility};
use resumevault_service::{ConfirmUpload, UploadSlot};

use crate::dto::request::{ConfirmUploadRequest, UploadSlotRequest, parse_enum};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/resumes/upload-slots
pub async fn issue_slot(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<UploadSlotRequest>,
) -> Result<Json<ApiResponse<UploadSlot>>, ApiError> {
    req.validate()?;
    let slot = state.uploads.issue_slot(&auth, &req.content_type).await?;
    Ok(Json(ApiResponse::ok(slot)))
}

/// POST /api/resumes/confirm
pub async fn confirm_upload(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<ConfirmUploadRequest>,
) -> Result<Json<ApiResponse<Resume>>, ApiError> {
    req.validate()?;
    let visibility = match req.visibility.as_deref() {
        Some(value) => parse_enum::<Visibility>(value)?,
        None => Visibility::default(),
    };

    let resume = state
        .resumes
        .create_record(
            &auth,
            ConfirmUpload {
                token: req.token,
                filename: req.filename,
                size_bytes: req.size_bytes,
                mime_type: req.mime_type,
                visibility,
                is_primary: req.is_primary,
            },
        )
        .await?;
    Ok(Json(ApiResponse::ok(resume)))
}
