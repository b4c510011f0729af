//! Endpoints called by the application pipeline and the malware scanner.
//! Both require a service (or admin) identity.

use axum::Json;
use axum::extract::State;

use resumevault_entity::resume::{Resume, ScanStatus};
use resumevault_entity::share::ResumeShare;

use crate::dto::request::{ApplicationLinkRequest, ScanVerdictRequest, parse_enum};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/internal/application-links
pub async fn record_application_link(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<ApplicationLinkRequest>,
) -> Result<Json<ApiResponse<ResumeShare>>, ApiError> {
    let share = state
        .shares
        .record_application_link(
            &auth,
            req.resume_id,
            req.company_id,
            req.application_id,
            req.posting_id,
        )
        .await?;
    Ok(Json(ApiResponse::ok(share)))
}

/// POST /api/internal/scan-verdicts
pub async fn record_scan_verdict(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<ScanVerdictRequest>,
) -> Result<Json<ApiResponse<Resume>>, ApiError> {
    let status = parse_enum::<ScanStatus>(&req.scan_status)?;
    let resume = state
        .resumes
        .record_scan_verdict(&auth, req.resume_id, status)
        .await?;
    Ok(Json(ApiResponse::ok(resume)))
}
