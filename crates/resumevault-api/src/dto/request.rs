//! Request DTOs with validation.
//!
//! Enum-valued fields arrive as strings and are parsed with
//! [`parse_enum`] so unknown values surface as `InvalidInput`.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use resumevault_core::config::worker::MAX_RETENTION_DAYS;
use resumevault_core::error::AppError;
use resumevault_core::result::AppResult;

/// Parse a lowercase enum value.
pub fn parse_enum<T: FromStr<Err = String>>(value: &str) -> AppResult<T> {
    value.parse::<T>().map_err(AppError::invalid_input)
}

/// Upload slot request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UploadSlotRequest {
    /// MIME type of the file about to be uploaded.
    #[validate(length(min = 1, message = "content_type is required"))]
    pub content_type: String,
}

/// Upload confirmation body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ConfirmUploadRequest {
    /// Token returned with the upload slot.
    #[validate(length(min = 1, message = "token is required"))]
    pub token: String,
    /// Display filename.
    #[validate(length(min = 1, max = 255))]
    pub filename: String,
    /// Size in bytes the client uploaded.
    pub size_bytes: u64,
    /// MIME type of the uploaded file.
    pub mime_type: String,
    /// `private`, `public` or `restricted`; private when omitted.
    pub visibility: Option<String>,
    /// Make this the owner's primary resume.
    #[serde(default)]
    pub is_primary: bool,
}

/// Visibility change body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetVisibilityRequest {
    /// `private`, `public` or `restricted`.
    pub visibility: String,
}

/// Signed link request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueLinkRequest {
    /// `view` or `download`.
    pub access_type: String,
    /// Application through which a company is reviewing the resume.
    pub application_id: Option<Uuid>,
}

/// Share creation body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateShareBody {
    /// Company receiving the grant.
    pub company_id: Uuid,
    /// `view` or `download`.
    pub access_level: String,
    /// Days until the grant expires; never when omitted.
    #[validate(range(min = 1, max = 365))]
    pub expires_in_days: Option<u32>,
}

/// Application pipeline notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationLinkRequest {
    pub resume_id: Uuid,
    pub company_id: Uuid,
    pub application_id: Option<Uuid>,
    pub posting_id: Option<Uuid>,
}

/// Malware scanner verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanVerdictRequest {
    pub resume_id: Uuid,
    /// `clean` or `rejected`.
    pub scan_status: String,
}

/// Query for the admin log purge.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PurgeLogsQuery {
    #[validate(range(min = 1, max = MAX_RETENTION_DAYS))]
    pub older_than_days: u32,
}

/// Query parameters of a signed blob URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlobQuery {
    pub method: String,
    pub expires: i64,
    pub ct: Option<String>,
    pub cd: Option<String>,
    pub sig: String,
}
