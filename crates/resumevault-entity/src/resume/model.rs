//! Resume entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::{ScanStatus, Visibility};

/// One uploaded resume document.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Resume {
    /// Unique resume identifier.
    pub id: Uuid,
    /// Student who uploaded the resume.
    pub owner_id: Uuid,
    /// Storage object key.
    #[serde(skip_serializing)]
    pub object_key: String,
    /// Declared filename.
    pub filename: String,
    /// Size in bytes.
    pub size_bytes: i64,
    /// MIME type.
    pub mime_type: String,
    /// Default access policy.
    pub visibility: Visibility,
    /// External scan verdict.
    pub scan_status: ScanStatus,
    /// Whether this is the owner's primary resume.
    pub is_primary: bool,
    /// Company view links issued.
    pub views_count: i64,
    /// Company download links issued.
    pub downloads_count: i64,
    /// When the upload was confirmed.
    pub uploaded_at: DateTime<Utc>,
    /// Last company view.
    pub last_viewed_at: Option<DateTime<Utc>>,
    /// Last company download.
    pub last_downloaded_at: Option<DateTime<Utc>>,
}

impl Resume {
    /// Check whether `subject_id` owns this resume.
    pub fn is_owned_by(&self, subject_id: Uuid) -> bool {
        self.owner_id == subject_id
    }
}

/// Data required to create a resume record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateResume {
    /// Owner.
    pub owner_id: Uuid,
    /// Storage object key bound by the upload token.
    pub object_key: String,
    /// Declared filename.
    pub filename: String,
    /// Size in bytes.
    pub size_bytes: i64,
    /// MIME type.
    pub mime_type: String,
    /// Initial visibility.
    pub visibility: Visibility,
    /// Initial scan status.
    pub scan_status: ScanStatus,
    /// Whether to make this the primary resume.
    pub is_primary: bool,
}
