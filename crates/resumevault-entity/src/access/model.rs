//! Resume access log entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Kind of access a signed link grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "access_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AccessType {
    /// Inline view.
    View,
    /// File download.
    Download,
}

impl AccessType {
    /// Return the access type as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Download => "download",
        }
    }
}

impl fmt::Display for AccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AccessType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "view" => Ok(Self::View),
            "download" => Ok(Self::Download),
            other => Err(format!("Unknown access type: '{other}'")),
        }
    }
}

/// An immutable record of one granted company access.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeAccessLog {
    /// Unique log identifier.
    pub id: Uuid,
    /// Accessed resume.
    pub resume_id: Uuid,
    /// Company the actor acted for.
    pub company_id: Uuid,
    /// Acting identity.
    pub actor_id: Uuid,
    /// View or download.
    pub access_type: AccessType,
    /// Link issuance time.
    pub accessed_at: DateTime<Utc>,
    /// Client IP address.
    pub ip_address: Option<String>,
    /// Client user agent.
    pub user_agent: Option<String>,
    /// SHA-256 hex digest of the issued signed URL.
    pub token_hash: String,
}

/// Data required to append an access log row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAccessLog {
    /// Accessed resume.
    pub resume_id: Uuid,
    /// Company the actor acted for.
    pub company_id: Uuid,
    /// Acting identity.
    pub actor_id: Uuid,
    /// View or download.
    pub access_type: AccessType,
    /// Link issuance time.
    pub accessed_at: DateTime<Utc>,
    /// Client IP address.
    pub ip_address: Option<String>,
    /// Client user agent.
    pub user_agent: Option<String>,
    /// SHA-256 hex digest of the issued signed URL.
    pub token_hash: String,
}
