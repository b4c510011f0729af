//! Resume share entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::access::AccessType;

/// Level of access a grant confers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "access_level", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    /// Inline viewing only.
    View,
    /// Viewing and downloading.
    Download,
}

impl AccessLevel {
    /// Whether this level covers the requested access type.
    pub fn permits(&self, access_type: AccessType) -> bool {
        match self {
            Self::Download => true,
            Self::View => access_type == AccessType::View,
        }
    }

    /// Return the level as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Download => "download",
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AccessLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "view" => Ok(Self::View),
            "download" => Ok(Self::Download),
            other => Err(format!("Unknown access level: '{other}'")),
        }
    }
}

/// How a grant came into existence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "share_source", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ShareSource {
    /// Created by the owner.
    Explicit,
    /// Materialized by the application pipeline.
    Application,
}

/// A grant from a resume's owner to one company.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeShare {
    /// Unique share identifier.
    pub id: Uuid,
    /// Shared resume.
    pub resume_id: Uuid,
    /// Owner of the resume.
    pub owner_id: Uuid,
    /// Company receiving the grant.
    pub company_id: Uuid,
    /// Granted level.
    pub access_level: AccessLevel,
    /// Provenance.
    pub source: ShareSource,
    /// Expiry (None = never).
    pub expires_at: Option<DateTime<Utc>>,
    /// When the share was created.
    pub created_at: DateTime<Utc>,
}

impl ResumeShare {
    /// A grant is active while it has no expiry or the expiry is in the future.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_none_or(|expires_at| expires_at > now)
    }

    /// Check if the share is active right now.
    pub fn is_active(&self) -> bool {
        self.is_active_at(Utc::now())
    }
}

/// Data required to create a new share.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateShare {
    /// Resume being shared.
    pub resume_id: Uuid,
    /// Owner of the resume.
    pub owner_id: Uuid,
    /// Company receiving the grant.
    pub company_id: Uuid,
    /// Granted level.
    pub access_level: AccessLevel,
    /// Provenance.
    pub source: ShareSource,
    /// Expiry (None = never).
    pub expires_at: Option<DateTime<Utc>>,
}
