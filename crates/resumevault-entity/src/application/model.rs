//! Application entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A student's application to a posting, as seen by the grant model.
///
/// Only the fields the grant model needs: which resume was submitted and
/// which company owns the posting.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Application {
    /// Application identifier.
    pub id: Uuid,
    /// Resume submitted with the application.
    pub resume_id: Uuid,
    /// Posting applied to.
    pub posting_id: Option<Uuid>,
    /// Company owning the posting.
    pub company_id: Uuid,
    /// When the application was recorded.
    pub created_at: DateTime<Utc>,
}
