//! Upload token binding.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What an upload token is bound to. Stored in the transient token store
/// keyed by the token value; never persisted durably.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadBinding {
    /// Identity that requested the slot.
    pub owner_id: Uuid,
    /// Object key the client uploads to.
    pub object_key: String,
    /// Content type the signed upload URL was scoped to.
    pub content_type: String,
    /// Hard expiry.
    pub expires_at: DateTime<Utc>,
}

impl UploadBinding {
    /// Whether the binding has passed its deadline at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
