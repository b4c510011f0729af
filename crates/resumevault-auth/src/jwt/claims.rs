//! Claims carried by identity-provider tokens.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use resumevault_entity::identity::{Identity, Role};

/// JWT claims payload minted by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// Subject (user ID).
    pub sub: Uuid,
    /// Role of the subject.
    pub role: Role,
    /// Organization the subject acts for (company actors).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org: Option<Uuid>,
    /// Issued-at timestamp (seconds since epoch).
    #[serde(default)]
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Issuer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Audience.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
}

impl IdentityClaims {
    /// The verified identity these claims describe.
    pub fn identity(&self) -> Identity {
        Identity {
            subject_id: self.sub,
            role: self.role,
            company_id: self.org,
        }
    }
}
