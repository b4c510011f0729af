//! Identity token validation configuration.
//!
//! Tokens are minted by the external identity provider; ResumeVault only
//! verifies them.

use serde::{Deserialize, Serialize};

/// Settings for validating identity-provider bearer tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Shared HMAC secret used by the identity provider (HS256).
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Expected `iss` claim (unchecked when empty).
    #[serde(default)]
    pub issuer: String,
    /// Expected `aud` claim (unchecked when empty).
    #[serde(default)]
    pub audience: String,
    /// Clock skew tolerance in seconds.
    #[serde(default = "default_leeway")]
    pub leeway_seconds: u64,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            issuer: String::new(),
            audience: String::new(),
            leeway_seconds: default_leeway(),
        }
    }
}

fn default_jwt_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}

fn default_leeway() -> u64 {
    5
}
