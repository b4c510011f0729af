//! Request context carrying the verified identity and request metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use resumevault_core::error::AppError;
use resumevault_core::result::AppResult;
use resumevault_entity::identity::{Identity, Role};

/// Context for the current authenticated request.
///
/// Built by the API layer from the bearer token and passed into service
/// methods so that every operation knows who is acting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The verified identity.
    pub identity: Identity,
    /// IP address of the request origin.
    pub ip_address: Option<String>,
    /// User-Agent header value.
    pub user_agent: Option<String>,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context stamped with the current time.
    pub fn new(identity: Identity, ip_address: Option<String>, user_agent: Option<String>) -> Self {
        Self {
            identity,
            ip_address,
            user_agent,
            request_time: Utc::now(),
        }
    }

    /// Context for in-process callers (CLI, worker, tests).
    pub fn system(identity: Identity) -> Self {
        Self::new(identity, None, None)
    }

    /// The acting subject.
    pub fn subject_id(&self) -> Uuid {
        self.identity.subject_id
    }

    pub fn role(&self) -> Role {
        self.identity.role
    }

    pub fn is_admin(&self) -> bool {
        self.identity.role.is_admin()
    }

    /// Fails with `Forbidden` unless the caller is an administrator.
    pub fn require_admin(&self) -> AppResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::forbidden("Administrator role required"))
        }
    }

    /// Fails with `Forbidden` unless the caller is a trusted service
    /// (or an administrator acting on its behalf).
    pub fn require_service(&self) -> AppResult<()> {
        match self.identity.role {
            Role::Service | Role::Admin => Ok(()),
            _ => Err(AppError::forbidden("Service role required")),
        }
    }
}
