//! Verified actor identity.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::role::Role;

/// An identity claim already verified against the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Subject (user) identifier.
    pub subject_id: Uuid,
    /// Role of the subject.
    pub role: Role,
    /// Organization the subject acts for (company actors only).
    pub company_id: Option<Uuid>,
}

impl Identity {
    /// Build an identity without an organization.
    pub fn new(subject_id: Uuid, role: Role) -> Self {
        Self {
            subject_id,
            role,
            company_id: None,
        }
    }

    /// Build a company actor acting for `company_id`.
    pub fn company(subject_id: Uuid, company_id: Uuid) -> Self {
        Self {
            subject_id,
            role: Role::Company,
            company_id: Some(company_id),
        }
    }

    /// The company this actor represents, if it is a company actor.
    ///
    /// A company token without an organization claim represents the
    /// company account itself.
    pub fn acting_company(&self) -> Option<Uuid> {
        match self.role {
            Role::Company => Some(self.company_id.unwrap_or(self.subject_id)),
            _ => None,
        }
    }

    /// Whether this identity owns something owned by `owner_id`.
    pub fn is_owner_of(&self, owner_id: Uuid) -> bool {
        self.subject_id == owner_id
    }
}
