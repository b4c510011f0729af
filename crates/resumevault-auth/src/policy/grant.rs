//! Grant evaluation.
//!
//! Decides whether an identity may obtain a link to a resume and at what
//! level. Rules are evaluated in order and the first match wins:
//!
//! 1. The owner is always allowed, regardless of scan status or visibility.
//! 2. Everyone else is denied until the scan verdict is clean.
//! 3. Only company actors are considered past this point.
//! 4. A public resume allows download.
//! 5. An unexpired share allows its own level.
//! 6. An application relationship allows download. When the request names
//!    an application, that application must reference this resume and
//!    the requesting company.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use resumevault_core::result::AppResult;
use resumevault_database::repositories::{ApplicationRepository, ShareRepository};
use resumevault_entity::access::AccessType;
use resumevault_entity::identity::Identity;
use resumevault_entity::resume::{Resume, Visibility};
use resumevault_entity::share::AccessLevel;

/// Why a request was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DenyReason {
    /// No grant of any kind matched.
    NoGrant,
    /// The named application does not link this resume to this company.
    ApplicationMismatch,
    /// The scan verdict is not clean.
    ScanNotClean,
    /// The requester is neither the owner nor a company.
    NotACompany,
    /// A grant matched but its level does not cover the requested access.
    InsufficientLevel,
}

impl DenyReason {
    /// Stable reason code surfaced to callers.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoGrant => "no_grant",
            Self::ApplicationMismatch => "application_mismatch",
            Self::ScanNotClean => "scan_not_clean",
            Self::NotACompany => "not_a_company",
            Self::InsufficientLevel => "insufficient_access_level",
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a grant evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow(AccessLevel),
    Deny(DenyReason),
}

impl Decision {
    /// Narrow the decision to a concrete access type.
    pub fn for_access(self, access_type: AccessType) -> Self {
        match self {
            Self::Allow(level) if !level.permits(access_type) => {
                Self::Deny(DenyReason::InsufficientLevel)
            }
            other => other,
        }
    }
}

/// Evaluates the grant model against the share and application stores.
#[derive(Debug, Clone)]
pub struct GrantEvaluator {
    shares: Arc<dyn ShareRepository>,
    applications: Arc<dyn ApplicationRepository>,
}

impl GrantEvaluator {
    pub fn new(
        shares: Arc<dyn ShareRepository>,
        applications: Arc<dyn ApplicationRepository>,
    ) -> Self {
        Self {
            shares,
            applications,
        }
    }

    /// Decide whether `identity` may access `resume`.
    ///
    /// `application_id` is set when the request arrives through a specific
    /// application (a company reviewing an applicant).
    pub async fn authorize(
        &self,
        resume: &Resume,
        identity: &Identity,
        application_id: Option<Uuid>,
    ) -> AppResult<Decision> {
        if identity.is_owner_of(resume.owner_id) {
            return Ok(Decision::Allow(AccessLevel::Download));
        }

        if !resume.scan_status.is_clean() {
            return Ok(Decision::Deny(DenyReason::ScanNotClean));
        }

        let Some(company_id) = identity.acting_company() else {
            return Ok(Decision::Deny(DenyReason::NotACompany));
        };

        if resume.visibility == Visibility::Public {
            return Ok(Decision::Allow(AccessLevel::Download));
        }

        if let Some(share) = self.shares.find(resume.id, company_id).await? {
            if share.is_active_at(Utc::now()) {
                return Ok(Decision::Allow(share.access_level));
            }
            debug!(
                resume_id = %resume.id,
                company_id = %company_id,
                "Ignoring expired share"
            );
        }

        match application_id {
            Some(application_id) => {
                let matches = self
                    .applications
                    .find_by_id(application_id)
                    .await?
                    .is_some_and(|app| app.resume_id == resume.id && app.company_id == company_id);
                if matches {
                    Ok(Decision::Allow(AccessLevel::Download))
                } else {
                    Ok(Decision::Deny(DenyReason::ApplicationMismatch))
                }
            }
            None => {
                if self.applications.exists_for(resume.id, company_id).await? {
                    Ok(Decision::Allow(AccessLevel::Download))
                } else {
                    Ok(Decision::Deny(DenyReason::NoGrant))
                }
            }
        }
    }
}
