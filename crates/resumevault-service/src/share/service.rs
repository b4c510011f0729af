//! Explicit and application-derived share grants.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use resumevault_core::error::AppError;
use resumevault_core::result::AppResult;
use resumevault_database::repositories::{
    ApplicationRepository, ResumeRepository, ShareRepository,
};
use resumevault_entity::application::Application;
use resumevault_entity::resume::{Resume, ScanStatus};
use resumevault_entity::share::{AccessLevel, CreateShare, ResumeShare, ShareSource};

use crate::context::RequestContext;
use crate::resume::service::load_owned;

/// Longest explicit share lifetime.
pub const MAX_SHARE_DAYS: u32 = 365;

/// Owner request to share a resume with a company.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateShareRequest {
    pub company_id: Uuid,
    pub access_level: AccessLevel,
    /// Days until the grant lapses; `None` for a standing grant.
    #[serde(default)]
    pub expires_in_days: Option<u32>,
}

/// Creates, revokes and lists grants.
#[derive(Debug, Clone)]
pub struct ShareService {
    resumes: Arc<dyn ResumeRepository>,
    shares: Arc<dyn ShareRepository>,
    applications: Arc<dyn ApplicationRepository>,
}

impl ShareService {
    pub fn new(
        resumes: Arc<dyn ResumeRepository>,
        shares: Arc<dyn ShareRepository>,
        applications: Arc<dyn ApplicationRepository>,
    ) -> Self {
        Self {
            resumes,
            shares,
            applications,
        }
    }

    /// Share a resume with one company.
    ///
    /// Fails with `Conflict` while an unexpired share exists for the pair;
    /// an expired share is replaced.
    pub async fn create_share(
        &self,
        ctx: &RequestContext,
        resume_id: Uuid,
        req: CreateShareRequest,
    ) -> AppResult<ResumeShare> {
        let resume = load_owned(self.resumes.as_ref(), ctx, resume_id).await?;
        ensure_not_rejected(&resume)?;

        let expires_at = match req.expires_in_days {
            None => None,
            Some(days) if (1..=MAX_SHARE_DAYS).contains(&days) => {
                Some(Utc::now() + Duration::days(i64::from(days)))
            }
            Some(_) => {
                return Err(AppError::invalid_input(format!(
                    "expires_in_days must be between 1 and {MAX_SHARE_DAYS}"
                )));
            }
        };

        let share = self
            .shares
            .create_or_replace_expired(&CreateShare {
                resume_id,
                owner_id: resume.owner_id,
                company_id: req.company_id,
                access_level: req.access_level,
                source: ShareSource::Explicit,
                expires_at,
            })
            .await?
            .ok_or_else(|| AppError::conflict("resume already shared with this company"))?;

        info!(
            resume_id = %resume_id,
            company_id = %req.company_id,
            access_level = %share.access_level,
            "Resume shared"
        );
        Ok(share)
    }

    /// Revoke the grant for one company.
    pub async fn revoke_share(
        &self,
        ctx: &RequestContext,
        resume_id: Uuid,
        company_id: Uuid,
    ) -> AppResult<()> {
        load_owned(self.resumes.as_ref(), ctx, resume_id).await?;
        if !self.shares.delete(resume_id, company_id).await? {
            return Err(AppError::not_found("Share not found"));
        }
        info!(resume_id = %resume_id, company_id = %company_id, "Share revoked");
        Ok(())
    }

    pub async fn list_shares(
        &self,
        ctx: &RequestContext,
        resume_id: Uuid,
    ) -> AppResult<Vec<ResumeShare>> {
        load_owned(self.resumes.as_ref(), ctx, resume_id).await?;
        self.shares.list_for_resume(resume_id).await
    }

    /// Materialize the standing download grant created by an application.
    ///
    /// Idempotent: repeated calls leave exactly one share for the pair.
    pub async fn record_application_link(
        &self,
        ctx: &RequestContext,
        resume_id: Uuid,
        company_id: Uuid,
        application_id: Option<Uuid>,
        posting_id: Option<Uuid>,
    ) -> AppResult<ResumeShare> {
        ctx.require_service()?;
        let resume = self
            .resumes
            .find_by_id(resume_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Resume {resume_id} not found")))?;
        ensure_not_rejected(&resume)?;

        if let Some(application_id) = application_id {
            self.applications
                .record(&Application {
                    id: application_id,
                    resume_id,
                    posting_id,
                    company_id,
                    created_at: ctx.request_time,
                })
                .await?;
        }

        let share = self
            .shares
            .upsert_application_grant(&CreateShare {
                resume_id,
                owner_id: resume.owner_id,
                company_id,
                access_level: AccessLevel::Download,
                source: ShareSource::Application,
                expires_at: None,
            })
            .await?;

        info!(
            resume_id = %resume_id,
            company_id = %company_id,
            application_id = ?application_id,
            "Application grant recorded"
        );
        Ok(share)
    }
}

fn ensure_not_rejected(resume: &Resume) -> AppResult<()> {
    if resume.scan_status == ScanStatus::Rejected {
        return Err(AppError::scan_not_clean(
            "Resume failed the malware scan and cannot be shared",
        ));
    }
    Ok(())
}
