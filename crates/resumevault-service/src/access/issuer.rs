//! Signed-link issuer.
//!
//! Gates every link on the grant model and, for companies, on the access
//! rate limiter. Company accesses are logged and counted; the owner's own
//! accesses are not.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{info, warn};
use uuid::Uuid;

use resumevault_auth::limiter::AccessRateLimiter;
use resumevault_auth::policy::{Decision, GrantEvaluator};
use resumevault_core::config::AccessConfig;
use resumevault_core::error::AppError;
use resumevault_core::result::AppResult;
use resumevault_core::traits::queue::RecomputeQueue;
use resumevault_core::traits::storage::{ContentDisposition, StorageProvider};
use resumevault_database::repositories::{AccessLogRepository, ResumeRepository};
use resumevault_entity::access::{AccessType, CreateAccessLog};
use resumevault_entity::resume::Resume;
use resumevault_storage::StorageManager;

use crate::context::RequestContext;

/// What the caller wants to do with the resume.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LinkRequest {
    pub access_type: AccessType,
    /// Application through which a company is reviewing the resume.
    #[serde(default)]
    pub application_id: Option<Uuid>,
}

/// A minted link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedLink {
    pub url: String,
    pub method: String,
    /// Seconds until the URL stops working.
    pub expires_in: u64,
    pub expires_at: DateTime<Utc>,
}

/// Issues time-limited links to resumes.
#[derive(Debug, Clone)]
pub struct LinkIssuer {
    resumes: Arc<dyn ResumeRepository>,
    access_logs: Arc<dyn AccessLogRepository>,
    grants: GrantEvaluator,
    limiter: Arc<dyn AccessRateLimiter>,
    storage: Arc<StorageManager>,
    queue: Arc<dyn RecomputeQueue>,
    config: AccessConfig,
}

impl LinkIssuer {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        resumes: Arc<dyn ResumeRepository>,
        access_logs: Arc<dyn AccessLogRepository>,
        grants: GrantEvaluator,
        limiter: Arc<dyn AccessRateLimiter>,
        storage: Arc<StorageManager>,
        queue: Arc<dyn RecomputeQueue>,
        config: AccessConfig,
    ) -> Self {
        Self {
            resumes,
            access_logs,
            grants,
            limiter,
            storage,
            queue,
            config,
        }
    }

    /// Issue a signed link to `resume_id`.
    pub async fn issue_link(
        &self,
        ctx: &RequestContext,
        resume_id: Uuid,
        req: LinkRequest,
    ) -> AppResult<IssuedLink> {
        let resume = self
            .resumes
            .find_by_id(resume_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Resume {resume_id} not found")))?;

        if resume.is_owned_by(ctx.subject_id()) {
            let ttl = Duration::from_secs(self.config.owner_link_ttl_seconds);
            return self.mint(&resume, req.access_type, ttl).await;
        }

        let decision = self
            .grants
            .authorize(&resume, &ctx.identity, req.application_id)
            .await?
            .for_access(req.access_type);
        if let Decision::Deny(reason) = decision {
            info!(
                resume_id = %resume_id,
                subject_id = %ctx.subject_id(),
                reason = %reason,
                "Link request denied"
            );
            return Err(AppError::forbidden(format!("Access denied: {reason}")));
        }

        let company_id = ctx
            .identity
            .acting_company()
            .ok_or_else(|| AppError::forbidden("Access denied: not_a_company"))?;

        let now = ctx.request_time;
        self.limiter
            .check_and_record(resume_id, company_id, now)
            .await?
            .into_result()?;

        let ttl = Duration::from_secs(self.config.company_link_ttl_seconds);
        let link = self.mint(&resume, req.access_type, ttl).await?;

        self.access_logs
            .append(&CreateAccessLog {
                resume_id,
                company_id,
                actor_id: ctx.subject_id(),
                access_type: req.access_type,
                accessed_at: now,
                ip_address: ctx.ip_address.clone(),
                user_agent: ctx.user_agent.clone(),
                token_hash: audit_hash(&link.url),
            })
            .await?;
        self.resumes
            .record_access(resume_id, req.access_type, now)
            .await?;

        if let Err(e) = self.queue.enqueue_recompute(resume_id).await {
            warn!(resume_id = %resume_id, error = %e, "Failed to enqueue stats recompute");
        }

        info!(
            resume_id = %resume_id,
            company_id = %company_id,
            access_type = %req.access_type,
            "Signed link issued"
        );
        Ok(link)
    }

    async fn mint(&self, resume: &Resume, access_type: AccessType, ttl: Duration) -> AppResult<IssuedLink> {
        let disposition = match access_type {
            AccessType::View => ContentDisposition::Inline,
            AccessType::Download => ContentDisposition::Attachment {
                filename: resume.filename.clone(),
            },
        };
        let signed = self
            .storage
            .presign_download(&resume.object_key, &disposition, ttl)
            .await?;
        Ok(IssuedLink {
            url: signed.url,
            method: signed.method,
            expires_in: ttl.as_secs(),
            expires_at: signed.expires_at,
        })
    }
}

/// SHA-256 of the issued URL, hex encoded. The URL itself is never stored.
pub fn audit_hash(url: &str) -> String {
    format!("{:x}", Sha256::digest(url.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Harness;
    use resumevault_core::ErrorKind;
    use resumevault_entity::identity::{Identity, Role};
    use resumevault_entity::resume::{ScanStatus, Visibility};

    fn view() -> LinkRequest {
        LinkRequest {
            access_type: AccessType::View,
            application_id: None,
        }
    }

    #[tokio::test]
    async fn test_owner_access_is_not_logged() {
        let h = Harness::new().await;
        let owner = Uuid::new_v4();
        let resume = h
            .seed_resume_with(owner, Visibility::Private, ScanStatus::Pending)
            .await;
        let link = h
            .link_issuer()
            .issue_link(&RequestContext::system(Identity::new(owner, Role::Student)), resume.id, view())
            .await
            .unwrap();
        assert_eq!(link.expires_in, 3600);
        assert_eq!(h.db.access_log_count(resume.id).await, 0);
        assert!(h.queue.enqueued().await.is_empty());
    }

    #[tokio::test]
    async fn test_company_access_is_logged_and_counted() {
        let h = Harness::new().await;
        let resume = h
            .seed_resume_with(Uuid::new_v4(), Visibility::Public, ScanStatus::Clean)
            .await;
        let ctx = RequestContext::system(Identity::company(Uuid::new_v4(), Uuid::new_v4()));
        let link = h
            .link_issuer()
            .issue_link(
                &ctx,
                resume.id,
                LinkRequest {
                    access_type: AccessType::Download,
                    application_id: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(link.expires_in, 300);

        let logs = h.repos.access_logs.list_for_resume(resume.id).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].token_hash, audit_hash(&link.url));
        assert_ne!(logs[0].token_hash, link.url);
        assert_eq!(logs[0].accessed_at, ctx.request_time);

        let resume = h.repos.resumes.find_by_id(resume.id).await.unwrap().unwrap();
        assert_eq!(resume.downloads_count, 1);
        assert_eq!(resume.views_count, 0);
        assert!(resume.last_downloaded_at.is_some());
        assert_eq!(h.queue.enqueued().await, vec![resume.id]);
    }

    #[tokio::test]
    async fn test_denials_are_forbidden_and_unlogged() {
        let h = Harness::new().await;
        let resume = h
            .seed_resume_with(Uuid::new_v4(), Visibility::Public, ScanStatus::Pending)
            .await;
        let company = RequestContext::system(Identity::company(Uuid::new_v4(), Uuid::new_v4()));
        let err = h
            .link_issuer()
            .issue_link(&company, resume.id, view())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);
        assert!(err.message.contains("scan_not_clean"));

        let student = RequestContext::system(Identity::new(Uuid::new_v4(), Role::Student));
        let err = h
            .link_issuer()
            .issue_link(&student, resume.id, view())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);
        assert_eq!(h.db.access_log_count(resume.id).await, 0);

        let err = h
            .link_issuer()
            .issue_link(&company, Uuid::new_v4(), view())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_rate_limit_blocks_without_logging() {
        let h = Harness::with_config(|config| config.access.rate_limit_max = 2).await;
        let resume = h
            .seed_resume_with(Uuid::new_v4(), Visibility::Public, ScanStatus::Clean)
            .await;
        let ctx = RequestContext::system(Identity::company(Uuid::new_v4(), Uuid::new_v4()));
        let issuer = h.link_issuer();
        issuer.issue_link(&ctx, resume.id, view()).await.unwrap();
        issuer.issue_link(&ctx, resume.id, view()).await.unwrap();

        let err = issuer.issue_link(&ctx, resume.id, view()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::RateLimited);
        assert!(err.retry_after.is_some());
        assert_eq!(h.db.access_log_count(resume.id).await, 2);
    }

    #[test]
    fn test_audit_hash_is_hex_sha256() {
        let hash = audit_hash("https://example.com/x");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
