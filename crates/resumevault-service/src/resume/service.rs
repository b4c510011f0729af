//! Resume record creation and owner-invoked lifecycle operations.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use resumevault_core::config::UploadConfig;
use resumevault_core::error::AppError;
use resumevault_core::result::AppResult;
use resumevault_core::traits::storage::StorageProvider;
use resumevault_database::repositories::ResumeRepository;
use resumevault_entity::resume::{CreateResume, Resume, ScanStatus, Visibility};
use resumevault_entity::upload::UploadBinding;
use resumevault_storage::StorageManager;

use crate::context::RequestContext;
use crate::upload::{UploadTokenManager, validation};

/// Confirmation of a completed upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmUpload {
    /// Token returned when the slot was issued.
    pub token: String,
    /// Display filename.
    pub filename: String,
    /// Size the client claims to have uploaded.
    pub size_bytes: u64,
    /// MIME type of the uploaded file.
    pub mime_type: String,
    /// Initial visibility.
    #[serde(default)]
    pub visibility: Visibility,
    /// Whether the new resume should become the owner's primary.
    #[serde(default)]
    pub is_primary: bool,
}

/// Manages resume records for their owners.
#[derive(Debug, Clone)]
pub struct ResumeService {
    resumes: Arc<dyn ResumeRepository>,
    storage: Arc<StorageManager>,
    tokens: UploadTokenManager,
    config: UploadConfig,
}

impl ResumeService {
    pub fn new(
        resumes: Arc<dyn ResumeRepository>,
        storage: Arc<StorageManager>,
        tokens: UploadTokenManager,
        config: UploadConfig,
    ) -> Self {
        Self {
            resumes,
            storage,
            tokens,
            config,
        }
    }

    /// Redeem the upload token and create the resume record.
    ///
    /// Any rejection after the token is redeemed deletes the uploaded
    /// object so it is not orphaned.
    pub async fn create_record(&self, ctx: &RequestContext, req: ConfirmUpload) -> AppResult<Resume> {
        let binding = self.tokens.redeem_slot(ctx, &req.token).await?;

        match self.persist(&binding, &req).await {
            Ok(resume) => {
                info!(
                    resume_id = %resume.id,
                    owner_id = %resume.owner_id,
                    size_bytes = resume.size_bytes,
                    is_primary = resume.is_primary,
                    "Resume created"
                );
                Ok(resume)
            }
            Err(e) => {
                self.discard_orphan(&binding.object_key).await;
                Err(e)
            }
        }
    }

    async fn persist(&self, binding: &UploadBinding, req: &ConfirmUpload) -> AppResult<Resume> {
        validation::validate_filename(&req.filename)?;
        validation::validate_mime_type(&req.mime_type, &self.config.allowed_mime_types)?;
        if !req.mime_type.trim().eq_ignore_ascii_case(&binding.content_type) {
            return Err(AppError::invalid_input(format!(
                "MIME type '{}' does not match the upload slot ('{}')",
                req.mime_type, binding.content_type
            )));
        }
        validation::validate_size(req.size_bytes, self.config.max_size_bytes)?;

        if !self.storage.exists(&binding.object_key).await? {
            return Err(AppError::invalid_input(
                "No uploaded file found for this upload token",
            ));
        }
        let stored = self.storage.metadata(&binding.object_key).await?;
        let size_bytes = if stored.size_bytes > 0 {
            stored.size_bytes
        } else {
            req.size_bytes
        };
        validation::validate_size(size_bytes, self.config.max_size_bytes)?;

        let scan_status = if self.config.require_scan_verdict {
            ScanStatus::Pending
        } else {
            ScanStatus::Clean
        };
        let is_primary = req.is_primary || !self.resumes.has_primary(binding.owner_id).await?;

        self.resumes
            .create(&CreateResume {
                owner_id: binding.owner_id,
                object_key: binding.object_key.clone(),
                filename: req.filename.trim().to_string(),
                size_bytes: size_bytes as i64,
                mime_type: binding.content_type.clone(),
                visibility: req.visibility,
                scan_status,
                is_primary,
            })
            .await
    }

    async fn discard_orphan(&self, object_key: &str) {
        if let Err(e) = self.storage.delete(object_key).await {
            warn!(object_key, error = %e, "Failed to delete orphaned upload");
        }
    }

    /// Load a resume the caller owns (administrators may load any).
    pub async fn load_owned(&self, ctx: &RequestContext, resume_id: Uuid) -> AppResult<Resume> {
        load_owned(self.resumes.as_ref(), ctx, resume_id).await
    }

    /// The caller's resumes, newest first.
    pub async fn list(&self, ctx: &RequestContext) -> AppResult<Vec<Resume>> {
        self.resumes.list_by_owner(ctx.subject_id()).await
    }

    pub async fn get(&self, ctx: &RequestContext, resume_id: Uuid) -> AppResult<Resume> {
        self.load_owned(ctx, resume_id).await
    }

    pub async fn set_visibility(
        &self,
        ctx: &RequestContext,
        resume_id: Uuid,
        visibility: Visibility,
    ) -> AppResult<Resume> {
        self.load_owned(ctx, resume_id).await?;
        let resume = self
            .resumes
            .set_visibility(resume_id, visibility)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Resume {resume_id} not found")))?;
        info!(resume_id = %resume_id, visibility = %visibility, "Resume visibility changed");
        Ok(resume)
    }

    /// Make `resume_id` the owner's only primary resume.
    pub async fn set_primary(&self, ctx: &RequestContext, resume_id: Uuid) -> AppResult<Resume> {
        let resume = self.load_owned(ctx, resume_id).await?;
        let resume = self.resumes.set_primary(resume.owner_id, resume_id).await?;
        info!(resume_id = %resume_id, owner_id = %resume.owner_id, "Primary resume changed");
        Ok(resume)
    }

    /// Delete a resume, its grants, its access history and its stored object.
    pub async fn delete(&self, ctx: &RequestContext, resume_id: Uuid) -> AppResult<()> {
        let resume = self.load_owned(ctx, resume_id).await?;
        if !self.resumes.delete(resume_id).await? {
            return Err(AppError::not_found(format!("Resume {resume_id} not found")));
        }
        if let Err(e) = self.storage.delete(&resume.object_key).await {
            warn!(
                resume_id = %resume_id,
                object_key = %resume.object_key,
                error = %e,
                "Resume deleted but its stored object could not be removed"
            );
        }
        info!(resume_id = %resume_id, owner_id = %resume.owner_id, "Resume deleted");
        Ok(())
    }

    /// Ingest the external scanner's verdict.
    pub async fn record_scan_verdict(
        &self,
        ctx: &RequestContext,
        resume_id: Uuid,
        status: ScanStatus,
    ) -> AppResult<Resume> {
        ctx.require_service()?;
        if status == ScanStatus::Pending {
            return Err(AppError::invalid_input(
                "Scan verdict must be 'clean' or 'rejected'",
            ));
        }
        let resume = self
            .resumes
            .set_scan_status(resume_id, status)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Resume {resume_id} not found")))?;
        info!(resume_id = %resume_id, scan_status = %status, "Scan verdict recorded");
        Ok(resume)
    }
}

/// Load a resume, failing `NotFound` if absent and `Forbidden` unless the
/// caller owns it or is an administrator.
pub(crate) async fn load_owned(
    resumes: &dyn ResumeRepository,
    ctx: &RequestContext,
    resume_id: Uuid,
) -> AppResult<Resume> {
    let resume = resumes
        .find_by_id(resume_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Resume {resume_id} not found")))?;
    if !resume.is_owned_by(ctx.subject_id()) && !ctx.is_admin() {
        return Err(AppError::forbidden("Only the owner can manage this resume"));
    }
    Ok(resume)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Harness;
    use resumevault_core::ErrorKind;
    use resumevault_entity::identity::{Identity, Role};

    fn student() -> RequestContext {
        RequestContext::system(Identity::new(Uuid::new_v4(), Role::Student))
    }

    fn confirm(token: &str, size: u64) -> ConfirmUpload {
        ConfirmUpload {
            token: token.to_string(),
            filename: "resume.pdf".to_string(),
            size_bytes: size,
            mime_type: "application/pdf".to_string(),
            visibility: Visibility::Private,
            is_primary: false,
        }
    }

    #[tokio::test]
    async fn test_confirm_creates_pending_primary_resume() {
        let h = Harness::new().await;
        let ctx = student();
        let slot = h.upload_manager().issue_slot(&ctx, "application/pdf").await.unwrap();
        h.put_object(&slot.object_key, 2048).await;

        let resume = h
            .resume_service()
            .create_record(&ctx, confirm(&slot.token, 2048))
            .await
            .unwrap();
        assert_eq!(resume.owner_id, ctx.subject_id());
        assert_eq!(resume.scan_status, ScanStatus::Pending);
        assert_eq!(resume.size_bytes, 2048);
        // First resume becomes primary even when not requested.
        assert!(resume.is_primary);
    }

    #[tokio::test]
    async fn test_oversized_upload_is_rejected_and_removed() {
        let h = Harness::with_config(|config| config.upload.max_size_bytes = 1024).await;
        let ctx = student();
        let slot = h.upload_manager().issue_slot(&ctx, "application/pdf").await.unwrap();
        h.put_object(&slot.object_key, 4096).await;

        // Declared size lies; the stored size is what counts.
        let err = h
            .resume_service()
            .create_record(&ctx, confirm(&slot.token, 512))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidInput);
        assert!(!h.storage.exists(&slot.object_key).await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_object_is_rejected() {
        let h = Harness::new().await;
        let ctx = student();
        let slot = h.upload_manager().issue_slot(&ctx, "application/pdf").await.unwrap();
        let err = h
            .resume_service()
            .create_record(&ctx, confirm(&slot.token, 100))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn test_owner_only_lifecycle() {
        let h = Harness::new().await;
        let owner = student();
        let resume = h.seed_resume(owner.subject_id()).await;
        let service = h.resume_service();

        let err = service
            .set_visibility(&student(), resume.id, Visibility::Public)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);

        let updated = service
            .set_visibility(&owner, resume.id, Visibility::Public)
            .await
            .unwrap();
        assert_eq!(updated.visibility, Visibility::Public);

        service.delete(&owner, resume.id).await.unwrap();
        assert!(!h.storage.exists(&resume.object_key).await.unwrap());
        let err = service.get(&owner, resume.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_scan_verdict_requires_service_role() {
        let h = Harness::new().await;
        let owner = student();
        let resume = h.seed_resume(owner.subject_id()).await;
        let service = h.resume_service();

        let err = service
            .record_scan_verdict(&owner, resume.id, ScanStatus::Clean)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);

        let scanner = RequestContext::system(Identity::new(Uuid::new_v4(), Role::Service));
        let updated = service
            .record_scan_verdict(&scanner, resume.id, ScanStatus::Rejected)
            .await
            .unwrap();
        assert_eq!(updated.scan_status, ScanStatus::Rejected);
    }
}
