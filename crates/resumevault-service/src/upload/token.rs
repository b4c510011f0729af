//! Upload token manager: issues and redeems single-use upload slots.
//!
//! A slot binds a freshly generated storage key to the requesting owner.
//! The binding lives in the cache with a hard TTL, so unredeemed slots
//! disappear on their own.

use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Local, TimeZone, Utc};
use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use resumevault_cache::{CacheManager, keys};
use resumevault_core::config::UploadConfig;
use resumevault_core::config::upload::MAX_TOKEN_TTL_SECONDS;
use resumevault_core::error::AppError;
use resumevault_core::result::AppResult;
use resumevault_core::traits::storage::StorageProvider;
use resumevault_database::repositories::ResumeRepository;
use resumevault_entity::upload::UploadBinding;
use resumevault_storage::StorageManager;

use super::validation;
use crate::context::RequestContext;

/// Random bytes per upload token (256 bits).
const TOKEN_BYTES: usize = 32;

/// An issued upload slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadSlot {
    /// Storage key the client must upload to.
    pub object_key: String,
    /// Opaque single-use token to present on confirmation.
    pub token: String,
    /// Signed URL accepting the upload.
    pub upload_url: String,
    /// HTTP method for the upload URL.
    pub method: String,
    /// Seconds until the slot expires.
    pub expires_in: u64,
}

/// Issues and redeems upload slots.
#[derive(Debug, Clone)]
pub struct UploadTokenManager {
    resumes: Arc<dyn ResumeRepository>,
    cache: CacheManager,
    storage: Arc<StorageManager>,
    config: UploadConfig,
}

impl UploadTokenManager {
    pub fn new(
        resumes: Arc<dyn ResumeRepository>,
        cache: CacheManager,
        storage: Arc<StorageManager>,
        config: UploadConfig,
    ) -> Self {
        Self {
            resumes,
            cache,
            storage,
            config,
        }
    }

    fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.config.token_ttl_seconds.clamp(1, MAX_TOKEN_TTL_SECONDS))
    }

    /// Issue an upload slot for the calling owner.
    pub async fn issue_slot(&self, ctx: &RequestContext, content_type: &str) -> AppResult<UploadSlot> {
        let owner_id = ctx.subject_id();
        validation::validate_mime_type(content_type, &self.config.allowed_mime_types)?;

        let now = ctx.request_time;
        let (day_start, next_day) = local_day_bounds(now);
        let uploaded_today = self.resumes.count_uploaded_since(owner_id, day_start).await?;
        if uploaded_today >= u64::from(self.config.daily_quota) {
            let retry_after = (next_day - now)
                .to_std()
                .unwrap_or(Duration::from_secs(1))
                .max(Duration::from_secs(1));
            return Err(AppError::quota_exceeded(
                format!(
                    "Daily upload limit of {} resumes reached",
                    self.config.daily_quota
                ),
                retry_after,
            ));
        }

        let object_key = format!(
            "resumes/{owner_id}/{}.{}",
            Uuid::new_v4(),
            validation::extension_for(content_type)
        );
        let ttl = self.token_ttl();
        let signed = self
            .storage
            .presign_upload(&object_key, content_type, ttl)
            .await?;

        let token = generate_token();
        let binding = UploadBinding {
            owner_id,
            object_key: object_key.clone(),
            content_type: content_type.trim().to_ascii_lowercase(),
            expires_at: now + chrono::Duration::seconds(ttl.as_secs() as i64),
        };
        self.cache
            .set_json(&keys::upload_token(&token), &binding, ttl)
            .await?;

        info!(
            owner_id = %owner_id,
            object_key = %object_key,
            expires_in = ttl.as_secs(),
            "Upload slot issued"
        );

        Ok(UploadSlot {
            object_key,
            token,
            upload_url: signed.url,
            method: signed.method,
            expires_in: ttl.as_secs(),
        })
    }

    /// Redeem an upload token. The binding is consumed on success.
    ///
    /// A mismatching owner does not consume the token.
    pub async fn redeem_slot(&self, ctx: &RequestContext, token: &str) -> AppResult<UploadBinding> {
        let key = keys::upload_token(token);
        let binding: UploadBinding = self
            .cache
            .get_json(&key)
            .await?
            .ok_or_else(|| AppError::token_invalid("Upload token is unknown or expired"))?;

        if binding.is_expired_at(Utc::now()) {
            return Err(AppError::token_invalid("Upload token is unknown or expired"));
        }

        if binding.owner_id != ctx.subject_id() {
            warn!(
                owner_id = %binding.owner_id,
                caller = %ctx.subject_id(),
                "Upload token presented by a different identity"
            );
            return Err(AppError::token_owner_mismatch(
                "Upload token was issued to a different user",
            ));
        }

        // Only the caller that removes the entry wins a concurrent redeem.
        let taken: Option<UploadBinding> = self.cache.take_json(&key).await?;
        match taken {
            Some(binding) => Ok(binding),
            None => Err(AppError::token_invalid("Upload token is unknown or expired")),
        }
    }
}

/// Generate an unguessable URL-safe token.
fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Start of the server-local day containing `now`, and the start of the next.
fn local_day_bounds(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let local_date = now.with_timezone(&Local).date_naive();
    let midnight = |date: chrono::NaiveDate| {
        date.and_hms_opt(0, 0, 0)
            .and_then(|naive| Local.from_local_datetime(&naive).earliest())
            .map(|dt| dt.with_timezone(&Utc))
    };
    let start = midnight(local_date).unwrap_or(now - chrono::Duration::hours(24));
    let next = local_date
        .succ_opt()
        .and_then(midnight)
        .unwrap_or(start + chrono::Duration::hours(24));
    (start, next)
}
