//! Sliding-window limiter over the access log.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use resumevault_core::error::AppError;
use resumevault_core::result::AppResult;
use resumevault_database::repositories::AccessLogRepository;

use super::{AccessRateLimiter, MIN_RETRY_AFTER, RateDecision};

#[derive(Debug, Clone)]
pub struct AuditLogLimiter {
    access_logs: Arc<dyn AccessLogRepository>,
    window: Duration,
    max_requests: u32,
}

impl AuditLogLimiter {
    pub fn new(
        access_logs: Arc<dyn AccessLogRepository>,
        window: Duration,
        max_requests: u32,
    ) -> Self {
        Self {
            access_logs,
            window,
            max_requests,
        }
    }
}

#[async_trait]
impl AccessRateLimiter for AuditLogLimiter {
    async fn check_and_record(
        &self,
        resume_id: Uuid,
        company_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<RateDecision> {
        let window = chrono::Duration::from_std(self.window)
            .map_err(|e| AppError::configuration(format!("Invalid rate limit window: {e}")))?;
        let usage = self
            .access_logs
            .window_usage(resume_id, company_id, now - window)
            .await?;

        if usage.count < u64::from(self.max_requests) {
            return Ok(RateDecision::Allow);
        }

        let retry_after = usage
            .oldest
            .and_then(|oldest| (oldest + window - now).to_std().ok())
            .unwrap_or(self.window)
            .max(MIN_RETRY_AFTER);

        debug!(
            resume_id = %resume_id,
            company_id = %company_id,
            count = usage.count,
            retry_after_secs = retry_after.as_secs(),
            "Access rate limit reached"
        );

        Ok(RateDecision::Deny { retry_after })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resumevault_database::MemoryDatabase;
    use resumevault_entity::access::{AccessType, CreateAccessLog};

    async fn log_at(db: &MemoryDatabase, resume_id: Uuid, company_id: Uuid, at: DateTime<Utc>) {
        db.append(&CreateAccessLog {
            resume_id,
            company_id,
            actor_id: Uuid::new_v4(),
            access_type: AccessType::View,
            accessed_at: at,
            ip_address: None,
            user_agent: None,
            token_hash: "hash".to_string(),
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_denies_at_limit_with_retry_hint() {
        let db = Arc::new(MemoryDatabase::new());
        let limiter = AuditLogLimiter::new(db.clone(), Duration::from_secs(3600), 2);
        let (resume, company) = (Uuid::new_v4(), Uuid::new_v4());
        let now = Utc::now();

        log_at(&db, resume, company, now - chrono::Duration::minutes(50)).await;
        assert_eq!(
            limiter.check_and_record(resume, company, now).await.unwrap(),
            RateDecision::Allow
        );

        log_at(&db, resume, company, now - chrono::Duration::minutes(10)).await;
        let decision = limiter.check_and_record(resume, company, now).await.unwrap();
        assert_eq!(
            decision,
            RateDecision::Deny {
                retry_after: Duration::from_secs(600)
            }
        );
        assert!(decision.into_result().is_err());

        // Other companies are counted separately.
        assert_eq!(
            limiter
                .check_and_record(resume, Uuid::new_v4(), now)
                .await
                .unwrap(),
            RateDecision::Allow
        );
    }

    #[tokio::test]
    async fn test_entries_outside_window_do_not_count() {
        let db = Arc::new(MemoryDatabase::new());
        let limiter = AuditLogLimiter::new(db.clone(), Duration::from_secs(3600), 1);
        let (resume, company) = (Uuid::new_v4(), Uuid::new_v4());
        let now = Utc::now();

        log_at(&db, resume, company, now - chrono::Duration::hours(2)).await;
        assert_eq!(
            limiter.check_and_record(resume, company, now).await.unwrap(),
            RateDecision::Allow
        );
    }
}
