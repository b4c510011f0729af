//! Fixed-window counter limiter backed by the cache.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use resumevault_cache::{CacheManager, keys};
use resumevault_core::result::AppResult;
use resumevault_core::traits::cache::CacheProvider;

use super::{AccessRateLimiter, MIN_RETRY_AFTER, RateDecision};

#[derive(Debug, Clone)]
pub struct CounterLimiter {
    cache: CacheManager,
    window: Duration,
    max_requests: u32,
}

impl CounterLimiter {
    pub fn new(cache: CacheManager, window: Duration, max_requests: u32) -> Self {
        Self {
            cache,
            window,
            max_requests,
        }
    }
}

#[async_trait]
impl AccessRateLimiter for CounterLimiter {
    async fn check_and_record(
        &self,
        resume_id: Uuid,
        company_id: Uuid,
        _now: DateTime<Utc>,
    ) -> AppResult<RateDecision> {
        let key = keys::access_window(resume_id, company_id);
        let count = self.cache.incr(&key).await?;
        if count == 1 {
            self.cache.expire(&key, self.window).await?;
        }

        if count <= i64::from(self.max_requests) {
            return Ok(RateDecision::Allow);
        }

        let retry_after = match self.cache.ttl(&key).await? {
            Some(ttl) => ttl,
            None => {
                // Counter lost its expiry; restart the window.
                self.cache.expire(&key, self.window).await?;
                self.window
            }
        }
        .max(MIN_RETRY_AFTER);

        debug!(
            resume_id = %resume_id,
            company_id = %company_id,
            count,
            retry_after_secs = retry_after.as_secs(),
            "Access rate limit reached"
        );

        Ok(RateDecision::Deny { retry_after })
    }
}
