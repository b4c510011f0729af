//! In-memory cache implementation using the moka crate.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use moka::Expiry;
use moka::future::Cache;
use tracing::debug;

use resumevault_core::config::cache::MemoryCacheConfig;
use resumevault_core::result::AppResult;
use resumevault_core::traits::cache::CacheProvider;

/// Counter map size above which `incr` drops expired counters.
const COUNTER_SWEEP_THRESHOLD: usize = 10_000;

/// A cached value with its own deadline.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    ttl: Duration,
    expires_at: Instant,
}

impl CacheEntry {
    fn new(value: String, ttl: Duration) -> Self {
        Self {
            value,
            ttl,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_live(&self) -> bool {
        self.expires_at > Instant::now()
    }
}

/// Per-entry expiry policy: every entry lives for its own TTL.
struct EntryExpiry;

impl Expiry<String, CacheEntry> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CacheEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CacheEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// A counter and its optional deadline.
#[derive(Debug, Clone, Copy)]
struct Counter {
    value: i64,
    expires_at: Option<Instant>,
}

impl Counter {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }
}

/// In-memory cache provider using moka with per-entry TTLs.
#[derive(Debug, Clone)]
pub struct MemoryCacheProvider {
    /// The underlying moka cache.
    cache: Cache<String, CacheEntry>,
    /// Default TTL for entries.
    default_ttl: Duration,
    /// Counters stored separately for atomic incr.
    counters: Arc<DashMap<String, Counter>>,
    sweep_threshold: usize,
}

impl MemoryCacheProvider {
    /// Create a new in-memory cache from configuration.
    pub fn new(config: &MemoryCacheConfig, default_ttl_seconds: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .expire_after(EntryExpiry)
            .build();

        Self {
            cache,
            default_ttl: Duration::from_secs(default_ttl_seconds),
            counters: Arc::new(DashMap::new()),
            sweep_threshold: COUNTER_SWEEP_THRESHOLD,
        }
    }

    /// Drop every counter whose window has closed.
    fn sweep_expired_counters(&self, now: Instant) {
        let before = self.counters.len();
        self.counters.retain(|_, counter| counter.is_live(now));
        let removed = before.saturating_sub(self.counters.len());
        if removed > 0 {
            debug!(removed, "Swept expired counters");
        }
    }

    fn live_counter(&self, key: &str) -> Option<Counter> {
        let now = Instant::now();
        let counter = self.counters.get(key).map(|c| *c)?;
        if counter.is_live(now) {
            Some(counter)
        } else {
            self.counters.remove_if(key, |_, c| !c.is_live(now));
            None
        }
    }
}

#[async_trait]
impl CacheProvider for MemoryCacheProvider {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        if let Some(counter) = self.live_counter(key) {
            return Ok(Some(counter.value.to_string()));
        }
        Ok(self
            .cache
            .get(key)
            .await
            .filter(CacheEntry::is_live)
            .map(|entry| entry.value))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        self.cache
            .insert(key.to_string(), CacheEntry::new(value.to_string(), ttl))
            .await;
        Ok(())
    }

    async fn set_default(&self, key: &str, value: &str) -> AppResult<()> {
        self.set(key, value, self.default_ttl).await
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.cache.remove(key).await;
        self.counters.remove(key);
        Ok(())
    }

    async fn take(&self, key: &str) -> AppResult<Option<String>> {
        // `remove` hands the entry to exactly one caller.
        Ok(self
            .cache
            .remove(key)
            .await
            .filter(CacheEntry::is_live)
            .map(|entry| entry.value))
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.get(key).await?.is_some())
    }

    async fn incr(&self, key: &str) -> AppResult<i64> {
        let now = Instant::now();
        if self.counters.len() >= self.sweep_threshold {
            self.sweep_expired_counters(now);
        }
        let mut entry = self.counters.entry(key.to_string()).or_insert(Counter {
            value: 0,
            expires_at: None,
        });
        if !entry.is_live(now) {
            *entry = Counter {
                value: 0,
                expires_at: None,
            };
        }
        entry.value += 1;
        Ok(entry.value)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> AppResult<bool> {
        let now = Instant::now();
        if let Some(mut counter) = self.counters.get_mut(key) {
            if counter.is_live(now) {
                counter.expires_at = Some(now + ttl);
                return Ok(true);
            }
        }
        match self.cache.get(key).await.filter(CacheEntry::is_live) {
            Some(entry) => {
                self.cache
                    .insert(key.to_string(), CacheEntry::new(entry.value, ttl))
                    .await;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn ttl(&self, key: &str) -> AppResult<Option<Duration>> {
        let now = Instant::now();
        if let Some(counter) = self.live_counter(key) {
            return Ok(counter.expires_at.map(|at| at.saturating_duration_since(now)));
        }
        Ok(self
            .cache
            .get(key)
            .await
            .filter(CacheEntry::is_live)
            .map(|entry| entry.expires_at.saturating_duration_since(now)))
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
