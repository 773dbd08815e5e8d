// moka-backed Cache implementation

use async_trait::async_trait;
use moka::future::Cache as MokaFutureCache;
use moka::Expiry;
use std::time::{Duration, Instant};
use tracing::debug;
use vaidya_core::error::{AppError, Result};
use vaidya_core::port::Cache;

/// Upper bound on cached snapshots
const DEFAULT_MAX_ENTRIES: u64 = 10_000;

#[derive(Debug, Clone)]
struct CachedValue {
    value: serde_json::Value,
    ttl: Duration,
}

/// Per-entry TTL taken from the value itself
struct PerEntryTtl;

impl Expiry<String, CachedValue> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedValue,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// In-process cache for queue listings and statistics
#[derive(Clone)]
pub struct MokaCache {
    inner: MokaFutureCache<String, CachedValue>,
}

impl MokaCache {
    pub fn new() -> Self {
        Self::with_max_entries(DEFAULT_MAX_ENTRIES)
    }

    pub fn with_max_entries(max_entries: u64) -> Self {
        let inner = MokaFutureCache::builder()
            .max_capacity(max_entries)
            .expire_after(PerEntryTtl)
            .support_invalidation_closures()
            .build();
        Self { inner }
    }
}

impl Default for MokaCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Cache for MokaCache {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>> {
        Ok(self.inner.get(key).await.map(|cached| cached.value))
    }

    async fn set(&self, key: &str, value: serde_json::Value, ttl: Duration) -> Result<()> {
        self.inner
            .insert(key.to_string(), CachedValue { value, ttl })
            .await;
        Ok(())
    }

    async fn invalidate(&self, key: &str) -> Result<()> {
        self.inner.invalidate(key).await;
        Ok(())
    }

    async fn invalidate_prefix(&self, prefix: &str) -> Result<()> {
        let prefix = prefix.to_string();
        debug!(prefix = %prefix, "Invalidating cache prefix");
        self.inner
            .invalidate_entries_if(move |key, _| key.starts_with(&prefix))
            .map(|_| ())
            .map_err(|e| AppError::Internal(format!("Cache prefix invalidation failed: {}", e)))
    }
}
