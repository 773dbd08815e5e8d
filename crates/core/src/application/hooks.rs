// Post-commit hooks: cache invalidation and audit events
//
// Services call these only after the store transaction committed. Failures are
// logged and swallowed; they never fail the operation that triggered them.
// Audit records are written on a detached task.

use crate::port::{cache_keys, AuditEvent, AuditLog, AuditOperation, Cache, TimeProvider};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// A committed change to a queue or one of its entries
#[derive(Debug, Clone)]
pub struct Mutation {
    pub clinic_id: String,
    pub queue_id: String,
    pub operation: AuditOperation,
    pub resource_type: &'static str,
    pub resource_id: String,
    pub actor: String,
    pub details: Option<serde_json::Value>,
}

pub struct MutationHooks {
    cache: Arc<dyn Cache>,
    audit: Arc<dyn AuditLog>,
    time_provider: Arc<dyn TimeProvider>,
}

impl MutationHooks {
    pub fn new(
        cache: Arc<dyn Cache>,
        audit: Arc<dyn AuditLog>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            cache,
            audit,
            time_provider,
        }
    }

    pub async fn after_commit(&self, mutation: Mutation) {
        self.invalidate(&mutation.clinic_id, &mutation.queue_id).await;

        let event = AuditEvent {
            operation: mutation.operation,
            resource_type: mutation.resource_type.to_string(),
            resource_id: mutation.resource_id,
            actor: mutation.actor,
            timestamp: self.time_provider.now_millis(),
            details: mutation.details,
        };
        // Detached; mutation latency excludes the audit write
        let audit = Arc::clone(&self.audit);
        let queue_id = mutation.queue_id;
        tokio::spawn(async move {
            if let Err(e) = audit.record(event).await {
                warn!(error = %e, queue_id = %queue_id, "Audit log write failed (ignored)");
            }
        });
    }

    async fn invalidate(&self, clinic_id: &str, queue_id: &str) {
        let prefixes = [
            cache_keys::clinic_queues_prefix(clinic_id),
            cache_keys::queue_by_type_prefix(clinic_id),
        ];
        for prefix in &prefixes {
            if let Err(e) = self.cache.invalidate_prefix(prefix).await {
                warn!(error = %e, prefix = %prefix, "Cache invalidation failed (ignored)");
            }
        }
        let stats_key = cache_keys::queue_stats(queue_id);
        if let Err(e) = self.cache.invalidate(&stats_key).await {
            warn!(error = %e, key = %stats_key, "Cache invalidation failed (ignored)");
        }
        debug!(clinic_id = %clinic_id, queue_id = %queue_id, "Caches invalidated");
    }
}

/// Read-through helper for eventually consistent snapshots
pub struct ReadCache {
    cache: Arc<dyn Cache>,
    ttl: Duration,
}

impl ReadCache {
    pub fn new(cache: Arc<dyn Cache>, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    /// Serve `key` from the cache, or run `load` and store its result
    pub async fn get_or_load<T, F, Fut>(&self, key: &str, load: F) -> crate::Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = crate::Result<T>>,
    {
        match self.cache.get(key).await {
            Ok(Some(value)) => match serde_json::from_value(value) {
                Ok(hit) => {
                    debug!(key = %key, "Cache hit");
                    return Ok(hit);
                }
                Err(e) => warn!(error = %e, key = %key, "Discarding undecodable cache value"),
            },
            Ok(None) => {}
            Err(e) => warn!(error = %e, key = %key, "Cache read failed (treated as miss)"),
        }

        let fresh = load().await?;
        match serde_json::to_value(&fresh) {
            Ok(value) => {
                if let Err(e) = self.cache.set(key, value, self.ttl).await {
                    warn!(error = %e, key = %key, "Cache write failed (ignored)");
                }
            }
            Err(e) => warn!(error = %e, key = %key, "Snapshot not serializable, not cached"),
        }
        Ok(fresh)
    }
}
