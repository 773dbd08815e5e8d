// Cache port: key/value with TTL and prefix invalidation

use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Read cache for listings and statistics
///
/// Values are JSON snapshots. Callers treat every failure as a miss.
#[async_trait]
pub trait Cache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>>;

    async fn set(&self, key: &str, value: serde_json::Value, ttl: Duration) -> Result<()>;

    async fn invalidate(&self, key: &str) -> Result<()>;

    /// Drop every key starting with `prefix`
    async fn invalidate_prefix(&self, prefix: &str) -> Result<()>;
}

/// Cache key layout shared by readers and invalidation hooks
pub mod cache_keys {
    use crate::domain::TherapyType;

    /// `queues:clinic:{clinicId}:{active|all}`
    pub fn clinic_queues(clinic_id: &str, active_only: bool) -> String {
        let filter = if active_only { "active" } else { "all" };
        format!("queues:clinic:{}:{}", clinic_id, filter)
    }

    pub fn clinic_queues_prefix(clinic_id: &str) -> String {
        format!("queues:clinic:{}:", clinic_id)
    }

    /// `queue:clinic:{clinicId}:type:{therapyType}`
    pub fn queue_by_type(clinic_id: &str, therapy_type: &TherapyType) -> String {
        format!("queue:clinic:{}:type:{}", clinic_id, therapy_type)
    }

    pub fn queue_by_type_prefix(clinic_id: &str) -> String {
        format!("queue:clinic:{}:", clinic_id)
    }

    /// `queue-stats:{queueId}`
    pub fn queue_stats(queue_id: &str) -> String {
        format!("queue-stats:{}", queue_id)
    }
}
