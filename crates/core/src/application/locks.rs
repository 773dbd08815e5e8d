// Per-queue mutual exclusion for read-compute-write sequences

use crate::error::{AppError, Result};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::warn;

/// One async mutex per key (queue ID, or clinic/therapy pair for registration).
///
/// Holders of different keys never block each other.
pub struct QueueLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
    timeout: Duration,
}

impl QueueLocks {
    pub fn new(timeout: Duration) -> Self {
        Self {
            locks: DashMap::new(),
            timeout,
        }
    }

    /// Acquire the lock for `key`, or fail with `ConcurrencyConflict` after the timeout
    pub async fn acquire(&self, key: &str) -> Result<OwnedMutexGuard<()>> {
        let lock = self
            .locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        match tokio::time::timeout(self.timeout, lock.lock_owned()).await {
            Ok(guard) => Ok(guard),
            Err(_) => {
                warn!(key = %key, timeout_ms = self.timeout.as_millis() as u64, "Queue lock timed out");
                Err(AppError::ConcurrencyConflict(format!(
                    "Timed out waiting for lock on {}",
                    key
                )))
            }
        }
    }

    /// Number of keys that have ever been locked
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// Lock key guarding registration of a (clinic, therapy type) pair
pub fn registration_key(clinic_id: &str, therapy_type: &str) -> String {
    format!("register:{}:{}", clinic_id, therapy_type)
}
