// Engine configuration (no magic values in the services)

use crate::domain::{SlotDurations, DEFAULT_MAX_CAPACITY};
use std::time::Duration;

/// Default TTL for cached listings and statistics (5 minutes)
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// How long a mutation waits for its queue lock before giving up (5 seconds)
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Actor recorded in audit events when the caller does not name one
pub const SYSTEM_ACTOR: &str = "system";

/// Longest accepted free-text field (names, notes)
pub const MAX_TEXT_LEN: usize = 2000;

/// Longest accepted identifier (clinic, patient, appointment, therapy type)
pub const MAX_ID_LEN: usize = 128;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Capacity for queues registered without one
    pub default_max_capacity: u32,
    /// TTL for cached read snapshots
    pub cache_ttl: Duration,
    /// Per-queue lock acquisition timeout
    pub lock_timeout: Duration,
    /// Minutes per queue position, per therapy type
    pub slot_durations: SlotDurations,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_max_capacity: DEFAULT_MAX_CAPACITY,
            cache_ttl: DEFAULT_CACHE_TTL,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
            slot_durations: SlotDurations::default(),
        }
    }
}
