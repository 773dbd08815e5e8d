// Domain Layer - Pure business logic and entities

pub mod entry;
pub mod error;
pub mod ordering;
pub mod queue;
pub mod stats;
pub mod wait_time;

// Re-exports
pub use entry::{EntryId, EntryPatch, EntryStatus, PatchEffect, PatientId, QueueEntry};
pub use error::DomainError;
pub use queue::{ClinicId, Queue, QueueId, QueueWithEntries, TherapyType};
pub use stats::{PatientPosition, QueueStats};
pub use wait_time::SlotDurations;

/// Priority (higher number = more urgent)
pub type Priority = i32;

/// Lowest accepted priority
pub const MIN_PRIORITY: Priority = -100;

/// Highest accepted priority
pub const MAX_PRIORITY: Priority = 100;

/// Capacity used when a queue is registered without one
pub const DEFAULT_MAX_CAPACITY: u32 = 10;

/// Validate a priority value against the accepted range
pub fn validate_priority(priority: Priority) -> error::Result<()> {
    if !(MIN_PRIORITY..=MAX_PRIORITY).contains(&priority) {
        return Err(DomainError::InvalidPriority(priority));
    }
    Ok(())
}
