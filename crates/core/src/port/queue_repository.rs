// Queue Repository Port (Interface)

use crate::domain::{EntryId, EntryStatus, Queue, QueueEntry, QueueId, TherapyType};
use crate::error::Result;
use async_trait::async_trait;

/// Read-side repository interface for queues and entries
///
/// Position-affecting code paths never read through here; they use a
/// `QueueRepositoryTransaction` so reads and writes share one transaction.
#[async_trait]
pub trait QueueRepository: Send + Sync {
    /// Find queue by ID (active or not)
    async fn find_queue(&self, id: &QueueId) -> Result<Option<Queue>>;

    /// Find the active queue for a (clinic, therapy type) pair
    async fn find_active_queue(
        &self,
        clinic_id: &str,
        therapy_type: &TherapyType,
    ) -> Result<Option<Queue>>;

    /// Queues of a clinic, most recently created first
    async fn list_queues(&self, clinic_id: &str, active_only: bool) -> Result<Vec<Queue>>;

    /// Find entry by ID
    async fn find_entry(&self, id: &EntryId) -> Result<Option<QueueEntry>>;

    /// Active entry holding an appointment, in any queue
    async fn find_active_entry_by_appointment(
        &self,
        appointment_id: &str,
    ) -> Result<Option<QueueEntry>>;

    /// Entries of a queue with one of `statuses` (all entries when empty),
    /// in queue order (priority DESC, created_at ASC)
    async fn find_entries(
        &self,
        queue_id: &QueueId,
        statuses: &[EntryStatus],
    ) -> Result<Vec<QueueEntry>>;
}
