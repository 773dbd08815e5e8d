// Transaction port for atomic read-compute-write sequences

use crate::domain::ordering::PositionUpdate;
use crate::domain::{EntryId, Queue, QueueEntry, QueueId, TherapyType};
use crate::error::Result;
use async_trait::async_trait;

/// Transaction trait for atomic multi-step operations
///
/// Dropping a transaction without committing rolls it back.
#[async_trait]
pub trait Transaction: Send {
    /// Commit the transaction
    async fn commit(self: Box<Self>) -> Result<()>;

    /// Rollback the transaction
    async fn rollback(self: Box<Self>) -> Result<()>;
}

/// Transactional queue store
#[async_trait]
pub trait TransactionalQueueRepository: Send + Sync {
    /// Begin a new transaction
    async fn begin_transaction(&self) -> Result<Box<dyn QueueRepositoryTransaction>>;
}

/// Queue store operations within a transaction
#[async_trait]
pub trait QueueRepositoryTransaction: Transaction {
    async fn find_queue(&mut self, id: &QueueId) -> Result<Option<Queue>>;

    async fn find_active_queue(
        &mut self,
        clinic_id: &str,
        therapy_type: &TherapyType,
    ) -> Result<Option<Queue>>;

    async fn insert_queue(&mut self, queue: &Queue) -> Result<()>;

    /// Persist name/capacity/active flag changes
    async fn update_queue(&mut self, queue: &Queue) -> Result<()>;

    /// Atomically bump the booking counter, returning the new value
    async fn increment_booking_counter(&mut self, queue_id: &QueueId, now: i64) -> Result<i64>;

    async fn find_entry(&mut self, id: &EntryId) -> Result<Option<QueueEntry>>;

    /// WAITING + IN_PROGRESS entries, ordered by priority DESC, created_at ASC, id ASC
    async fn active_entries(&mut self, queue_id: &QueueId) -> Result<Vec<QueueEntry>>;

    async fn insert_entry(&mut self, entry: &QueueEntry) -> Result<()>;

    async fn update_entry(&mut self, entry: &QueueEntry) -> Result<()>;

    /// Write new positions and wait estimates, returning rows updated
    async fn apply_positions(&mut self, updates: &[PositionUpdate], now: i64) -> Result<u64>;
}
