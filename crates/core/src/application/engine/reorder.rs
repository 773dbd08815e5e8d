// Reorder Use Case: full dense recompute of active positions

use crate::domain::{ordering, Queue, QueueId, SlotDurations};
use crate::error::{AppError, Result};
use crate::port::{QueueRepositoryTransaction, TimeProvider, TransactionalQueueRepository};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Result of one reorder pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderSummary {
    pub queue_id: QueueId,
    pub active_entries: u32,
    /// Rows whose position or wait estimate changed
    pub updated_positions: u64,
}

/// Recompute positions inside an open transaction
///
/// Reads the active set from the store, never from a cache.
pub async fn reorder_in_tx(
    tx: &mut Box<dyn QueueRepositoryTransaction>,
    queue: &Queue,
    slot_durations: &SlotDurations,
    now: i64,
) -> Result<ReorderSummary> {
    let mut active = tx.active_entries(&queue.id).await?;
    ordering::sort_active(&mut active);

    let slot_minutes = slot_durations.slot_minutes(&queue.therapy_type);
    let updates = ordering::plan_reorder(&active, slot_minutes);

    let updated_positions = if updates.is_empty() {
        0
    } else {
        tx.apply_positions(&updates, now).await?
    };

    debug!(
        queue_id = %queue.id,
        active = active.len(),
        updated = updated_positions,
        "Reorder pass"
    );

    Ok(ReorderSummary {
        queue_id: queue.id.clone(),
        active_entries: active.len() as u32,
        updated_positions,
    })
}

/// Execute a standalone reorder (one transaction). The caller holds the queue lock.
pub async fn execute(
    queue_repo: &dyn TransactionalQueueRepository,
    time_provider: &dyn TimeProvider,
    slot_durations: &SlotDurations,
    queue_id: &str,
) -> Result<(Queue, ReorderSummary)> {
    let mut tx = queue_repo.begin_transaction().await?;

    let queue = tx
        .find_queue(&queue_id.to_string())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Queue {} not found", queue_id)))?;

    let summary =
        reorder_in_tx(&mut tx, &queue, slot_durations, time_provider.now_millis()).await?;

    tx.commit().await?;
    Ok((queue, summary))
}
