// Entry lifecycle use cases: start, complete, remove, patch

use crate::application::engine::reorder::{reorder_in_tx, ReorderSummary};
use crate::domain::{EntryPatch, PatchEffect, Queue, QueueEntry, SlotDurations};
use crate::error::{AppError, Result};
use crate::port::{TimeProvider, TransactionalQueueRepository};

/// Entry after the change, with the reorder pass it triggered (if any)
#[derive(Debug, Clone)]
pub struct LifecycleOutcome {
    pub queue: Queue,
    pub entry: QueueEntry,
    pub reorder: Option<ReorderSummary>,
}

/// WAITING -> IN_PROGRESS; the entry stays active so nothing is reordered
pub async fn start(
    queue_repo: &dyn TransactionalQueueRepository,
    time_provider: &dyn TimeProvider,
    slot_durations: &SlotDurations,
    entry_id: &str,
) -> Result<LifecycleOutcome> {
    apply_change(queue_repo, time_provider, slot_durations, entry_id, |entry, now| {
        entry.start(now)?;
        Ok(PatchEffect::KeepsOrder)
    })
    .await
}

/// Active -> COMPLETED, then reorder the remaining active entries
pub async fn complete(
    queue_repo: &dyn TransactionalQueueRepository,
    time_provider: &dyn TimeProvider,
    slot_durations: &SlotDurations,
    entry_id: &str,
    actual_wait_time: Option<u32>,
) -> Result<LifecycleOutcome> {
    apply_change(queue_repo, time_provider, slot_durations, entry_id, |entry, now| {
        entry.complete(now, actual_wait_time)?;
        Ok(PatchEffect::LeavesActiveSet)
    })
    .await
}

/// Active -> REMOVED, then reorder the remaining active entries
pub async fn remove(
    queue_repo: &dyn TransactionalQueueRepository,
    time_provider: &dyn TimeProvider,
    slot_durations: &SlotDurations,
    entry_id: &str,
) -> Result<LifecycleOutcome> {
    apply_change(queue_repo, time_provider, slot_durations, entry_id, |entry, now| {
        entry.remove(now)?;
        Ok(PatchEffect::LeavesActiveSet)
    })
    .await
}

/// Sparse patch. Terminal status or a priority/position change on an active
/// entry re-ranks the queue; the entry keeps its arrival time.
pub async fn update(
    queue_repo: &dyn TransactionalQueueRepository,
    time_provider: &dyn TimeProvider,
    slot_durations: &SlotDurations,
    entry_id: &str,
    patch: &EntryPatch,
) -> Result<LifecycleOutcome> {
    if patch.is_empty() {
        return Err(AppError::Validation("patch has no fields".to_string()));
    }
    apply_change(queue_repo, time_provider, slot_durations, entry_id, |entry, now| {
        Ok(patch.apply(entry, now)?)
    })
    .await
}

async fn apply_change<F>(
    queue_repo: &dyn TransactionalQueueRepository,
    time_provider: &dyn TimeProvider,
    slot_durations: &SlotDurations,
    entry_id: &str,
    change: F,
) -> Result<LifecycleOutcome>
where
    F: FnOnce(&mut QueueEntry, i64) -> Result<PatchEffect> + Send,
{
    let mut tx = queue_repo.begin_transaction().await?;
    let entry_key = entry_id.to_string();

    let mut entry = tx
        .find_entry(&entry_key)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Entry {} not found", entry_id)))?;

    let queue = tx.find_queue(&entry.queue_id).await?.ok_or_else(|| {
        AppError::Internal(format!(
            "Entry {} references missing queue {}",
            entry.id, entry.queue_id
        ))
    })?;

    let now = time_provider.now_millis();
    let effect = change(&mut entry, now)?;
    tx.update_entry(&entry).await?;

    let reorder = if effect.requires_reorder() {
        let summary = reorder_in_tx(&mut tx, &queue, slot_durations, now).await?;
        entry = tx.find_entry(&entry_key).await?.ok_or_else(|| {
            AppError::Internal(format!("Entry {} vanished during reorder", entry_key))
        })?;
        Some(summary)
    } else {
        None
    };

    tx.commit().await?;

    Ok(LifecycleOutcome {
        queue,
        entry,
        reorder,
    })
}
