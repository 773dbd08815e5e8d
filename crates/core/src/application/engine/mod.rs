// Queue Ordering Engine - insertion, reordering, lifecycle and statistics

pub mod add_entry;
pub mod lifecycle;
pub mod queries;
pub mod reorder;

pub use add_entry::AddEntryRequest;
pub use lifecycle::LifecycleOutcome;
pub use reorder::ReorderSummary;

use crate::application::hooks::{Mutation, MutationHooks, ReadCache};
use crate::application::locks::QueueLocks;
use crate::config::{EngineConfig, SYSTEM_ACTOR};
use crate::domain::{EntryPatch, PatientPosition, QueueEntry, QueueStats, SlotDurations};
use crate::error::{AppError, Result};
use crate::port::{
    cache_keys, AuditOperation, IdProvider, QueueRepository, TimeProvider,
    TransactionalQueueRepository,
};
use std::sync::Arc;
use tracing::info;

const RESOURCE_ENTRY: &str = "queue_entry";
const RESOURCE_QUEUE: &str = "queue";

/// Queue Ordering Engine
///
/// Every position-affecting operation runs under the per-queue lock and inside a
/// single store transaction; cache invalidation and audit happen after commit.
pub struct QueueEngine {
    tx_repo: Arc<dyn TransactionalQueueRepository>,
    repo: Arc<dyn QueueRepository>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
    locks: Arc<QueueLocks>,
    hooks: Arc<MutationHooks>,
    read_cache: Arc<ReadCache>,
    slot_durations: SlotDurations,
}

impl QueueEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tx_repo: Arc<dyn TransactionalQueueRepository>,
        repo: Arc<dyn QueueRepository>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
        locks: Arc<QueueLocks>,
        hooks: Arc<MutationHooks>,
        read_cache: Arc<ReadCache>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            tx_repo,
            repo,
            id_provider,
            time_provider,
            locks,
            hooks,
            read_cache,
            slot_durations: config.slot_durations.clone(),
        }
    }

    /// Add a patient to a queue at the position their priority earns
    pub async fn add_entry(&self, req: AddEntryRequest) -> Result<QueueEntry> {
        add_entry::validate_request(&req)?;

        let guard = self.locks.acquire(&req.queue_id).await?;
        let outcome = add_entry::execute(
            self.tx_repo.as_ref(),
            self.id_provider.as_ref(),
            self.time_provider.as_ref(),
            &self.slot_durations,
            &req,
        )
        .await?;
        drop(guard);

        info!(
            queue_id = %outcome.queue.id,
            entry_id = %outcome.entry.id,
            patient_id = %outcome.entry.patient_id,
            priority = outcome.entry.priority,
            position = ?outcome.entry.position,
            shifted = outcome.shifted,
            "Patient added to queue"
        );

        self.hooks
            .after_commit(Mutation {
                clinic_id: outcome.queue.clinic_id.clone(),
                queue_id: outcome.queue.id.clone(),
                operation: AuditOperation::Add,
                resource_type: RESOURCE_ENTRY,
                resource_id: outcome.entry.id.clone(),
                actor: actor_or_system(req.actor),
                details: Some(serde_json::json!({
                    "patient_id": outcome.entry.patient_id,
                    "appointment_id": outcome.entry.appointment_id,
                    "priority": outcome.entry.priority,
                    "position": outcome.entry.position,
                })),
            })
            .await;

        Ok(outcome.entry)
    }

    /// Recompute dense positions for every active entry of a queue
    pub async fn reorder(&self, queue_id: &str, actor: Option<String>) -> Result<ReorderSummary> {
        let guard = self.locks.acquire(queue_id).await?;
        let (queue, summary) = reorder::execute(
            self.tx_repo.as_ref(),
            self.time_provider.as_ref(),
            &self.slot_durations,
            queue_id,
        )
        .await?;
        drop(guard);

        info!(
            queue_id = %queue.id,
            active = summary.active_entries,
            updated = summary.updated_positions,
            "Queue reordered"
        );

        if summary.updated_positions > 0 {
            self.hooks
                .after_commit(Mutation {
                    clinic_id: queue.clinic_id.clone(),
                    queue_id: queue.id.clone(),
                    operation: AuditOperation::Update,
                    resource_type: RESOURCE_QUEUE,
                    resource_id: queue.id.clone(),
                    actor: actor_or_system(actor),
                    details: Some(serde_json::json!({
                        "reorder": true,
                        "updated_positions": summary.updated_positions,
                    })),
                })
                .await;
        }

        Ok(summary)
    }

    /// WAITING -> IN_PROGRESS
    pub async fn start_entry(&self, entry_id: &str, actor: Option<String>) -> Result<QueueEntry> {
        let guard = self.lock_owning_queue(entry_id).await?;
        let outcome = lifecycle::start(
            self.tx_repo.as_ref(),
            self.time_provider.as_ref(),
            &self.slot_durations,
            entry_id,
        )
        .await?;
        drop(guard);

        self.after_lifecycle(&outcome, AuditOperation::Update, actor, "start")
            .await;
        Ok(outcome.entry)
    }

    /// Complete an active entry; actual wait defaults to minutes since check-in
    pub async fn complete_entry(
        &self,
        entry_id: &str,
        actual_wait_time: Option<u32>,
        actor: Option<String>,
    ) -> Result<QueueEntry> {
        let guard = self.lock_owning_queue(entry_id).await?;
        let outcome = lifecycle::complete(
            self.tx_repo.as_ref(),
            self.time_provider.as_ref(),
            &self.slot_durations,
            entry_id,
            actual_wait_time,
        )
        .await?;
        drop(guard);

        self.after_lifecycle(&outcome, AuditOperation::Update, actor, "complete")
            .await;
        Ok(outcome.entry)
    }

    /// Remove an active entry from its queue
    pub async fn remove_entry(&self, entry_id: &str, actor: Option<String>) -> Result<QueueEntry> {
        let guard = self.lock_owning_queue(entry_id).await?;
        let outcome = lifecycle::remove(
            self.tx_repo.as_ref(),
            self.time_provider.as_ref(),
            &self.slot_durations,
            entry_id,
        )
        .await?;
        drop(guard);

        self.after_lifecycle(&outcome, AuditOperation::Remove, actor, "remove")
            .await;
        Ok(outcome.entry)
    }

    /// Apply a sparse patch to an entry
    pub async fn update_entry(
        &self,
        entry_id: &str,
        patch: EntryPatch,
        actor: Option<String>,
    ) -> Result<QueueEntry> {
        let guard = self.lock_owning_queue(entry_id).await?;
        let outcome = lifecycle::update(
            self.tx_repo.as_ref(),
            self.time_provider.as_ref(),
            &self.slot_durations,
            entry_id,
            &patch,
        )
        .await?;
        drop(guard);

        self.after_lifecycle(&outcome, AuditOperation::Update, actor, "update")
            .await;
        Ok(outcome.entry)
    }

    /// Live position of an appointment (authoritative read)
    pub async fn patient_position(&self, appointment_id: &str) -> Result<PatientPosition> {
        queries::patient_position(self.repo.as_ref(), appointment_id).await
    }

    /// Queue statistics (may be served from cache)
    pub async fn stats(&self, queue_id: &str) -> Result<QueueStats> {
        let key = cache_keys::queue_stats(queue_id);
        let repo = &self.repo;
        self.read_cache
            .get_or_load(&key, || async move {
                queries::queue_stats(repo.as_ref(), queue_id).await
            })
            .await
    }

    /// Entries never change queue, so the owning queue can be read before locking
    async fn lock_owning_queue(
        &self,
        entry_id: &str,
    ) -> Result<tokio::sync::OwnedMutexGuard<()>> {
        let entry = self
            .repo
            .find_entry(&entry_id.to_string())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Entry {} not found", entry_id)))?;
        self.locks.acquire(&entry.queue_id).await
    }

    async fn after_lifecycle(
        &self,
        outcome: &LifecycleOutcome,
        operation: AuditOperation,
        actor: Option<String>,
        action: &str,
    ) {
        info!(
            queue_id = %outcome.queue.id,
            entry_id = %outcome.entry.id,
            status = %outcome.entry.status,
            reordered = outcome.reorder.as_ref().map(|r| r.updated_positions),
            action,
            "Entry updated"
        );

        self.hooks
            .after_commit(Mutation {
                clinic_id: outcome.queue.clinic_id.clone(),
                queue_id: outcome.queue.id.clone(),
                operation,
                resource_type: RESOURCE_ENTRY,
                resource_id: outcome.entry.id.clone(),
                actor: actor_or_system(actor),
                details: Some(serde_json::json!({
                    "action": action,
                    "status": outcome.entry.status,
                    "position": outcome.entry.position,
                    "actual_wait_time": outcome.entry.actual_wait_time,
                })),
            })
            .await;
    }
}

fn actor_or_system(actor: Option<String>) -> String {
    actor.unwrap_or_else(|| SYSTEM_ACTOR.to_string())
}
