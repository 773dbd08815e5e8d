// Queue Registry - named queues per clinic and therapy type

pub mod create;

pub use create::CreateQueueRequest;

use crate::application::hooks::{Mutation, MutationHooks, ReadCache};
use crate::application::locks::{registration_key, QueueLocks};
use crate::config::{EngineConfig, SYSTEM_ACTOR};
use crate::domain::{EntryStatus, Queue, QueueWithEntries, TherapyType};
use crate::error::{AppError, Result};
use crate::port::{
    cache_keys, AuditOperation, IdProvider, QueueRepository, TimeProvider,
    TransactionalQueueRepository,
};
use std::sync::Arc;
use tracing::info;

const RESOURCE_QUEUE: &str = "queue";

/// Queue Registry
///
/// Owns queue creation and lookup and the one-active-queue-per-pair rule.
pub struct QueueRegistry {
    tx_repo: Arc<dyn TransactionalQueueRepository>,
    repo: Arc<dyn QueueRepository>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
    locks: Arc<QueueLocks>,
    hooks: Arc<MutationHooks>,
    read_cache: Arc<ReadCache>,
    default_max_capacity: u32,
}

impl QueueRegistry {
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
            default_max_capacity: config.default_max_capacity,
        }
    }

    /// Register a new active queue for a (clinic, therapy type) pair
    pub async fn create_queue(&self, req: CreateQueueRequest) -> Result<Queue> {
        create::validate_request(&req)?;

        let therapy_type = TherapyType::new(&req.therapy_type);
        let _guard = self
            .locks
            .acquire(&registration_key(&req.clinic_id, therapy_type.as_str()))
            .await?;

        let queue = create::execute(
            self.tx_repo.as_ref(),
            self.id_provider.as_ref(),
            self.time_provider.as_ref(),
            self.default_max_capacity,
            &req,
        )
        .await?;

        info!(
            queue_id = %queue.id,
            clinic_id = %queue.clinic_id,
            therapy_type = %queue.therapy_type,
            max_capacity = queue.max_capacity,
            "Queue created"
        );

        self.hooks
            .after_commit(Mutation {
                clinic_id: queue.clinic_id.clone(),
                queue_id: queue.id.clone(),
                operation: AuditOperation::Create,
                resource_type: RESOURCE_QUEUE,
                resource_id: queue.id.clone(),
                actor: req.actor.unwrap_or_else(|| SYSTEM_ACTOR.to_string()),
                details: Some(serde_json::json!({
                    "therapy_type": queue.therapy_type,
                    "name": queue.name,
                    "max_capacity": queue.max_capacity,
                })),
            })
            .await;

        Ok(queue)
    }

    /// Active queue for a (clinic, therapy type) pair (may be served from cache)
    pub async fn get_queue(&self, clinic_id: &str, therapy_type: &str) -> Result<Queue> {
        let therapy_type = TherapyType::new(therapy_type);
        let key = cache_keys::queue_by_type(clinic_id, &therapy_type);
        let repo = &self.repo;

        self.read_cache
            .get_or_load(&key, || async move {
                repo.find_active_queue(clinic_id, &therapy_type)
                    .await?
                    .ok_or_else(|| {
                        AppError::NotFound(format!(
                            "No active {} queue for clinic {}",
                            therapy_type, clinic_id
                        ))
                    })
            })
            .await
    }

    /// Queues of a clinic with their active entries in position order,
    /// most recently created first (may be served from cache)
    pub async fn list_queues(
        &self,
        clinic_id: &str,
        active_only: bool,
    ) -> Result<Vec<QueueWithEntries>> {
        let key = cache_keys::clinic_queues(clinic_id, active_only);
        let repo = &self.repo;

        self.read_cache
            .get_or_load(&key, || async move {
                let queues = repo.list_queues(clinic_id, active_only).await?;
                let mut listing = Vec::with_capacity(queues.len());
                for queue in queues {
                    let entries = repo
                        .find_entries(&queue.id, &EntryStatus::ACTIVE)
                        .await?;
                    listing.push(QueueWithEntries { queue, entries });
                }
                Ok(listing)
            })
            .await
    }

    /// Deactivate a queue; its entries are kept for history.
    ///
    /// Deactivating an inactive queue is a no-op.
    pub async fn deactivate_queue(&self, queue_id: &str, actor: Option<String>) -> Result<Queue> {
        let _guard = self.locks.acquire(queue_id).await?;

        let mut tx = self.tx_repo.begin_transaction().await?;
        let mut queue = tx
            .find_queue(&queue_id.to_string())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Queue {} not found", queue_id)))?;

        if !queue.is_active {
            tx.rollback().await?;
            return Ok(queue);
        }

        queue.deactivate(self.time_provider.now_millis());
        tx.update_queue(&queue).await?;
        tx.commit().await?;

        info!(queue_id = %queue.id, clinic_id = %queue.clinic_id, "Queue deactivated");

        self.hooks
            .after_commit(Mutation {
                clinic_id: queue.clinic_id.clone(),
                queue_id: queue.id.clone(),
                operation: AuditOperation::Update,
                resource_type: RESOURCE_QUEUE,
                resource_id: queue.id.clone(),
                actor: actor.unwrap_or_else(|| SYSTEM_ACTOR.to_string()),
                details: Some(serde_json::json!({ "is_active": false })),
            })
            .await;

        Ok(queue)
    }
}
