//! RPC Method Handlers
//!
//! Thin adapters from JSON-RPC params to the registry and engine.

use crate::error::to_rpc_error;
use crate::types::{
    AddEntryRequest, CompleteEntryRequest, CreateQueueRequest, EntryActionRequest,
    GetQueueByTypeRequest, ListQueuesRequest, PatientPosition, PatientPositionRequest, Queue,
    QueueActionRequest, QueueEntry, QueueStats, QueueStatsRequest, QueueWithEntries,
    ReorderSummary, UpdateEntryRequest,
};
use jsonrpsee::types::ErrorObjectOwned;
use std::sync::Arc;
use vaidya_core::application::{QueueEngine, QueueRegistry};

type RpcResult<T> = Result<T, ErrorObjectOwned>;

/// RPC Handler with injected services
pub struct RpcHandler {
    registry: Arc<QueueRegistry>,
    engine: Arc<QueueEngine>,
}

impl RpcHandler {
    pub fn new(registry: Arc<QueueRegistry>, engine: Arc<QueueEngine>) -> Self {
        Self { registry, engine }
    }

    /// queue.create.v1
    pub async fn create_queue(&self, params: CreateQueueRequest) -> RpcResult<Queue> {
        self.registry
            .create_queue(params)
            .await
            .map_err(to_rpc_error)
    }

    /// queue.list.v1
    pub async fn list_queues(&self, params: ListQueuesRequest) -> RpcResult<Vec<QueueWithEntries>> {
        self.registry
            .list_queues(&params.clinic_id, params.active_only)
            .await
            .map_err(to_rpc_error)
    }

    /// queue.get_by_type.v1
    pub async fn get_queue_by_type(&self, params: GetQueueByTypeRequest) -> RpcResult<Queue> {
        self.registry
            .get_queue(&params.clinic_id, &params.therapy_type)
            .await
            .map_err(to_rpc_error)
    }

    /// queue.deactivate.v1
    pub async fn deactivate_queue(&self, params: QueueActionRequest) -> RpcResult<Queue> {
        self.registry
            .deactivate_queue(&params.queue_id, params.actor)
            .await
            .map_err(to_rpc_error)
    }

    /// queue.stats.v1
    pub async fn queue_stats(&self, params: QueueStatsRequest) -> RpcResult<QueueStats> {
        self.engine
            .stats(&params.queue_id)
            .await
            .map_err(to_rpc_error)
    }

    /// queue.reorder.v1
    pub async fn reorder(&self, params: QueueActionRequest) -> RpcResult<ReorderSummary> {
        self.engine
            .reorder(&params.queue_id, params.actor)
            .await
            .map_err(to_rpc_error)
    }

    /// entry.add.v1
    pub async fn add_entry(&self, params: AddEntryRequest) -> RpcResult<QueueEntry> {
        self.engine.add_entry(params).await.map_err(to_rpc_error)
    }

    /// entry.update.v1
    pub async fn update_entry(&self, params: UpdateEntryRequest) -> RpcResult<QueueEntry> {
        self.engine
            .update_entry(&params.entry_id, params.patch, params.actor)
            .await
            .map_err(to_rpc_error)
    }

    /// entry.start.v1
    pub async fn start_entry(&self, params: EntryActionRequest) -> RpcResult<QueueEntry> {
        self.engine
            .start_entry(&params.entry_id, params.actor)
            .await
            .map_err(to_rpc_error)
    }

    /// entry.complete.v1
    pub async fn complete_entry(&self, params: CompleteEntryRequest) -> RpcResult<QueueEntry> {
        self.engine
            .complete_entry(&params.entry_id, params.actual_wait_time, params.actor)
            .await
            .map_err(to_rpc_error)
    }

    /// entry.remove.v1
    pub async fn remove_entry(&self, params: EntryActionRequest) -> RpcResult<QueueEntry> {
        self.engine
            .remove_entry(&params.entry_id, params.actor)
            .await
            .map_err(to_rpc_error)
    }

    /// entry.position.v1
    pub async fn patient_position(
        &self,
        params: PatientPositionRequest,
    ) -> RpcResult<PatientPosition> {
        self.engine
            .patient_position(&params.appointment_id)
            .await
            .map_err(to_rpc_error)
    }
}
