//! RPC Request/Response Types
//!
//! Defines the JSON-RPC method parameters. Results are the domain models
//! serialized as-is.

use serde::{Deserialize, Serialize};
use vaidya_core::domain::EntryPatch;

pub use vaidya_core::application::{AddEntryRequest, CreateQueueRequest, ReorderSummary};
pub use vaidya_core::domain::{PatientPosition, Queue, QueueEntry, QueueStats, QueueWithEntries};

/// queue.list.v1 - Queues of a clinic with their active entries
#[derive(Debug, Serialize, Deserialize)]
pub struct ListQueuesRequest {
    pub clinic_id: String,
    #[serde(default)]
    pub active_only: bool,
}

/// queue.get_by_type.v1 - Active queue for a therapy type
#[derive(Debug, Serialize, Deserialize)]
pub struct GetQueueByTypeRequest {
    pub clinic_id: String,
    pub therapy_type: String,
}

/// queue.deactivate.v1 / queue.reorder.v1
#[derive(Debug, Serialize, Deserialize)]
pub struct QueueActionRequest {
    pub queue_id: String,
    #[serde(default)]
    pub actor: Option<String>,
}

/// queue.stats.v1
#[derive(Debug, Serialize, Deserialize)]
pub struct QueueStatsRequest {
    pub queue_id: String,
}

/// entry.start.v1 / entry.remove.v1
#[derive(Debug, Serialize, Deserialize)]
pub struct EntryActionRequest {
    pub entry_id: String,
    #[serde(default)]
    pub actor: Option<String>,
}

/// entry.complete.v1
#[derive(Debug, Serialize, Deserialize)]
pub struct CompleteEntryRequest {
    pub entry_id: String,
    /// Minutes; derived from the check-in time when omitted
    #[serde(default)]
    pub actual_wait_time: Option<u32>,
    #[serde(default)]
    pub actor: Option<String>,
}

/// entry.update.v1 - Sparse update; only present fields change
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateEntryRequest {
    pub entry_id: String,
    #[serde(flatten)]
    pub patch: EntryPatch,
    #[serde(default)]
    pub actor: Option<String>,
}

/// entry.position.v1
#[derive(Debug, Serialize, Deserialize)]
pub struct PatientPositionRequest {
    pub appointment_id: String,
}
