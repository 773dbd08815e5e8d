// Add Entry Use Case: capacity/duplicate checks and ranked insertion

use crate::application::registry::create::validate_id;
use crate::config::MAX_TEXT_LEN;
use crate::domain::{ordering, validate_priority, Priority, Queue, QueueEntry, SlotDurations};
use crate::error::{AppError, Result};
use crate::port::{IdProvider, TimeProvider, TransactionalQueueRepository};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Add-to-queue request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddEntryRequest {
    pub queue_id: String,
    pub patient_id: String,

    #[serde(default)]
    pub appointment_id: Option<String>,

    #[serde(default)]
    pub priority: Priority,

    #[serde(default)]
    pub notes: Option<String>,

    #[serde(default)]
    pub actor: Option<String>,
}

/// Validate add request (input sanitization)
pub fn validate_request(req: &AddEntryRequest) -> Result<()> {
    validate_id("queue_id", &req.queue_id)?;
    validate_id("patient_id", &req.patient_id)?;
    if let Some(appointment_id) = &req.appointment_id {
        validate_id("appointment_id", appointment_id)?;
    }
    validate_priority(req.priority)?;
    if let Some(notes) = &req.notes {
        if notes.len() > MAX_TEXT_LEN {
            return Err(AppError::Validation(format!(
                "notes too long ({} > {})",
                notes.len(),
                MAX_TEXT_LEN
            )));
        }
    }
    Ok(())
}

/// Outcome of a successful insertion
#[derive(Debug, Clone)]
pub struct AddEntryOutcome {
    pub queue: Queue,
    pub entry: QueueEntry,
    /// Existing entries pushed one slot down
    pub shifted: usize,
}

/// Execute add use case (with transaction for atomicity)
///
/// The caller holds the queue lock. Preconditions are checked in order:
/// queue exists, queue active, capacity, duplicate patient.
pub async fn execute(
    queue_repo: &dyn TransactionalQueueRepository,
    id_provider: &dyn IdProvider,
    time_provider: &dyn TimeProvider,
    slot_durations: &SlotDurations,
    req: &AddEntryRequest,
) -> Result<AddEntryOutcome> {
    let mut tx = queue_repo.begin_transaction().await?;

    let queue = tx
        .find_queue(&req.queue_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Queue {} not found", req.queue_id)))?;

    if !queue.is_active {
        return Err(AppError::QueueInactive(format!(
            "Queue {} is not accepting entries",
            queue.id
        )));
    }

    // Authoritative read of the active set (already in queue order)
    let mut active = tx.active_entries(&queue.id).await?;
    ordering::sort_active(&mut active);

    if !queue.has_room_for(active.len()) {
        return Err(AppError::CapacityExceeded(format!(
            "Queue {} is full ({}/{})",
            queue.id,
            active.len(),
            queue.max_capacity
        )));
    }

    if active.iter().any(|e| e.patient_id == req.patient_id) {
        return Err(AppError::DuplicateEntry(format!(
            "Patient {} already has an active entry in queue {}",
            req.patient_id, queue.id
        )));
    }

    // Arrival stamps strictly increase within a queue so the tie-break is total
    let now = time_provider.now_millis();
    let latest_arrival = active.iter().map(|e| e.created_at).max();
    let created_at = match latest_arrival {
        Some(latest) if latest >= now => latest + 1,
        _ => now,
    };

    let slot_minutes = slot_durations.slot_minutes(&queue.therapy_type);
    let plan = ordering::plan_insertion(&active, req.priority, slot_minutes);

    tx.apply_positions(&plan.shifted, now).await?;

    let mut entry = QueueEntry::new(
        id_provider.generate_id(),
        created_at,
        queue.id.clone(),
        req.patient_id.clone(),
        req.appointment_id.clone(),
        req.priority,
    );
    entry.position = Some(plan.position);
    entry.estimated_wait_time = Some(plan.estimated_wait_time);
    entry.notes = req.notes.clone();

    tx.insert_entry(&entry).await?;
    let booking_counter = tx.increment_booking_counter(&queue.id, now).await?;

    tx.commit().await?;

    debug!(
        queue_id = %queue.id,
        entry_id = %entry.id,
        position = plan.position,
        shifted = plan.shifted.len(),
        booking_counter,
        "Entry inserted"
    );

    let queue = Queue {
        current_position: booking_counter,
        updated_at: now,
        ..queue
    };

    Ok(AddEntryOutcome {
        queue,
        entry,
        shifted: plan.shifted.len(),
    })
}
