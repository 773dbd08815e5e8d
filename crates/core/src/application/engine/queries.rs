// Read-side queries: patient position and queue statistics

use crate::domain::{EntryStatus, PatientPosition, QueueStats};
use crate::error::{AppError, Result};
use crate::port::QueueRepository;

/// Current position of the active entry holding `appointment_id`
pub async fn patient_position(
    repo: &dyn QueueRepository,
    appointment_id: &str,
) -> Result<PatientPosition> {
    let entry = repo
        .find_active_entry_by_appointment(appointment_id)
        .await?
        .ok_or_else(|| no_active_entry(appointment_id))?;

    // Position and total come from one read so they always agree
    let active = repo
        .find_entries(&entry.queue_id, &EntryStatus::ACTIVE)
        .await?;
    let total_in_queue = active.len();
    let entry = active
        .into_iter()
        .find(|e| e.id == entry.id)
        .ok_or_else(|| no_active_entry(appointment_id))?;

    Ok(PatientPosition {
        position: entry.position.unwrap_or_default(),
        total_in_queue: u32::try_from(total_in_queue).unwrap_or(u32::MAX),
        estimated_wait_time: entry.estimated_wait_time.unwrap_or_default(),
        status: entry.status,
        queue_id: entry.queue_id,
        entry_id: entry.id,
    })
}

fn no_active_entry(appointment_id: &str) -> AppError {
    AppError::NotFound(format!(
        "Appointment {} has no active queue entry",
        appointment_id
    ))
}

/// Aggregate statistics over every entry ever added to the queue
pub async fn queue_stats(repo: &dyn QueueRepository, queue_id: &str) -> Result<QueueStats> {
    let queue_id = queue_id.to_string();
    let queue = repo
        .find_queue(&queue_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Queue {} not found", queue_id)))?;

    let entries = repo.find_entries(&queue.id, &[]).await?;
    Ok(QueueStats::from_entries(&queue, &entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EntryId, Queue, QueueEntry, QueueId, TherapyType};
    use async_trait::async_trait;

    /// Repository whose appointment lookup lags behind its entry listing,
    /// as when a removal commits between the two reads
    struct LaggingRepo {
        stale: QueueEntry,
        current: Vec<QueueEntry>,
    }

    #[async_trait]
    impl QueueRepository for LaggingRepo {
        async fn find_queue(&self, _id: &QueueId) -> Result<Option<Queue>> {
            Ok(None)
        }

        async fn find_active_queue(
            &self,
            _clinic_id: &str,
            _therapy_type: &TherapyType,
        ) -> Result<Option<Queue>> {
            Ok(None)
        }

        async fn list_queues(&self, _clinic_id: &str, _active_only: bool) -> Result<Vec<Queue>> {
            Ok(Vec::new())
        }

        async fn find_entry(&self, _id: &EntryId) -> Result<Option<QueueEntry>> {
            Ok(None)
        }

        async fn find_active_entry_by_appointment(
            &self,
            _appointment_id: &str,
        ) -> Result<Option<QueueEntry>> {
            Ok(Some(self.stale.clone()))
        }

        async fn find_entries(
            &self,
            _queue_id: &QueueId,
            _statuses: &[EntryStatus],
        ) -> Result<Vec<QueueEntry>> {
            Ok(self.current.clone())
        }
    }

    fn entry(id: &str, position: u32) -> QueueEntry {
        let mut entry = QueueEntry::new(id, 1_000, "q-1", format!("patient-{}", id), None, 0);
        entry.position = Some(position);
        entry.estimated_wait_time = Some(position * 30);
        entry
    }

    #[tokio::test]
    async fn test_position_never_exceeds_total() {
        // e-3 was at position 3; e-1 was removed and the queue renumbered
        let repo = LaggingRepo {
            stale: entry("e-3", 3),
            current: vec![entry("e-2", 1), entry("e-3", 2)],
        };

        let pos = patient_position(&repo, "appt-3").await.unwrap();
        assert_eq!(pos.entry_id, "e-3");
        assert_eq!(pos.position, 2);
        assert_eq!(pos.total_in_queue, 2);
        assert_eq!(pos.estimated_wait_time, 60);
    }

    #[tokio::test]
    async fn test_entry_gone_from_active_set() {
        let repo = LaggingRepo {
            stale: entry("e-3", 3),
            current: vec![entry("e-2", 1)],
        };

        let result = patient_position(&repo, "appt-3").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
