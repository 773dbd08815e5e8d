// Queue statistics and patient position views

use crate::domain::entry::{EntryId, EntryStatus, QueueEntry};
use crate::domain::queue::{Queue, QueueId};
use serde::{Deserialize, Serialize};

/// Aggregated counters for one queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueStats {
    pub queue_id: QueueId,
    pub waiting: u32,
    pub in_progress: u32,
    pub completed: u32,
    pub removed: u32,
    pub total_entries: u32,
    /// Mean actual wait over completed entries with a recorded value, in minutes
    pub average_wait_time: u32,
    pub current_capacity: u32,
    pub max_capacity: u32,
    /// Active entries as a percentage of capacity, rounded
    pub utilization_rate: u32,
}

impl QueueStats {
    pub fn from_entries(queue: &Queue, entries: &[QueueEntry]) -> Self {
        let count = |status: EntryStatus| {
            entries.iter().filter(|e| e.status == status).count() as u32
        };
        let waiting = count(EntryStatus::Waiting);
        let in_progress = count(EntryStatus::InProgress);

        let recorded: Vec<u32> = entries
            .iter()
            .filter(|e| e.status == EntryStatus::Completed)
            .filter_map(|e| e.actual_wait_time)
            .collect();
        let average_wait_time = if recorded.is_empty() {
            0
        } else {
            let sum: u64 = recorded.iter().map(|&m| u64::from(m)).sum();
            (sum as f64 / recorded.len() as f64).round() as u32
        };

        let current_capacity = waiting + in_progress;
        let utilization_rate = if queue.max_capacity == 0 {
            0
        } else {
            (f64::from(current_capacity) / f64::from(queue.max_capacity) * 100.0).round() as u32
        };

        Self {
            queue_id: queue.id.clone(),
            waiting,
            in_progress,
            completed: count(EntryStatus::Completed),
            removed: count(EntryStatus::Removed),
            total_entries: entries.len() as u32,
            average_wait_time,
            current_capacity,
            max_capacity: queue.max_capacity,
            utilization_rate,
        }
    }
}

/// Where a patient's appointment currently stands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientPosition {
    pub entry_id: EntryId,
    pub queue_id: QueueId,
    pub position: u32,
    pub total_in_queue: u32,
    pub estimated_wait_time: u32,
    pub status: EntryStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::queue::TherapyType;

    fn entry(id: &str, status: EntryStatus, actual: Option<u32>) -> QueueEntry {
        let mut e = QueueEntry::new(id, 0, "q-1", format!("p-{id}"), None, 0);
        e.status = status;
        e.actual_wait_time = actual;
        e
    }

    #[test]
    fn test_empty_queue_stats() {
        let queue = Queue::new("q-1", 0, "c-1", TherapyType::new("SHAMANA"), "Q", 10);
        let stats = QueueStats::from_entries(&queue, &[]);
        assert_eq!(stats.total_entries, 0);
        assert_eq!(stats.average_wait_time, 0);
        assert_eq!(stats.utilization_rate, 0);
    }

    #[test]
    fn test_stats_counts_and_rates() {
        let queue = Queue::new("q-1", 0, "c-1", TherapyType::new("SHAMANA"), "Q", 3);
        let entries = vec![
            entry("a", EntryStatus::Waiting, None),
            entry("b", EntryStatus::InProgress, None),
            entry("c", EntryStatus::Completed, Some(10)),
            entry("d", EntryStatus::Completed, Some(15)),
            entry("e", EntryStatus::Completed, None),
            entry("f", EntryStatus::Removed, Some(99)),
        ];
        let stats = QueueStats::from_entries(&queue, &entries);
        assert_eq!(stats.waiting, 1);
        assert_eq!(stats.in_progress, 1);
        assert_eq!(stats.completed, 3);
        assert_eq!(stats.removed, 1);
        assert_eq!(stats.total_entries, 6);
        // (10 + 15) / 2 = 12.5, rounded
        assert_eq!(stats.average_wait_time, 13);
        assert_eq!(stats.current_capacity, 2);
        // 2 / 3 = 66.67%
        assert_eq!(stats.utilization_rate, 67);
    }
}
