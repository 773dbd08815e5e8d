// Queue Domain Model

use crate::domain::entry::QueueEntry;
use serde::{Deserialize, Serialize};

/// Queue identifier (UUID v4)
pub type QueueId = String;

/// Clinic identifier
pub type ClinicId = String;

/// Therapy type a queue serves (normalized to SCREAMING_SNAKE_CASE)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct TherapyType(String);

impl TherapyType {
    pub fn new(s: impl AsRef<str>) -> Self {
        let normalized = s
            .as_ref()
            .trim()
            .chars()
            .map(|c| match c {
                '-' | ' ' => '_',
                c => c.to_ascii_uppercase(),
            })
            .collect();
        Self(normalized)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for TherapyType {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<TherapyType> for String {
    fn from(t: TherapyType) -> Self {
        t.0
    }
}

impl std::fmt::Display for TherapyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Queue Entity
///
/// `current_position` is the monotonic booking counter (entries ever inserted),
/// not the number of active entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Queue {
    pub id: QueueId,
    pub clinic_id: ClinicId,
    pub therapy_type: TherapyType,
    pub name: String,
    pub max_capacity: u32,
    pub is_active: bool,
    pub current_position: i64,

    pub created_at: i64, // epoch ms
    pub updated_at: i64,
}

impl Queue {
    /// Create a new, active, empty queue
    ///
    /// # Arguments
    ///
    /// * `id` - Unique queue ID (injected, not generated)
    /// * `created_at` - Creation timestamp in epoch ms (injected, not system time)
    /// * `clinic_id` - Owning clinic
    /// * `therapy_type` - Therapy type served by the queue
    /// * `name` - Display name
    /// * `max_capacity` - Maximum number of active entries
    pub fn new(
        id: impl Into<String>,
        created_at: i64,
        clinic_id: impl Into<String>,
        therapy_type: TherapyType,
        name: impl Into<String>,
        max_capacity: u32,
    ) -> Self {
        Self {
            id: id.into(),
            clinic_id: clinic_id.into(),
            therapy_type,
            name: name.into(),
            max_capacity,
            is_active: true,
            current_position: 0,
            created_at,
            updated_at: created_at,
        }
    }

    /// Whether another active entry fits
    pub fn has_room_for(&self, active_count: usize) -> bool {
        (active_count as u64) < u64::from(self.max_capacity)
    }

    /// Deactivate the queue (history is preserved, entries are not touched)
    pub fn deactivate(&mut self, now_millis: i64) {
        self.is_active = false;
        self.updated_at = now_millis;
    }
}

/// Queue together with its active entries in position order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueWithEntries {
    #[serde(flatten)]
    pub queue: Queue,
    pub entries: Vec<QueueEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_therapy_type_normalization() {
        assert_eq!(TherapyType::new("shodhana").as_str(), "SHODHANA");
        assert_eq!(TherapyType::new(" vaji-karana ").as_str(), "VAJI_KARANA");
        assert_eq!(TherapyType::new("Rasayana"), TherapyType::new("RASAYANA"));
    }

    #[test]
    fn test_has_room_for() {
        let queue = Queue::new("q-1", 0, "clinic-1", TherapyType::new("SHAMANA"), "Q", 2);
        assert!(queue.has_room_for(0));
        assert!(queue.has_room_for(1));
        assert!(!queue.has_room_for(2));
    }

    #[test]
    fn test_deactivate() {
        let mut queue = Queue::new("q-1", 1000, "clinic-1", TherapyType::new("SHAMANA"), "Q", 5);
        assert!(queue.is_active);
        queue.deactivate(2000);
        assert!(!queue.is_active);
        assert_eq!(queue.updated_at, 2000);
        assert_eq!(queue.created_at, 1000);
    }
}
