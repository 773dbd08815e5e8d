// Queue Entry Domain Model

use crate::domain::error::{DomainError, Result};
use crate::domain::queue::QueueId;
use crate::domain::{validate_priority, Priority};
use serde::{Deserialize, Serialize};

/// Entry ID (UUID v4)
pub type EntryId = String;

/// Patient identifier
pub type PatientId = String;

const MILLIS_PER_MINUTE: i64 = 60_000;

/// Entry Status
///
/// WAITING and IN_PROGRESS are the active statuses; the other two are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryStatus {
    Waiting,
    InProgress,
    Completed,
    #[serde(alias = "CANCELLED")]
    Removed,
}

impl EntryStatus {
    pub const ACTIVE: [EntryStatus; 2] = [EntryStatus::Waiting, EntryStatus::InProgress];

    pub fn is_active(self) -> bool {
        matches!(self, EntryStatus::Waiting | EntryStatus::InProgress)
    }

    pub fn is_terminal(self) -> bool {
        !self.is_active()
    }

    /// Parse the stored representation (`CANCELLED` is read as `REMOVED`)
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "WAITING" => Some(EntryStatus::Waiting),
            "IN_PROGRESS" => Some(EntryStatus::InProgress),
            "COMPLETED" => Some(EntryStatus::Completed),
            "REMOVED" | "CANCELLED" => Some(EntryStatus::Removed),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryStatus::Waiting => write!(f, "WAITING"),
            EntryStatus::InProgress => write!(f, "IN_PROGRESS"),
            EntryStatus::Completed => write!(f, "COMPLETED"),
            EntryStatus::Removed => write!(f, "REMOVED"),
        }
    }
}

/// Queue Entry Entity
///
/// `position` is the dense 1-based rank among the active entries of the queue.
/// It is `None` once the entry has left the active set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub id: EntryId,
    pub queue_id: QueueId,
    pub patient_id: PatientId,
    pub appointment_id: Option<String>,

    pub position: Option<u32>,
    pub priority: Priority,
    pub status: EntryStatus,

    pub estimated_wait_time: Option<u32>, // minutes
    pub actual_wait_time: Option<u32>,    // minutes

    pub checked_in_at: Option<i64>, // epoch ms
    pub started_at: Option<i64>,
    pub completed_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,

    pub notes: Option<String>,
}

impl QueueEntry {
    /// Create a new WAITING entry, checked in at creation time
    ///
    /// Position and estimated wait are assigned by the ordering engine.
    pub fn new(
        id: impl Into<String>,
        created_at: i64,
        queue_id: impl Into<String>,
        patient_id: impl Into<String>,
        appointment_id: Option<String>,
        priority: Priority,
    ) -> Self {
        Self {
            id: id.into(),
            queue_id: queue_id.into(),
            patient_id: patient_id.into(),
            appointment_id,
            position: None,
            priority,
            status: EntryStatus::Waiting,
            estimated_wait_time: None,
            actual_wait_time: None,
            checked_in_at: Some(created_at),
            started_at: None,
            completed_at: None,
            created_at,
            updated_at: created_at,
            notes: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Whole minutes elapsed since check-in (falls back to creation time)
    pub fn minutes_since_check_in(&self, now_millis: i64) -> u32 {
        let since = self.checked_in_at.unwrap_or(self.created_at);
        let elapsed = (now_millis - since).max(0) / MILLIS_PER_MINUTE;
        u32::try_from(elapsed).unwrap_or(u32::MAX)
    }

    /// WAITING -> IN_PROGRESS (position retained)
    pub fn start(&mut self, now_millis: i64) -> Result<()> {
        if self.status != EntryStatus::Waiting {
            return Err(self.transition_error(EntryStatus::InProgress));
        }
        self.status = EntryStatus::InProgress;
        self.started_at = Some(now_millis);
        self.updated_at = now_millis;
        Ok(())
    }

    /// WAITING/IN_PROGRESS -> COMPLETED
    ///
    /// Without an explicit value the actual wait is derived from the check-in time.
    pub fn complete(&mut self, now_millis: i64, actual_wait_time: Option<u32>) -> Result<()> {
        if !self.is_active() {
            return Err(self.transition_error(EntryStatus::Completed));
        }
        let actual = actual_wait_time.unwrap_or_else(|| self.minutes_since_check_in(now_millis));
        self.status = EntryStatus::Completed;
        self.actual_wait_time = Some(actual);
        self.completed_at = Some(now_millis);
        self.position = None;
        self.updated_at = now_millis;
        Ok(())
    }

    /// WAITING/IN_PROGRESS -> REMOVED
    pub fn remove(&mut self, now_millis: i64) -> Result<()> {
        if !self.is_active() {
            return Err(self.transition_error(EntryStatus::Removed));
        }
        self.status = EntryStatus::Removed;
        self.position = None;
        self.updated_at = now_millis;
        Ok(())
    }

    fn transition_error(&self, to: EntryStatus) -> DomainError {
        DomainError::InvalidStateTransition {
            from: self.status.to_string(),
            to: to.to_string(),
        }
    }
}

/// Sparse field patch for `updateEntry`; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<EntryStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_wait_time: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_wait_time: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// What a patch does to the ordering of the owning queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchEffect {
    /// Ordering untouched
    KeepsOrder,
    /// Entry moved from an active to a terminal status
    LeavesActiveSet,
    /// Active entry changed priority or had its position overridden
    ReRanks,
}

impl PatchEffect {
    pub fn requires_reorder(self) -> bool {
        !matches!(self, PatchEffect::KeepsOrder)
    }
}

impl EntryPatch {
    pub fn is_empty(&self) -> bool {
        self == &EntryPatch::default()
    }

    /// Effect this patch would have on `entry`, without applying it
    pub fn effect(&self, entry: &QueueEntry) -> PatchEffect {
        let target = self.status.unwrap_or(entry.status);
        match (entry.is_active(), target.is_active()) {
            (true, false) => PatchEffect::LeavesActiveSet,
            (true, true) => {
                let priority_changed = self.priority.is_some_and(|p| p != entry.priority);
                let position_changed = self.position.is_some_and(|p| Some(p) != entry.position);
                if priority_changed || position_changed {
                    PatchEffect::ReRanks
                } else {
                    PatchEffect::KeepsOrder
                }
            }
            (false, _) => PatchEffect::KeepsOrder,
        }
    }

    /// Apply the patch to `entry`, routing status changes through the lifecycle
    /// transitions so the same rules hold as for start/complete/remove.
    pub fn apply(&self, entry: &mut QueueEntry, now_millis: i64) -> Result<PatchEffect> {
        if let Some(priority) = self.priority {
            validate_priority(priority)?;
        }
        if self.position == Some(0) {
            return Err(DomainError::ValidationError(
                "position is 1-based".to_string(),
            ));
        }

        let effect = self.effect(entry);

        if let Some(status) = self.status {
            if status != entry.status {
                match status {
                    EntryStatus::InProgress => entry.start(now_millis)?,
                    EntryStatus::Completed => entry.complete(now_millis, self.actual_wait_time)?,
                    EntryStatus::Removed => entry.remove(now_millis)?,
                    EntryStatus::Waiting => return Err(entry.transition_error(status)),
                }
            }
        }

        if let Some(position) = self.position {
            if !entry.is_active() {
                return Err(DomainError::ValidationError(
                    "position can only be set on an active entry".to_string(),
                ));
            }
            entry.position = Some(position);
        }
        if let Some(priority) = self.priority {
            entry.priority = priority;
        }
        if let Some(minutes) = self.estimated_wait_time {
            entry.estimated_wait_time = Some(minutes);
        }
        if let Some(minutes) = self.actual_wait_time {
            entry.actual_wait_time = Some(minutes);
        }
        if let Some(notes) = &self.notes {
            entry.notes = Some(notes.clone());
        }
        entry.updated_at = now_millis;

        Ok(effect)
    }
}
