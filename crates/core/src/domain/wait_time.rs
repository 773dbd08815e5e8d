// Wait-time estimation: linear model, position * per-slot minutes of the therapy type

use crate::domain::queue::TherapyType;
use std::collections::HashMap;

/// Slot length for therapy types without an entry in the table
pub const DEFAULT_SLOT_MINUTES: u32 = 20;

/// Per-slot duration table (minutes per queue position), keyed by therapy type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotDurations {
    minutes: HashMap<TherapyType, u32>,
    fallback: u32,
}

impl Default for SlotDurations {
    fn default() -> Self {
        let minutes = [
            ("SHODHANA", 30),   // purification
            ("SHAMANA", 20),    // palliative
            ("RASAYANA", 25),   // rejuvenation
            ("VAJIKARANA", 25), // aphrodisiac
        ]
        .into_iter()
        .map(|(name, m)| (TherapyType::new(name), m))
        .collect();

        Self {
            minutes,
            fallback: DEFAULT_SLOT_MINUTES,
        }
    }
}

impl SlotDurations {
    /// Override (or add) the slot length of one therapy type
    pub fn with_override(mut self, therapy_type: TherapyType, minutes: u32) -> Self {
        self.minutes.insert(therapy_type, minutes);
        self
    }

    pub fn with_fallback(mut self, minutes: u32) -> Self {
        self.fallback = minutes;
        self
    }

    pub fn slot_minutes(&self, therapy_type: &TherapyType) -> u32 {
        self.minutes
            .get(therapy_type)
            .copied()
            .unwrap_or(self.fallback)
    }

    pub fn estimate(&self, therapy_type: &TherapyType, position: u32) -> u32 {
        position.saturating_mul(self.slot_minutes(therapy_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let slots = SlotDurations::default();
        assert_eq!(slots.slot_minutes(&TherapyType::new("shodhana")), 30);
        assert_eq!(slots.slot_minutes(&TherapyType::new("SHAMANA")), 20);
        assert_eq!(slots.slot_minutes(&TherapyType::new("rasayana")), 25);
        assert_eq!(slots.slot_minutes(&TherapyType::new("vajikarana")), 25);
        assert_eq!(slots.slot_minutes(&TherapyType::new("marma")), DEFAULT_SLOT_MINUTES);
    }

    #[test]
    fn test_override() {
        let slots = SlotDurations::default()
            .with_override(TherapyType::new("SHODHANA"), 45)
            .with_override(TherapyType::new("MARMA"), 15)
            .with_fallback(10);
        assert_eq!(slots.estimate(&TherapyType::new("SHODHANA"), 2), 90);
        assert_eq!(slots.estimate(&TherapyType::new("MARMA"), 3), 45);
        assert_eq!(slots.estimate(&TherapyType::new("UNKNOWN"), 3), 30);
    }
}
