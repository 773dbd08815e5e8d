//! Position ordering for active queue entries.
//!
//! Active entries are totally ordered by (priority DESC, created_at ASC, id ASC) and
//! carry dense 1-based positions in that order. Everything here is pure: callers read
//! the active set from the store, plan, and write the returned updates back inside
//! one transaction.

use crate::domain::entry::{EntryId, QueueEntry};
use crate::domain::Priority;
use std::cmp::Ordering;

/// A position (and matching wait estimate) to persist for one entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionUpdate {
    pub entry_id: EntryId,
    pub position: u32,
    pub estimated_wait_time: u32,
}

/// Result of planning an insertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertionPlan {
    pub position: u32,
    pub estimated_wait_time: u32,
    /// Existing entries pushed one slot down
    pub shifted: Vec<PositionUpdate>,
}

/// Queue order: higher priority first, then earlier arrival, then id
pub fn compare(a: &QueueEntry, b: &QueueEntry) -> Ordering {
    b.priority
        .cmp(&a.priority)
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

pub fn sort_active(entries: &mut [QueueEntry]) {
    entries.sort_by(compare);
}

/// 1-based slot for a new entry with `priority`.
///
/// `sorted_active` must already be in queue order. The new entry lands in front of
/// the first entry with strictly lower priority, so equal priorities keep arrival order.
pub fn insertion_position(sorted_active: &[QueueEntry], priority: Priority) -> u32 {
    let index = sorted_active
        .iter()
        .position(|e| e.priority < priority)
        .unwrap_or(sorted_active.len());
    to_position(index)
}

pub fn plan_insertion(
    sorted_active: &[QueueEntry],
    priority: Priority,
    slot_minutes: u32,
) -> InsertionPlan {
    let position = insertion_position(sorted_active, priority);
    let start = (position - 1) as usize;

    let shifted = sorted_active[start..]
        .iter()
        .enumerate()
        .filter_map(|(offset, entry)| {
            let new_position = to_position(start + offset + 1);
            changed(entry, new_position, slot_minutes)
        })
        .collect();

    InsertionPlan {
        position,
        estimated_wait_time: estimate(position, slot_minutes),
        shifted,
    }
}

/// Full recompute: dense positions in queue order, returning only rows that change.
pub fn plan_reorder(sorted_active: &[QueueEntry], slot_minutes: u32) -> Vec<PositionUpdate> {
    sorted_active
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| changed(entry, to_position(index), slot_minutes))
        .collect()
}

/// True when the given active entries hold exactly positions 1..=N in queue order
pub fn is_densely_ordered(active: &[QueueEntry]) -> bool {
    let mut sorted = active.to_vec();
    sort_active(&mut sorted);
    sorted
        .iter()
        .enumerate()
        .all(|(index, entry)| entry.position == Some(to_position(index)))
}

fn changed(entry: &QueueEntry, position: u32, slot_minutes: u32) -> Option<PositionUpdate> {
    let estimated_wait_time = estimate(position, slot_minutes);
    if entry.position == Some(position) && entry.estimated_wait_time == Some(estimated_wait_time)
    {
        return None;
    }
    Some(PositionUpdate {
        entry_id: entry.id.clone(),
        position,
        estimated_wait_time,
    })
}

fn estimate(position: u32, slot_minutes: u32) -> u32 {
    position.saturating_mul(slot_minutes)
}

fn to_position(index: usize) -> u32 {
    u32::try_from(index + 1).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn entry(id: &str, priority: Priority, created_at: i64) -> QueueEntry {
        QueueEntry::new(id, created_at, "q-1", format!("patient-{id}"), None, priority)
    }

    fn apply(entries: &mut [QueueEntry], updates: &[PositionUpdate]) {
        for update in updates {
            let e = entries
                .iter_mut()
                .find(|e| e.id == update.entry_id)
                .unwrap();
            e.position = Some(update.position);
            e.estimated_wait_time = Some(update.estimated_wait_time);
        }
    }

    #[test]
    fn test_insert_into_empty_queue() {
        let plan = plan_insertion(&[], 0, 20);
        assert_eq!(plan.position, 1);
        assert_eq!(plan.estimated_wait_time, 20);
        assert!(plan.shifted.is_empty());
    }

    #[test]
    fn test_higher_priority_goes_first_and_shifts() {
        let mut active = vec![entry("p1", 0, 1000)];
        let reorder = plan_reorder(&active, 30);
        apply(&mut active, &reorder);

        let plan = plan_insertion(&active, 5, 30);
        assert_eq!(plan.position, 1);
        assert_eq!(plan.estimated_wait_time, 30);
        assert_eq!(
            plan.shifted,
            vec![PositionUpdate {
                entry_id: "p1".to_string(),
                position: 2,
                estimated_wait_time: 60,
            }]
        );
    }

    #[test]
    fn test_equal_priority_appends_after_existing() {
        let mut active = vec![entry("a", 3, 1000), entry("b", 3, 2000), entry("c", 0, 3000)];
        let reorder = plan_reorder(&active, 20);
        apply(&mut active, &reorder);

        let plan = plan_insertion(&active, 3, 20);
        assert_eq!(plan.position, 3);
        assert_eq!(plan.shifted.len(), 1);
        assert_eq!(plan.shifted[0].entry_id, "c");
        assert_eq!(plan.shifted[0].position, 4);
    }

    #[test]
    fn test_lowest_priority_appends() {
        let mut active = vec![entry("a", 3, 1000), entry("b", 1, 2000)];
        let reorder = plan_reorder(&active, 20);
        apply(&mut active, &reorder);

        let plan = plan_insertion(&active, -1, 20);
        assert_eq!(plan.position, 3);
        assert!(plan.shifted.is_empty());
    }

    #[test]
    fn test_reorder_closes_gaps() {
        let mut active = vec![entry("a", 0, 1000), entry("b", 0, 2000), entry("c", 0, 3000)];
        active[0].position = Some(1);
        active[1].position = Some(3);
        active[2].position = Some(7);

        let updates = plan_reorder(&active, 25);
        apply(&mut active, &updates);
        assert!(is_densely_ordered(&active));
        assert_eq!(active[2].position, Some(3));
        assert_eq!(active[2].estimated_wait_time, Some(75));
    }

    #[test]
    fn test_reorder_is_idempotent() {
        let mut active = vec![entry("a", 2, 1000), entry("b", 9, 2000)];
        sort_active(&mut active);
        let first = plan_reorder(&active, 20);
        assert_eq!(first.len(), 2);
        apply(&mut active, &first);
        assert!(plan_reorder(&active, 20).is_empty());
    }

    #[test]
    fn test_compare_breaks_ties_by_created_at_then_id() {
        let a = entry("a", 1, 1000);
        let b = entry("b", 1, 1000);
        let c = entry("c", 1, 500);
        let mut all = vec![a, b, c];
        sort_active(&mut all);
        let ids: Vec<_> = all.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    /// Simulated queue: a sequence of inserts (priority) and removals (index)
    #[derive(Debug, Clone)]
    enum Op {
        Insert(Priority),
        Remove(usize),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => (-5i32..=5).prop_map(Op::Insert),
            1 => (0usize..16).prop_map(Op::Remove),
        ]
    }

    proptest! {
        #[test]
        fn prop_positions_stay_dense_and_ordered(ops in proptest::collection::vec(op_strategy(), 1..60)) {
            let mut active: Vec<QueueEntry> = Vec::new();
            let mut clock = 0i64;

            for op in ops {
                match op {
                    Op::Insert(priority) => {
                        clock += 1;
                        let mut sorted = active.clone();
                        sort_active(&mut sorted);
                        let plan = plan_insertion(&sorted, priority, 20);
                        apply(&mut active, &plan.shifted);
                        let mut new_entry = entry(&format!("e{clock}"), priority, clock);
                        new_entry.position = Some(plan.position);
                        new_entry.estimated_wait_time = Some(plan.estimated_wait_time);
                        active.push(new_entry);
                    }
                    Op::Remove(index) => {
                        if active.is_empty() {
                            continue;
                        }
                        active.remove(index % active.len());
                        let mut sorted = active.clone();
                        sort_active(&mut sorted);
                        let updates = plan_reorder(&sorted, 20);
                        apply(&mut active, &updates);
                    }
                }

                prop_assert!(is_densely_ordered(&active));
                for e1 in &active {
                    for e2 in &active {
                        if e1.priority > e2.priority {
                            prop_assert!(e1.position < e2.position);
                        }
                        if e1.priority == e2.priority && e1.created_at < e2.created_at {
                            prop_assert!(e1.position < e2.position);
                        }
                    }
                    prop_assert_eq!(e1.estimated_wait_time, e1.position.map(|p| p * 20));
                }
            }
        }

        #[test]
        fn prop_reorder_twice_changes_nothing(priorities in proptest::collection::vec(-5i32..=5, 0..20)) {
            let mut active: Vec<QueueEntry> = priorities
                .iter()
                .enumerate()
                .map(|(i, p)| entry(&format!("e{i}"), *p, i as i64))
                .collect();
            sort_active(&mut active);
            let updates = plan_reorder(&active, 30);
            apply(&mut active, &updates);
            prop_assert!(plan_reorder(&active, 30).is_empty());
        }
    }
}
