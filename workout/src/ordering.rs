//! Newest-first ordering shared by the store query and the in-memory cache.
//!
//! Records are ordered by `occurred_at` descending, ties broken by id
//! descending. The SQLite store sorts with `ORDER BY date DESC, id DESC` on
//! canonical timestamps, which yields the same order.

use std::cmp::Ordering;

use crate::types::WorkoutRecord;

pub fn newest_first(a: &WorkoutRecord, b: &WorkoutRecord) -> Ordering {
    b.occurred_at
        .cmp(&a.occurred_at)
        .then_with(|| b.id.cmp(&a.id))
}

pub fn sort_newest_first(records: &mut [WorkoutRecord]) {
    records.sort_by(newest_first);
}

/// Insert `record` into an already sorted collection, returning its index.
pub fn insert_newest_first(records: &mut Vec<WorkoutRecord>, record: WorkoutRecord) -> usize {
    let pos = records.partition_point(|existing| newest_first(existing, &record) == Ordering::Less);
    records.insert(pos, record);
    pos
}

pub fn is_newest_first(records: &[WorkoutRecord]) -> bool {
    records
        .windows(2)
        .all(|pair| newest_first(&pair[0], &pair[1]) != Ordering::Greater)
}
