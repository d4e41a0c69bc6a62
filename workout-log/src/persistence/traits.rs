//! Async store trait for workout rows.
//!
//! Methods return `impl Future + Send` rather than using `async fn` so that
//! the futures are guaranteed `Send`, which `tokio::spawn` requires when a
//! repository is shared across tasks.

use std::future::Future;

use workout::{ValidatedWorkout, WorkoutId, WorkoutRecord};

use super::{SortDirection, StoreError};

/// Durable table of workout records.
///
/// Every method is durable once it returns `Ok`, and each mutation is atomic:
/// a failed or interrupted write leaves the previous row state.
pub trait WorkoutStore: Send + Sync {
    /// Append one row. Fails with `DuplicateId` if the id exists and
    /// `ConstraintViolation` if a field breaks a column constraint.
    fn insert(
        &self,
        record: &WorkoutRecord,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Overwrite every mutable field of the row with `id`. Fails with
    /// `NotFound` if there is no such row.
    fn update(
        &self,
        id: &WorkoutId,
        fields: &ValidatedWorkout,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Remove the row with `id`. Returns whether a row was removed; a
    /// missing id is not an error.
    fn delete(&self, id: &WorkoutId) -> impl Future<Output = Result<bool, StoreError>> + Send;

    fn list_all(
        &self,
        direction: SortDirection,
    ) -> impl Future<Output = Result<Vec<WorkoutRecord>, StoreError>> + Send;

    fn load(
        &self,
        id: &WorkoutId,
    ) -> impl Future<Output = Result<Option<WorkoutRecord>, StoreError>> + Send;
}
