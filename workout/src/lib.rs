//! Domain types for the workout log.
//!
//! This crate has no I/O. It owns the record shape, the closed
//! enumerations, draft validation, the newest-first ordering used by every
//! collection of workouts, and the id generator.

pub mod draft;
pub mod id;
pub mod ordering;
pub mod types;

pub use draft::{parse_timestamp, OccurredAtPolicy, ValidatedWorkout, ValidationError, WorkoutDraft};
pub use id::IdGenerator;
pub use ordering::{insert_newest_first, is_newest_first, newest_first, sort_newest_first};
pub use types::{format_timestamp, ActivityType, Intensity, WorkoutId, WorkoutRecord};
