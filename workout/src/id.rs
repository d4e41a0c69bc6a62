//! Collision-free workout id generation.
//!
//! Ids are decimal microsecond timestamps pushed forward by an atomic
//! watermark, so every id is strictly greater than the last one issued by
//! the same generator, even for calls within the same microsecond or after
//! the wall clock steps backwards.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::types::WorkoutId;

#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicU64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> WorkoutId {
        let now = now_micros();
        let bump = |last: u64| now.max(last.saturating_add(1));
        let previous = match self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(bump(last)))
        {
            Ok(prev) | Err(prev) => prev,
        };
        WorkoutId::new(bump(previous).to_string())
    }

    /// Raise the watermark past an id that already exists, e.g. one loaded
    /// from disk. Ids that are not generator output are ignored.
    pub fn observe(&self, id: &WorkoutId) {
        if let Ok(value) = id.as_str().parse::<u64>() {
            self.last.fetch_max(value, Ordering::SeqCst);
        }
    }
}

fn now_micros() -> u64 {
    let micros = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_micros();
    u64::try_from(micros).unwrap_or(u64::MAX)
}
