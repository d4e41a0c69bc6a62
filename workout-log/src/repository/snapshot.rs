use std::fmt;

use serde::Serialize;
use workout::WorkoutRecord;

/// Lifecycle of the repository's cached collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LoadStatus {
    #[default]
    Uninitialized,
    Loading,
    Ready,
    /// The last load failed; no collection is exposed until a reload succeeds.
    Failed { reason: String },
}

impl LoadStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed { reason } => Some(reason),
            _ => None,
        }
    }
}

impl fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninitialized => f.write_str("uninitialized"),
            Self::Loading => f.write_str("loading"),
            Self::Ready => f.write_str("ready"),
            Self::Failed { reason } => write!(f, "failed: {reason}"),
        }
    }
}

/// Point-in-time copy of the repository state handed to presentation code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepositorySnapshot {
    pub status: LoadStatus,
    /// Newest first.
    pub workouts: Vec<WorkoutRecord>,
}
