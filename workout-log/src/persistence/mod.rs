pub mod sqlite;
mod traits;

pub use traits::WorkoutStore;

/// Errors from the persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),
    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("workout {0} already exists")]
    DuplicateId(String),
    #[error("workout {0} not found")]
    NotFound(String),
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),
    #[error("corrupt row {id}: {reason}")]
    CorruptRow { id: String, reason: String },
}

impl StoreError {
    /// True for failures that mean the store cannot be opened, migrated or
    /// read, as opposed to integrity rejections of a single write.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::Unavailable(_) | Self::Migration(_) | Self::Io(_) | Self::CorruptRow { .. }
        )
    }
}

/// Direction for [`WorkoutStore::list_all`]. Rows are always ordered by
/// occurred-at, with id as the tie-breaker in the same direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}
