//! Local persistence and state synchronization for the workout log.
//!
//! - [`persistence`]: the durable SQLite store and its migrations.
//! - [`repository`]: the in-memory, newest-first cache that applies every
//!   mutation to the store before reflecting it and notifying subscribers.
//! - [`config`]: database location and repository policy.

pub mod config;
pub mod persistence;
pub mod repository;

pub use config::LogConfig;
pub use persistence::sqlite::{Database, SqliteWorkoutStore};
pub use persistence::{SortDirection, StoreError, WorkoutStore};
pub use repository::{
    LoadStatus, MutationKind, RepositoryError, RepositoryEvent, RepositorySnapshot,
    WorkoutRepository,
};

/// Open the database, run migrations and load the repository.
///
/// Failing to open or migrate the store is fatal and returned as an error.
/// A failed initial load is not: the repository comes back in
/// `LoadStatus::Failed` and can be re-initialized.
pub async fn bootstrap(config: &LogConfig) -> Result<WorkoutRepository<SqliteWorkoutStore>, StoreError> {
    tracing::info!("Using workout database: {}", config.database_path.display());

    let db = Database::open(&config.database_path).await?;
    let store = SqliteWorkoutStore::new(db.pool().clone());
    let repository = WorkoutRepository::with_policy(store, config.occurred_at_policy);

    if let Err(e) = repository.initialize().await {
        tracing::warn!("Workout log started without data: {}", e);
    }
    Ok(repository)
}
