//! SQLite-backed store.
//!
//! ## Database setup
//!
//! [`Database`] wraps a `sqlx::SqlitePool` configured with:
//! - **WAL mode** with `synchronous = FULL`, so a committed write survives a
//!   crash or power loss once the call returns.
//! - **Foreign keys enabled** at the connection level.
//! - **Embedded migrations**: `sqlx::migrate!` applies `migrations/*.sql` in
//!   version order when [`Database::open`] is called. sqlx records each
//!   applied version with its checksum and runs each migration in its own
//!   transaction, so an interrupted migration is re-applied on next launch.
//!
//! ## Store
//!
//! [`SqliteWorkoutStore`] holds a `SqlitePool` and implements
//! [`crate::persistence::WorkoutStore`]. Enum columns are stored as `TEXT`
//! and round-tripped through the helpers in [`helpers`], which also map
//! SQLite constraint failures onto `StoreError` variants.

mod database;
pub(crate) mod helpers;
mod store;

pub use database::Database;
pub use store::SqliteWorkoutStore;
