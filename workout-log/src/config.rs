//! Configuration for the workout log
//!
//! The database location is resolved with the following precedence:
//! 1. WORKOUT_LOG_DB environment variable (full path to the file)
//! 2. ~/.config/workout-log/data/workouts.db (production default)
//! 3. ./data/workouts.db (fallback for development)

use std::path::PathBuf;

use workout::OccurredAtPolicy;

const DATABASE_ENV: &str = "WORKOUT_LOG_DB";
const DEFAULT_CONFIG_DIR: &str = ".config/workout-log/data";
const DEV_DATA_DIR: &str = "./data";
const DATABASE_FILE: &str = "workouts.db";

/// Get the path of the workout database file.
pub fn get_database_path() -> PathBuf {
    resolve_database_path(std::env::var(DATABASE_ENV).ok(), std::env::var("HOME").ok())
}

fn resolve_database_path(override_path: Option<String>, home: Option<String>) -> PathBuf {
    if let Some(path) = override_path.filter(|p| !p.trim().is_empty()) {
        return PathBuf::from(path);
    }

    if let Some(home) = home.filter(|h| !h.is_empty()) {
        return PathBuf::from(home).join(DEFAULT_CONFIG_DIR).join(DATABASE_FILE);
    }

    PathBuf::from(DEV_DATA_DIR).join(DATABASE_FILE)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub database_path: PathBuf,
    pub occurred_at_policy: OccurredAtPolicy,
}

impl LogConfig {
    pub fn new(database_path: impl Into<PathBuf>) -> Self {
        Self {
            database_path: database_path.into(),
            occurred_at_policy: OccurredAtPolicy::default(),
        }
    }

    /// Database location from the environment, default policy.
    pub fn from_env() -> Self {
        Self::new(get_database_path())
    }

    pub fn with_occurred_at_policy(mut self, policy: OccurredAtPolicy) -> Self {
        self.occurred_at_policy = policy;
        self
    }
}
