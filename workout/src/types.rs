//! Canonical workout types.
//! Enumerations are closed; their persisted spellings live in `as_str`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::draft::ValidationError;

/// Kind of exercise session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActivityType {
    Run,
    StrengthTraining,
    Cycling,
    Swimming,
    Yoga,
    Other,
}

impl ActivityType {
    pub const ALL: [ActivityType; 6] = [
        Self::Run,
        Self::StrengthTraining,
        Self::Cycling,
        Self::Swimming,
        Self::Yoga,
        Self::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Run => "run",
            Self::StrengthTraining => "strength-training",
            Self::Cycling => "cycling",
            Self::Swimming => "swimming",
            Self::Yoga => "yoga",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownActivityType(s.to_string()))
    }
}

/// Perceived effort of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Low,
    Medium,
    High,
}

impl Intensity {
    pub const ALL: [Intensity; 3] = [Self::Low, Self::Medium, Self::High];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Intensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intensity {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|i| i.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownIntensity(s.to_string()))
    }
}

/// Opaque, immutable record identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkoutId(String);

impl WorkoutId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for WorkoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for WorkoutId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for WorkoutId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// One logged exercise session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutRecord {
    pub id: WorkoutId,
    pub activity_type: ActivityType,
    pub duration_minutes: u32,
    pub intensity: Intensity,
    pub occurred_at: DateTime<Utc>,
    /// `None` and `Some("")` are distinct.
    pub notes: Option<String>,
}

impl WorkoutRecord {
    /// `occurred_at` in its persisted form.
    pub fn occurred_at_iso(&self) -> String {
        format_timestamp(&self.occurred_at)
    }
}

/// Format a timestamp as RFC 3339 UTC with millisecond precision
/// (`2024-05-01T07:30:00.000Z`). Lexical order of the output equals
/// chronological order for years 1..=9999.
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
