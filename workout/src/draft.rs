//! Caller-supplied workout data and its validation.
//!
//! A [`WorkoutDraft`] carries raw input exactly as a form would produce it.
//! [`WorkoutDraft::validate`] turns it into a [`ValidatedWorkout`]. The
//! repository only hands the store values produced by `validate`; the
//! fields stay public so stores and their tests can build one directly.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{format_timestamp, ActivityType, Intensity, WorkoutId, WorkoutRecord};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("duration must be a positive number of minutes, got {0}")]
    NonPositiveDuration(i64),
    #[error("duration of {0} minutes is too large")]
    DurationTooLarge(i64),
    #[error("unknown activity type: {0:?}")]
    UnknownActivityType(String),
    #[error("unknown intensity: {0:?}")]
    UnknownIntensity(String),
    #[error("invalid timestamp: {0:?}")]
    InvalidTimestamp(String),
    #[error("timestamp out of range: {0:?}")]
    TimestampOutOfRange(String),
    #[error("workout date {occurred_on} is before today ({today})")]
    OccurredInPast { occurred_on: NaiveDate, today: NaiveDate },
}

/// Repository-level rule for how far back `occurred_at` may lie.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OccurredAtPolicy {
    /// Any date is accepted, past or future.
    #[default]
    Unrestricted,
    /// The UTC calendar day must be today or later.
    NoPastDays,
}

impl OccurredAtPolicy {
    pub fn check(self, occurred_at: DateTime<Utc>, now: DateTime<Utc>) -> Result<(), ValidationError> {
        match self {
            Self::Unrestricted => Ok(()),
            Self::NoPastDays => {
                let occurred_on = occurred_at.date_naive();
                let today = now.date_naive();
                if occurred_on < today {
                    Err(ValidationError::OccurredInPast { occurred_on, today })
                } else {
                    Ok(())
                }
            }
        }
    }
}

/// Unvalidated data for a new workout, or the full replacement of an
/// existing one's mutable fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutDraft {
    pub activity_type: String,
    pub duration_minutes: i64,
    pub intensity: String,
    pub occurred_at: String,
    pub notes: Option<String>,
}

impl WorkoutDraft {
    pub fn new(
        activity_type: impl Into<String>,
        duration_minutes: i64,
        intensity: impl Into<String>,
        occurred_at: impl Into<String>,
    ) -> Self {
        Self {
            activity_type: activity_type.into(),
            duration_minutes,
            intensity: intensity.into(),
            occurred_at: occurred_at.into(),
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Prefill a draft from an existing record, e.g. for an edit form.
    pub fn from_record(record: &WorkoutRecord) -> Self {
        Self {
            activity_type: record.activity_type.as_str().to_string(),
            duration_minutes: i64::from(record.duration_minutes),
            intensity: record.intensity.as_str().to_string(),
            occurred_at: record.occurred_at_iso(),
            notes: record.notes.clone(),
        }
    }

    /// Check every field and the occurred-at policy. Duration is checked
    /// first, then type, intensity and timestamp.
    pub fn validate(
        &self,
        policy: OccurredAtPolicy,
        now: DateTime<Utc>,
    ) -> Result<ValidatedWorkout, ValidationError> {
        if self.duration_minutes <= 0 {
            return Err(ValidationError::NonPositiveDuration(self.duration_minutes));
        }
        let duration_minutes = u32::try_from(self.duration_minutes)
            .map_err(|_| ValidationError::DurationTooLarge(self.duration_minutes))?;
        let activity_type: ActivityType = self.activity_type.parse()?;
        let intensity: Intensity = self.intensity.parse()?;
        let occurred_at = parse_timestamp(&self.occurred_at)?;
        policy.check(occurred_at, now)?;

        Ok(ValidatedWorkout {
            activity_type,
            duration_minutes,
            intensity,
            occurred_at,
            notes: self.notes.clone(),
        })
    }
}

/// The mutable fields of a record after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedWorkout {
    pub activity_type: ActivityType,
    pub duration_minutes: u32,
    pub intensity: Intensity,
    pub occurred_at: DateTime<Utc>,
    pub notes: Option<String>,
}

impl ValidatedWorkout {
    pub fn into_record(self, id: WorkoutId) -> WorkoutRecord {
        WorkoutRecord {
            id,
            activity_type: self.activity_type,
            duration_minutes: self.duration_minutes,
            intensity: self.intensity,
            occurred_at: self.occurred_at,
            notes: self.notes,
        }
    }

    pub fn occurred_at_iso(&self) -> String {
        format_timestamp(&self.occurred_at)
    }
}

/// Parse a caller timestamp into UTC, truncated to milliseconds.
///
/// Accepted forms:
/// - RFC 3339 with any offset (`2024-05-01T09:30:00+02:00`)
/// - naive date-time taken as UTC (`2024-05-01T07:30`, `2024-05-01T07:30:00.250`)
/// - bare date at midnight UTC (`2024-05-01`)
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, ValidationError> {
    let s = raw.trim();
    let invalid = || ValidationError::InvalidTimestamp(raw.to_string());
    if s.is_empty() {
        return Err(invalid());
    }

    let parsed = if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        dt.with_timezone(&Utc)
    } else if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        naive.and_utc()
    } else if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M") {
        naive.and_utc()
    } else if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        date.and_hms_opt(0, 0, 0).ok_or_else(invalid)?.and_utc()
    } else {
        return Err(invalid());
    };

    if !(1..=9999).contains(&parsed.year()) {
        return Err(ValidationError::TimestampOutOfRange(raw.to_string()));
    }
    Ok(parsed.trunc_subsecs(3))
}
