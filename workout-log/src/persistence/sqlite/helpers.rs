//! Shared encode/decode helpers for SQLite ↔ domain type conversions.
//!
//! These functions bridge the gap between domain types and the TEXT/INTEGER
//! columns checked by the schema, and classify SQLite write failures.

use chrono::{DateTime, Utc};
use sqlx::error::ErrorKind;
use workout::{ActivityType, Intensity, WorkoutId, WorkoutRecord};

use crate::persistence::StoreError;

// ── Rows ───────────────────────────────────────────────────────────────

/// Row type for workout queries, mapped via `sqlx::FromRow`. The `type`
/// column is selected as `activity_type`.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct WorkoutRow {
    pub id: String,
    pub activity_type: String,
    pub duration: i64,
    pub intensity: String,
    pub date: String,
    pub notes: Option<String>,
}

impl WorkoutRow {
    pub fn into_record(self) -> Result<WorkoutRecord, StoreError> {
        let corrupt = |reason: String| StoreError::CorruptRow {
            id: self.id.clone(),
            reason,
        };
        let activity_type = self
            .activity_type
            .parse::<ActivityType>()
            .map_err(|e| corrupt(e.to_string()))?;
        let intensity = self
            .intensity
            .parse::<Intensity>()
            .map_err(|e| corrupt(e.to_string()))?;
        let duration_minutes = decode_duration(self.duration)
            .ok_or_else(|| corrupt(format!("invalid duration {}", self.duration)))?;
        let occurred_at = decode_timestamp(&self.date)
            .ok_or_else(|| corrupt(format!("invalid date {:?}", self.date)))?;

        Ok(WorkoutRecord {
            id: WorkoutId::new(self.id.clone()),
            activity_type,
            duration_minutes,
            intensity,
            occurred_at,
            notes: self.notes.clone(),
        })
    }
}

// ── Columns ────────────────────────────────────────────────────────────

fn decode_duration(duration: i64) -> Option<u32> {
    u32::try_from(duration).ok().filter(|d| *d > 0)
}

/// Decode the `date` column. Accepts any RFC 3339 string, normalising to UTC.
pub fn decode_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

// ── Errors ─────────────────────────────────────────────────────────────

/// Map a failed INSERT/UPDATE onto the store's integrity variants.
/// Anything that is not a constraint failure means the store is unavailable.
pub fn classify_write_error(err: sqlx::Error, id: &WorkoutId) -> StoreError {
    let constraint = match &err {
        sqlx::Error::Database(db) => Some((db.kind(), db.message().to_string())),
        _ => None,
    };
    match constraint {
        Some((ErrorKind::UniqueViolation, _)) => StoreError::DuplicateId(id.to_string()),
        Some((ErrorKind::CheckViolation | ErrorKind::NotNullViolation, message)) => {
            StoreError::ConstraintViolation(message)
        }
        _ => StoreError::Unavailable(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn row() -> WorkoutRow {
        WorkoutRow {
            id: "1700000000000000".to_string(),
            activity_type: "strength-training".to_string(),
            duration: 50,
            intensity: "high".to_string(),
            date: "2024-05-01T07:30:00.000Z".to_string(),
            notes: Some("legs".to_string()),
        }
    }

    #[test]
    fn test_decode_row() {
        let record = row().into_record().unwrap();
        assert_eq!(record.id.as_str(), "1700000000000000");
        assert_eq!(record.activity_type, ActivityType::StrengthTraining);
        assert_eq!(record.duration_minutes, 50);
        assert_eq!(record.intensity, Intensity::High);
        assert_eq!(
            record.occurred_at,
            Utc.with_ymd_and_hms(2024, 5, 1, 7, 30, 0).unwrap()
        );
        assert_eq!(record.notes.as_deref(), Some("legs"));
    }

    #[test]
    fn test_decode_row_rejects_unknown_type() {
        let mut r = row();
        r.activity_type = "musculation".to_string();
        assert!(matches!(r.into_record(), Err(StoreError::CorruptRow { .. })));
    }

    #[test]
    fn test_decode_row_rejects_non_canonical_spelling() {
        let mut r = row();
        r.activity_type = "Strength_Training".to_string();
        assert!(matches!(r.into_record(), Err(StoreError::CorruptRow { .. })));

        let mut r = row();
        r.intensity = "HIGH".to_string();
        assert!(matches!(r.into_record(), Err(StoreError::CorruptRow { .. })));
    }

    #[test]
    fn test_decode_row_rejects_bad_duration_and_date() {
        let mut r = row();
        r.duration = 0;
        assert!(matches!(r.into_record(), Err(StoreError::CorruptRow { .. })));

        let mut r = row();
        r.date = "01/05/2024".to_string();
        let err = r.into_record().unwrap_err();
        assert!(err.is_unavailable());
    }

    #[test]
    fn test_decode_timestamp_normalises_offset() {
        assert_eq!(
            decode_timestamp("2024-05-01T09:30:00+02:00"),
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 7, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_classify_non_database_error() {
        let err = classify_write_error(sqlx::Error::PoolClosed, &WorkoutId::new("x"));
        assert!(matches!(err, StoreError::Unavailable(_)));
    }
}
