//! SQLite-backed implementation of [`WorkoutStore`].

use sqlx::SqlitePool;
use workout::{format_timestamp, ValidatedWorkout, WorkoutId, WorkoutRecord};

use super::helpers::{classify_write_error, WorkoutRow};
use crate::persistence::traits::WorkoutStore;
use crate::persistence::{SortDirection, StoreError};

const SELECT_COLUMNS: &str = "SELECT id, type AS activity_type, duration, intensity, date, notes FROM workouts";

pub struct SqliteWorkoutStore {
    pool: SqlitePool,
}

impl SqliteWorkoutStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl WorkoutStore for SqliteWorkoutStore {
    async fn insert(&self, record: &WorkoutRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO workouts (id, type, duration, intensity, date, notes)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.id.as_str())
        .bind(record.activity_type.as_str())
        .bind(i64::from(record.duration_minutes))
        .bind(record.intensity.as_str())
        .bind(format_timestamp(&record.occurred_at))
        .bind(record.notes.as_deref())
        .execute(&self.pool)
        .await
        .map_err(|e| classify_write_error(e, &record.id))?;

        Ok(())
    }

    async fn update(&self, id: &WorkoutId, fields: &ValidatedWorkout) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE workouts
            SET type = ?, duration = ?, intensity = ?, date = ?, notes = ?
            WHERE id = ?
            "#,
        )
        .bind(fields.activity_type.as_str())
        .bind(i64::from(fields.duration_minutes))
        .bind(fields.intensity.as_str())
        .bind(fields.occurred_at_iso())
        .bind(fields.notes.as_deref())
        .bind(id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| classify_write_error(e, id))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn delete(&self, id: &WorkoutId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM workouts WHERE id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_all(&self, direction: SortDirection) -> Result<Vec<WorkoutRecord>, StoreError> {
        let order = match direction {
            SortDirection::Descending => "ORDER BY date DESC, id DESC",
            SortDirection::Ascending => "ORDER BY date ASC, id ASC",
        };
        let rows: Vec<WorkoutRow> = sqlx::query_as(&format!("{SELECT_COLUMNS} {order}"))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(WorkoutRow::into_record).collect()
    }

    async fn load(&self, id: &WorkoutId) -> Result<Option<WorkoutRecord>, StoreError> {
        let row: Option<WorkoutRow> = sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE id = ?"))
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(WorkoutRow::into_record).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::sqlite::Database;
    use chrono::{TimeZone, Utc};
    use workout::{ActivityType, Intensity};

    async fn test_db() -> (Database, SqliteWorkoutStore) {
        let db = Database::new_in_memory().await.unwrap();
        let store = SqliteWorkoutStore::new(db.pool().clone());
        (db, store)
    }

    fn sample(id: &str, day: u32) -> WorkoutRecord {
        WorkoutRecord {
            id: WorkoutId::new(id),
            activity_type: ActivityType::Run,
            duration_minutes: 30,
            intensity: Intensity::Medium,
            occurred_at: Utc.with_ymd_and_hms(2024, 4, day, 18, 0, 0).unwrap(),
            notes: None,
        }
    }

    fn fields_of(record: &WorkoutRecord) -> ValidatedWorkout {
        ValidatedWorkout {
            activity_type: record.activity_type,
            duration_minutes: record.duration_minutes,
            intensity: record.intensity,
            occurred_at: record.occurred_at,
            notes: record.notes.clone(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_load_roundtrip() {
        let (_db, store) = test_db().await;
        let mut record = sample("w1", 3);
        record.notes = Some("easy pace".to_string());
        store.insert(&record).await.unwrap();
        assert_eq!(store.load(&record.id).await.unwrap(), Some(record));
    }

    #[tokio::test]
    async fn test_notes_absent_and_empty_are_distinct() {
        let (_db, store) = test_db().await;
        let absent = sample("absent", 1);
        let mut empty = sample("empty", 2);
        empty.notes = Some(String::new());
        store.insert(&absent).await.unwrap();
        store.insert(&empty).await.unwrap();

        assert_eq!(store.load(&absent.id).await.unwrap().unwrap().notes, None);
        assert_eq!(
            store.load(&empty.id).await.unwrap().unwrap().notes,
            Some(String::new())
        );
    }

    #[tokio::test]
    async fn test_insert_duplicate_id() {
        let (_db, store) = test_db().await;
        store.insert(&sample("dup", 1)).await.unwrap();
        let result = store.insert(&sample("dup", 2)).await;
        assert!(
            matches!(result, Err(StoreError::DuplicateId(ref id)) if id == "dup"),
            "expected DuplicateId, got {:?}",
            result
        );
        assert_eq!(store.list_all(SortDirection::Descending).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_insert_zero_duration_violates_constraint() {
        let (_db, store) = test_db().await;
        let mut record = sample("zero", 1);
        record.duration_minutes = 0;
        let result = store.insert(&record).await;
        assert!(
            matches!(result, Err(StoreError::ConstraintViolation(_))),
            "expected ConstraintViolation, got {:?}",
            result
        );
    }

    #[tokio::test]
    async fn test_insert_empty_id_violates_constraint() {
        let (_db, store) = test_db().await;
        let result = store.insert(&sample("", 1)).await;
        assert!(matches!(result, Err(StoreError::ConstraintViolation(_))));
    }

    #[tokio::test]
    async fn test_update_overwrites_all_fields() {
        let (_db, store) = test_db().await;
        let record = sample("w1", 1);
        store.insert(&record).await.unwrap();

        let fields = ValidatedWorkout {
            activity_type: ActivityType::Swimming,
            duration_minutes: 75,
            intensity: Intensity::Low,
            occurred_at: Utc.with_ymd_and_hms(2024, 4, 20, 6, 15, 0).unwrap(),
            notes: Some("open water".to_string()),
        };
        store.update(&record.id, &fields).await.unwrap();

        let loaded = store.load(&record.id).await.unwrap().unwrap();
        assert_eq!(loaded, fields.into_record(record.id.clone()));
    }

    #[tokio::test]
    async fn test_update_can_clear_notes() {
        let (_db, store) = test_db().await;
        let mut record = sample("w1", 1);
        record.notes = Some("temp".to_string());
        store.insert(&record).await.unwrap();

        record.notes = None;
        store.update(&record.id, &fields_of(&record)).await.unwrap();
        assert_eq!(store.load(&record.id).await.unwrap().unwrap().notes, None);
    }

    #[tokio::test]
    async fn test_update_missing_row() {
        let (_db, store) = test_db().await;
        let record = sample("ghost", 1);
        let result = store.update(&record.id, &fields_of(&record)).await;
        assert!(matches!(result, Err(StoreError::NotFound(ref id)) if id == "ghost"));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (_db, store) = test_db().await;
        let record = sample("w1", 1);
        store.insert(&record).await.unwrap();
        assert!(store.delete(&record.id).await.unwrap());
        assert!(!store.delete(&record.id).await.unwrap());
        assert_eq!(store.load(&record.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_list_ordering_both_directions() {
        let (_db, store) = test_db().await;
        store.insert(&sample("mid", 15)).await.unwrap();
        store.insert(&sample("old", 1)).await.unwrap();
        store.insert(&sample("new", 28)).await.unwrap();

        let desc = store.list_all(SortDirection::Descending).await.unwrap();
        let ids: Vec<&str> = desc.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["new", "mid", "old"]);

        let asc = store.list_all(SortDirection::Ascending).await.unwrap();
        let ids: Vec<&str> = asc.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["old", "mid", "new"]);
    }

    #[tokio::test]
    async fn test_list_empty() {
        let (_db, store) = test_db().await;
        assert!(store.list_all(SortDirection::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_reports_corrupt_rows() {
        let (db, store) = test_db().await;
        // The CHECK constraint only covers emptiness, not format.
        sqlx::query(
            "INSERT INTO workouts (id, type, duration, intensity, date, notes) \
             VALUES ('bad', 'run', 10, 'low', 'last tuesday', NULL)",
        )
        .execute(db.pool())
        .await
        .unwrap();

        let err = store.list_all(SortDirection::Descending).await.unwrap_err();
        assert!(matches!(err, StoreError::CorruptRow { ref id, .. } if id == "bad"));
    }
}
