use academy_core::model::{LessonId, ProgressEntry, UserId};
use chrono::{DateTime, Utc};

use super::SqliteRepository;
use super::mapping::{PROGRESS_ENTRY_SELECT, db_err, id_to_i64, map_progress_entry_row};
use crate::repository::{ProgressRepository, StorageError};

#[async_trait::async_trait]
impl ProgressRepository for SqliteRepository {
    async fn list_progress(&self, user_id: UserId) -> Result<Vec<ProgressEntry>, StorageError> {
        let rows = sqlx::query(&format!(
            "{PROGRESS_ENTRY_SELECT} WHERE p.user_id = ?1 ORDER BY p.id ASC"
        ))
        .bind(id_to_i64("user_id", user_id.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter().map(map_progress_entry_row).collect()
    }

    async fn mark_complete(
        &self,
        user_id: UserId,
        lesson_id: LessonId,
        at: DateTime<Utc>,
    ) -> Result<ProgressEntry, StorageError> {
        let user = id_to_i64("user_id", user_id.value())?;
        let lesson = id_to_i64("lesson_id", lesson_id.value())?;

        let mut tx = self.pool.begin().await.map_err(db_err)?;

        // The unique (user_id, lesson_id) index serializes concurrent callers;
        // the WHERE clause leaves an already-completed row untouched.
        sqlx::query(
            r"
            INSERT INTO user_progress (user_id, lesson_id, completed, completed_at, created_at, updated_at)
            VALUES (?1, ?2, 1, ?3, ?3, ?3)
            ON CONFLICT(user_id, lesson_id) DO UPDATE SET
                completed = 1,
                completed_at = excluded.completed_at,
                updated_at = excluded.updated_at
            WHERE user_progress.completed = 0
            ",
        )
        .bind(user)
        .bind(lesson)
        .bind(at)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        let row = sqlx::query(&format!(
            "{PROGRESS_ENTRY_SELECT} WHERE p.user_id = ?1 AND p.lesson_id = ?2"
        ))
        .bind(user)
        .bind(lesson)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_err)?
        .ok_or(StorageError::NotFound)?;

        let entry = map_progress_entry_row(&row)?;
        tx.commit().await.map_err(db_err)?;
        Ok(entry)
    }

    async fn remove_progress(
        &self,
        user_id: UserId,
        lesson_id: LessonId,
    ) -> Result<bool, StorageError> {
        let res = sqlx::query("DELETE FROM user_progress WHERE user_id = ?1 AND lesson_id = ?2")
            .bind(id_to_i64("user_id", user_id.value())?)
            .bind(id_to_i64("lesson_id", lesson_id.value())?)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(res.rows_affected() > 0)
    }
}
