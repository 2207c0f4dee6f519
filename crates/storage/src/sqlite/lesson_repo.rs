use academy_core::model::{Audience, Lesson, LessonDraft, LessonId, ModuleId};
use chrono::{DateTime, Utc};

use super::SqliteRepository;
use super::mapping::{LESSON_COLUMNS, db_err, id_to_i64, lesson_id_from_i64, map_lesson_row};
use crate::repository::{LessonRepository, NewLessonRecord, StorageError};

#[async_trait::async_trait]
impl LessonRepository for SqliteRepository {
    async fn insert_lesson(&self, lesson: NewLessonRecord) -> Result<LessonId, StorageError> {
        let draft = lesson.draft;
        let res = sqlx::query(
            r"
            INSERT INTO lessons (
                module_id, title, slug, description, kind, sort_order, duration,
                video_url, document_url, content, is_published, is_free, created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?13)
            ",
        )
        .bind(id_to_i64("module_id", draft.module_id.value())?)
        .bind(draft.title)
        .bind(draft.slug)
        .bind(draft.description)
        .bind(draft.kind.as_str().to_owned())
        .bind(draft.order)
        .bind(draft.duration)
        .bind(draft.video_url)
        .bind(draft.document_url)
        .bind(draft.content)
        .bind(i64::from(draft.is_published))
        .bind(i64::from(draft.is_free))
        .bind(lesson.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        lesson_id_from_i64(res.last_insert_rowid())
    }

    async fn update_lesson(
        &self,
        id: LessonId,
        draft: &LessonDraft,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let res = sqlx::query(
            r"
            UPDATE lessons SET
                module_id = ?2,
                title = ?3,
                slug = ?4,
                description = ?5,
                kind = ?6,
                sort_order = ?7,
                duration = ?8,
                video_url = ?9,
                document_url = ?10,
                content = ?11,
                is_published = ?12,
                is_free = ?13,
                updated_at = ?14
            WHERE id = ?1
            ",
        )
        .bind(id_to_i64("lesson_id", id.value())?)
        .bind(id_to_i64("module_id", draft.module_id.value())?)
        .bind(&draft.title)
        .bind(&draft.slug)
        .bind(&draft.description)
        .bind(draft.kind.as_str())
        .bind(draft.order)
        .bind(&draft.duration)
        .bind(&draft.video_url)
        .bind(&draft.document_url)
        .bind(&draft.content)
        .bind(i64::from(draft.is_published))
        .bind(i64::from(draft.is_free))
        .bind(updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn delete_lesson(&self, id: LessonId) -> Result<bool, StorageError> {
        let res = sqlx::query("DELETE FROM lessons WHERE id = ?1")
            .bind(id_to_i64("lesson_id", id.value())?)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(res.rows_affected() > 0)
    }

    async fn get_lesson(&self, id: LessonId) -> Result<Option<Lesson>, StorageError> {
        let row = sqlx::query(&format!("SELECT {LESSON_COLUMNS} FROM lessons WHERE id = ?1"))
            .bind(id_to_i64("lesson_id", id.value())?)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        row.as_ref().map(map_lesson_row).transpose()
    }

    async fn list_lessons(
        &self,
        module_id: ModuleId,
        audience: Audience,
    ) -> Result<Vec<Lesson>, StorageError> {
        let rows = sqlx::query(&format!(
            r"
            SELECT {LESSON_COLUMNS} FROM lessons
            WHERE module_id = ?1 AND (is_published = 1 OR ?2)
            ORDER BY sort_order ASC, id ASC
            "
        ))
        .bind(id_to_i64("module_id", module_id.value())?)
        .bind(audience.sees_unpublished())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter().map(map_lesson_row).collect()
    }
}
