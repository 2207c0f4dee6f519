use academy_core::model::{
    Email, Lesson, LessonDraft, LessonId, LessonKind, LessonSummary, Module, ModuleDraft, ModuleId,
    ProgressEntry, ProgressId, ProgressRecord, User, UserId,
};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

/// Maps driver errors onto storage errors; constraint violations get their
/// own variants so services can report them as domain errors.
pub(crate) fn db_err(e: sqlx::Error) -> StorageError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return StorageError::Conflict;
        }
        if db.is_foreign_key_violation() {
            return StorageError::NotFound;
        }
    }
    StorageError::Connection(e.to_string())
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

pub(crate) fn id_to_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

pub(crate) fn module_id_from_i64(v: i64) -> Result<ModuleId, StorageError> {
    Ok(ModuleId::new(i64_to_u64("module_id", v)?))
}

pub(crate) fn lesson_id_from_i64(v: i64) -> Result<LessonId, StorageError> {
    Ok(LessonId::new(i64_to_u64("lesson_id", v)?))
}

pub(crate) fn user_id_from_i64(v: i64) -> Result<UserId, StorageError> {
    Ok(UserId::new(i64_to_u64("user_id", v)?))
}

fn flag(row: &SqliteRow, column: &str) -> Result<bool, StorageError> {
    Ok(row.try_get::<i64, _>(column).map_err(ser)? != 0)
}

pub(crate) const MODULE_COLUMNS: &str = "id, title, slug, description, category, duration, thumbnail, is_published, created_at, updated_at";

pub(crate) fn map_module_row(row: &SqliteRow) -> Result<Module, StorageError> {
    let draft = ModuleDraft {
        title: row.try_get("title").map_err(ser)?,
        slug: row.try_get("slug").map_err(ser)?,
        description: row.try_get("description").map_err(ser)?,
        category: row.try_get("category").map_err(ser)?,
        duration: row.try_get("duration").map_err(ser)?,
        thumbnail: row.try_get("thumbnail").map_err(ser)?,
        is_published: flag(row, "is_published")?,
    };
    Module::from_persisted(
        module_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        draft,
        row.try_get("created_at").map_err(ser)?,
        row.try_get("updated_at").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) const LESSON_COLUMNS: &str = "id, module_id, title, slug, description, kind, sort_order, duration, video_url, document_url, content, is_published, is_free, created_at, updated_at";

pub(crate) fn map_lesson_row(row: &SqliteRow) -> Result<Lesson, StorageError> {
    let kind: String = row.try_get("kind").map_err(ser)?;
    let draft = LessonDraft {
        module_id: module_id_from_i64(row.try_get::<i64, _>("module_id").map_err(ser)?)?,
        title: row.try_get("title").map_err(ser)?,
        slug: row.try_get("slug").map_err(ser)?,
        description: row.try_get("description").map_err(ser)?,
        kind: LessonKind::parse(&kind),
        order: row.try_get("sort_order").map_err(ser)?,
        duration: row.try_get("duration").map_err(ser)?,
        video_url: row.try_get("video_url").map_err(ser)?,
        document_url: row.try_get("document_url").map_err(ser)?,
        content: row.try_get("content").map_err(ser)?,
        is_published: flag(row, "is_published")?,
        is_free: flag(row, "is_free")?,
    };
    Lesson::from_persisted(
        lesson_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        draft,
        row.try_get("created_at").map_err(ser)?,
        row.try_get("updated_at").map_err(ser)?,
    )
    .map_err(ser)
}

/// Columns for a progress record joined with its lesson (`p` and `l` aliases).
pub(crate) const PROGRESS_ENTRY_SELECT: &str = r"
    SELECT p.id, p.user_id, p.lesson_id, p.completed, p.completed_at, p.created_at, p.updated_at,
           l.module_id AS lesson_module_id, l.title AS lesson_title, l.slug AS lesson_slug,
           l.kind AS lesson_kind, l.sort_order AS lesson_order
    FROM user_progress p
    JOIN lessons l ON l.id = p.lesson_id
";

pub(crate) fn map_progress_entry_row(row: &SqliteRow) -> Result<ProgressEntry, StorageError> {
    let lesson_id = lesson_id_from_i64(row.try_get::<i64, _>("lesson_id").map_err(ser)?)?;
    let record = ProgressRecord {
        id: ProgressId::new(i64_to_u64("id", row.try_get::<i64, _>("id").map_err(ser)?)?),
        user_id: user_id_from_i64(row.try_get::<i64, _>("user_id").map_err(ser)?)?,
        lesson_id,
        completed: flag(row, "completed")?,
        completed_at: row.try_get("completed_at").map_err(ser)?,
        created_at: row.try_get("created_at").map_err(ser)?,
        updated_at: row.try_get("updated_at").map_err(ser)?,
    };

    let order: i64 = row.try_get("lesson_order").map_err(ser)?;
    let kind: String = row.try_get("lesson_kind").map_err(ser)?;
    let lesson = LessonSummary {
        id: lesson_id,
        module_id: module_id_from_i64(row.try_get::<i64, _>("lesson_module_id").map_err(ser)?)?,
        title: row.try_get("lesson_title").map_err(ser)?,
        slug: row.try_get("lesson_slug").map_err(ser)?,
        kind: LessonKind::parse(&kind),
        order: u32::try_from(order)
            .map_err(|_| StorageError::Serialization(format!("invalid sort_order: {order}")))?,
    };

    Ok(ProgressEntry { record, lesson })
}

pub(crate) fn map_user_row(row: &SqliteRow) -> Result<User, StorageError> {
    let email: String = row.try_get("email").map_err(ser)?;
    Ok(User::new(
        user_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        row.try_get::<String, _>("name").map_err(ser)?,
        Email::new(&email).map_err(ser)?,
        flag(row, "is_admin")?,
        row.try_get("created_at").map_err(ser)?,
    ))
}
