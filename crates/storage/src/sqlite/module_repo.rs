use academy_core::model::{Audience, Module, ModuleDraft, ModuleId};
use chrono::{DateTime, Utc};

use super::SqliteRepository;
use super::mapping::{MODULE_COLUMNS, db_err, id_to_i64, map_module_row, module_id_from_i64};
use crate::repository::{ModuleRepository, NewModuleRecord, StorageError};

#[async_trait::async_trait]
impl ModuleRepository for SqliteRepository {
    async fn insert_module(&self, module: NewModuleRecord) -> Result<ModuleId, StorageError> {
        let draft = module.draft;
        let res = sqlx::query(
            r"
            INSERT INTO modules (title, slug, description, category, duration, thumbnail, is_published, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
            ",
        )
        .bind(draft.title)
        .bind(draft.slug)
        .bind(draft.description)
        .bind(draft.category)
        .bind(draft.duration)
        .bind(draft.thumbnail)
        .bind(i64::from(draft.is_published))
        .bind(module.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        module_id_from_i64(res.last_insert_rowid())
    }

    async fn update_module(
        &self,
        id: ModuleId,
        draft: &ModuleDraft,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let res = sqlx::query(
            r"
            UPDATE modules SET
                title = ?2,
                slug = ?3,
                description = ?4,
                category = ?5,
                duration = ?6,
                thumbnail = ?7,
                is_published = ?8,
                updated_at = ?9
            WHERE id = ?1
            ",
        )
        .bind(id_to_i64("module_id", id.value())?)
        .bind(&draft.title)
        .bind(&draft.slug)
        .bind(&draft.description)
        .bind(&draft.category)
        .bind(&draft.duration)
        .bind(&draft.thumbnail)
        .bind(i64::from(draft.is_published))
        .bind(updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn delete_module(&self, id: ModuleId) -> Result<bool, StorageError> {
        let res = sqlx::query("DELETE FROM modules WHERE id = ?1")
            .bind(id_to_i64("module_id", id.value())?)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(res.rows_affected() > 0)
    }

    async fn get_module(&self, id: ModuleId) -> Result<Option<Module>, StorageError> {
        let row = sqlx::query(&format!("SELECT {MODULE_COLUMNS} FROM modules WHERE id = ?1"))
            .bind(id_to_i64("module_id", id.value())?)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        row.as_ref().map(map_module_row).transpose()
    }

    async fn list_modules(&self, audience: Audience) -> Result<Vec<Module>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT {MODULE_COLUMNS} FROM modules WHERE is_published = 1 OR ?1 ORDER BY id ASC"
        ))
        .bind(audience.sees_unpublished())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter().map(map_module_row).collect()
    }
}
