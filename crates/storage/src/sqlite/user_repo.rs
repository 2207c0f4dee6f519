use academy_core::model::{Email, User, UserId};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{db_err, id_to_i64, map_user_row, ser, user_id_from_i64};
use crate::repository::{NewUserRecord, StorageError, StoredCredentials, UserRepository};

#[async_trait::async_trait]
impl UserRepository for SqliteRepository {
    async fn insert_user(&self, user: NewUserRecord) -> Result<UserId, StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO users (name, email, password_hash, is_admin, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ",
        )
        .bind(user.name)
        .bind(user.email.as_str())
        .bind(user.password_hash)
        .bind(i64::from(user.is_admin))
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        user_id_from_i64(res.last_insert_rowid())
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, StorageError> {
        let row = sqlx::query(
            "SELECT id, name, email, is_admin, created_at FROM users WHERE id = ?1",
        )
        .bind(id_to_i64("user_id", id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.as_ref().map(map_user_row).transpose()
    }

    async fn find_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<StoredCredentials>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, name, email, is_admin, created_at, password_hash
            FROM users WHERE email = ?1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(StoredCredentials {
            user: map_user_row(&row)?,
            password_hash: row.try_get("password_hash").map_err(ser)?,
        }))
    }
}
