use academy_core::model::{User, UserId};
use chrono::{DateTime, Utc};

use super::SqliteRepository;
use super::mapping::{db_err, id_to_i64, map_user_row};
use crate::repository::{AccessTokenRepository, StorageError};

#[async_trait::async_trait]
impl AccessTokenRepository for SqliteRepository {
    async fn insert_token(
        &self,
        user_id: UserId,
        token_hash: &str,
        name: &str,
        created_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO access_tokens (user_id, token_hash, name, created_at)
            VALUES (?1, ?2, ?3, ?4)
            ",
        )
        .bind(id_to_i64("user_id", user_id.value())?)
        .bind(token_hash)
        .bind(name)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn find_user_by_token(&self, token_hash: &str) -> Result<Option<User>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT u.id, u.name, u.email, u.is_admin, u.created_at
            FROM access_tokens t
            JOIN users u ON u.id = t.user_id
            WHERE t.token_hash = ?1
            ",
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.as_ref().map(map_user_row).transpose()
    }

    async fn revoke_token(&self, token_hash: &str) -> Result<bool, StorageError> {
        let res = sqlx::query("DELETE FROM access_tokens WHERE token_hash = ?1")
            .bind(token_hash)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(res.rows_affected() > 0)
    }
}
