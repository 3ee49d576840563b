use super::storage_error;
use async_trait::async_trait;
use sqlx::SqlitePool;
use tollgate_core::{Error, UserId, repositories::PasswordRepository};

pub struct SqlitePasswordRepository {
    pool: SqlitePool,
}

impl SqlitePasswordRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PasswordRepository for SqlitePasswordRepository {
    async fn get_password_hash(&self, user_id: &UserId) -> Result<Option<String>, Error> {
        let hash: Option<Option<String>> =
            sqlx::query_scalar("SELECT password_hash FROM users WHERE id = ?1")
                .bind(user_id.as_i64())
                .fetch_optional(&self.pool)
                .await
                .map_err(storage_error)?;

        Ok(hash.flatten())
    }
}
