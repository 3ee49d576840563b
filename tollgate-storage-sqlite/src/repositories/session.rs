use super::{from_timestamp, storage_error};
use async_trait::async_trait;
use sqlx::SqlitePool;
use tollgate_core::{
    Error, Session, UserId, repositories::SessionRepository, session::SessionToken,
};

pub struct SqliteSessionRepository {
    pool: SqlitePool,
}

impl SqliteSessionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct SqliteSession {
    /// SHA256 of the token, never the token itself
    token: String,
    user_id: i64,
    created_at: i64,
    expires_at: i64,
}

#[async_trait]
impl SessionRepository for SqliteSessionRepository {
    async fn create(&self, session: Session) -> Result<Session, Error> {
        sqlx::query(
            r#"
            INSERT INTO sessions (token, user_id, created_at, expires_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(session.token.token_hash())
        .bind(session.user_id.as_i64())
        .bind(session.created_at.timestamp())
        .bind(session.expires_at.timestamp())
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        // The caller keeps the plaintext token; storage never returns it.
        Ok(session)
    }

    async fn find_by_token(&self, token: &SessionToken) -> Result<Option<Session>, Error> {
        let row = sqlx::query_as::<_, SqliteSession>(
            "SELECT token, user_id, created_at, expires_at FROM sessions WHERE token = ?1",
        )
        .bind(token.token_hash())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        let Some(row) = row else {
            return Ok(None);
        };

        if !token.verify_hash(&row.token) {
            return Ok(None);
        }

        Session::builder()
            .token(token.clone())
            .user_id(UserId::new(row.user_id))
            .created_at(from_timestamp(row.created_at)?)
            .expires_at(from_timestamp(row.expires_at)?)
            .build()
            .map(Some)
    }

    async fn delete(&self, token: &SessionToken) -> Result<(), Error> {
        sqlx::query("DELETE FROM sessions WHERE token = ?1")
            .bind(token.token_hash())
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(())
    }

    async fn delete_by_user_id(&self, user_id: &UserId) -> Result<(), Error> {
        sqlx::query("DELETE FROM sessions WHERE user_id = ?1")
            .bind(user_id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(())
    }

    async fn count_by_user_id(&self, user_id: &UserId) -> Result<u64, Error> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sessions WHERE user_id = ?1")
            .bind(user_id.as_i64())
            .fetch_one(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(count.max(0) as u64)
    }

    async fn cleanup_expired(&self) -> Result<(), Error> {
        let now = chrono::Utc::now().timestamp();

        let result = sqlx::query("DELETE FROM sessions WHERE expires_at < ?1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;

        tracing::debug!(deleted = result.rows_affected(), "Expired sessions removed");
        Ok(())
    }
}
