use super::{from_timestamp, storage_error};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use tollgate_core::{Error, repositories::OAuthRepository};

pub struct SqliteOAuthRepository {
    pool: SqlitePool,
}

impl SqliteOAuthRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SqliteOAuthState {
    pkce_verifier: String,
    expires_at: i64,
}

#[async_trait]
impl OAuthRepository for SqliteOAuthRepository {
    async fn store_pkce_verifier(
        &self,
        csrf_state: &str,
        pkce_verifier: &str,
        expires_in: Duration,
    ) -> Result<(), Error> {
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO oauth_states (csrf_state, pkce_verifier, expires_at, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(csrf_state)
        .bind(pkce_verifier)
        .bind((now + expires_in).timestamp())
        .bind(now.timestamp())
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(())
    }

    async fn take_pkce_verifier(&self, csrf_state: &str) -> Result<Option<String>, Error> {
        // Delete unconditionally so an expired state cannot be retried either.
        let row = sqlx::query_as::<_, SqliteOAuthState>(
            "DELETE FROM oauth_states WHERE csrf_state = ?1 RETURNING pkce_verifier, expires_at",
        )
        .bind(csrf_state)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        let Some(row) = row else {
            return Ok(None);
        };

        if from_timestamp(row.expires_at)? <= Utc::now() {
            tracing::debug!("Federated login state expired");
            return Ok(None);
        }

        Ok(Some(row.pkce_verifier))
    }

    async fn cleanup_expired(&self) -> Result<(), Error> {
        sqlx::query("DELETE FROM oauth_states WHERE expires_at <= ?1")
            .bind(Utc::now().timestamp())
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(())
    }
}
