use super::{from_timestamp, storage_error};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tollgate_core::{
    Error, NewVerificationCode, VerificationCode, repositories::VerificationCodeRepository,
};

pub struct SqliteVerificationCodeRepository {
    pool: SqlitePool,
}

impl SqliteVerificationCodeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct SqliteVerificationCode {
    id: i64,
    email: String,
    code: String,
    expires_at: i64,
    used: bool,
    created_at: i64,
}

impl TryFrom<SqliteVerificationCode> for VerificationCode {
    type Error = Error;

    fn try_from(row: SqliteVerificationCode) -> Result<Self, Self::Error> {
        Ok(VerificationCode {
            id: row.id,
            email: row.email,
            code: row.code,
            expires_at: from_timestamp(row.expires_at)?,
            used: row.used,
            created_at: from_timestamp(row.created_at)?,
        })
    }
}

#[async_trait]
impl VerificationCodeRepository for SqliteVerificationCodeRepository {
    async fn create(&self, code: NewVerificationCode) -> Result<VerificationCode, Error> {
        sqlx::query_as::<_, SqliteVerificationCode>(
            r#"
            INSERT INTO verification_codes (email, code, expires_at, used, created_at)
            VALUES (?1, ?2, ?3, 0, ?4)
            RETURNING id, email, code, expires_at, used, created_at
            "#,
        )
        .bind(&code.email)
        .bind(&code.code)
        .bind(code.expires_at.timestamp())
        .bind(Utc::now().timestamp())
        .fetch_one(&self.pool)
        .await
        .map_err(storage_error)?
        .try_into()
    }

    async fn find_latest(
        &self,
        email: &str,
        code: &str,
    ) -> Result<Option<VerificationCode>, Error> {
        sqlx::query_as::<_, SqliteVerificationCode>(
            r#"
            SELECT id, email, code, expires_at, used, created_at
            FROM verification_codes
            WHERE email = ?1 AND code = ?2
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(email)
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?
        .map(VerificationCode::try_from)
        .transpose()
    }

    async fn mark_used(&self, id: i64, now: DateTime<Utc>) -> Result<bool, Error> {
        // Single conditional write: of two concurrent consumers exactly one
        // sees a changed row.
        let result = sqlx::query(
            "UPDATE verification_codes SET used = 1 WHERE id = ?1 AND used = 0 AND expires_at >= ?2",
        )
        .bind(id)
        .bind(now.timestamp())
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete_expired_for_email(
        &self,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<u64, Error> {
        let result =
            sqlx::query("DELETE FROM verification_codes WHERE email = ?1 AND expires_at < ?2")
                .bind(email)
                .bind(now.timestamp())
                .execute(&self.pool)
                .await
                .map_err(storage_error)?;

        Ok(result.rows_affected())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, Error> {
        let result = sqlx::query("DELETE FROM verification_codes WHERE expires_at < ?1")
            .bind(now.timestamp())
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(result.rows_affected())
    }
}
