use super::{from_timestamp, storage_error};
use async_trait::async_trait;
use sqlx::SqlitePool;
use tollgate_core::{AccountOrigin, Error, NewUser, User, UserId, repositories::UserRepository};

pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct SqliteUser {
    id: i64,
    external_id: Option<String>,
    email: String,
    name: String,
    avatar_url: Option<String>,
    verified: bool,
    created_at: i64,
}

impl TryFrom<SqliteUser> for User {
    type Error = Error;

    fn try_from(user: SqliteUser) -> Result<Self, Self::Error> {
        let origin = match user.external_id {
            Some(external_id) => AccountOrigin::Federated { external_id },
            None => AccountOrigin::Local,
        };

        User::builder()
            .id(UserId::new(user.id))
            .email(user.email)
            .name(user.name)
            .avatar_url(user.avatar_url)
            .origin(origin)
            .verified(user.verified)
            .created_at(from_timestamp(user.created_at)?)
            .build()
    }
}

const USER_COLUMNS: &str = "id, external_id, email, name, avatar_url, verified, created_at";

/// Escape `%`, `_` and `\` so user input matches literally inside `LIKE`
fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, Error> {
        let now = chrono::Utc::now().timestamp();

        let sqlite_user = sqlx::query_as::<_, SqliteUser>(&format!(
            r#"
            INSERT INTO users (external_id, email, password_hash, name, avatar_url, verified, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.origin.external_id())
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(&user.avatar_url)
        .bind(user.verified)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(storage_error)?;

        let user = User::try_from(sqlite_user)?;
        tracing::info!(
            user_id = %user.id,
            federated = user.origin.is_federated(),
            "User created"
        );
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, Error> {
        sqlx::query_as::<_, SqliteUser>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?1"
        ))
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?
        .map(User::try_from)
        .transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        sqlx::query_as::<_, SqliteUser>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?
        .map(User::try_from)
        .transpose()
    }

    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<User>, Error> {
        sqlx::query_as::<_, SqliteUser>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE external_id = ?1"
        ))
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?
        .map(User::try_from)
        .transpose()
    }

    async fn mark_email_verified(&self, email: &str) -> Result<(), Error> {
        sqlx::query("UPDATE users SET verified = 1 WHERE email = ?1 AND verified = 0")
            .bind(email)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(())
    }

    async fn search(&self, query: &str, limit: u32) -> Result<Vec<User>, Error> {
        let pattern = like_pattern(query);

        // LIKE is case-insensitive for ASCII in SQLite.
        let rows = sqlx::query_as::<_, SqliteUser>(&format!(
            r#"
            SELECT {USER_COLUMNS} FROM users
            WHERE name LIKE ?1 ESCAPE '\' OR email LIKE ?1 ESCAPE '\'
            ORDER BY id
            LIMIT ?2
            "#
        ))
        .bind(pattern)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        rows.into_iter().map(User::try_from).collect()
    }
}
