//! SQLite credential store for tollgate
//!
//! [`SqliteRepositoryProvider`] implements every repository trait from
//! `tollgate-core` over one connection pool and owns the schema migrations.
//!
//! ```rust,no_run
//! use tollgate_core::RepositoryProvider;
//! use tollgate_storage_sqlite::SqliteRepositoryProvider;
//!
//! # async fn run() -> Result<(), tollgate_core::Error> {
//! let store = SqliteRepositoryProvider::connect("sqlite://tollgate.db?mode=rwc").await?;
//! store.migrate().await?;
//! # Ok(())
//! # }
//! ```
pub mod migrations;
pub mod repositories;

pub use repositories::{
    SqliteOAuthRepository, SqlitePasswordRepository, SqliteSessionRepository,
    SqliteUserRepository, SqliteVerificationCodeRepository,
};

use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tollgate_core::{
    Error,
    error::StorageError,
    repositories::{
        OAuthRepositoryProvider, PasswordRepositoryProvider, RepositoryProvider,
        SessionRepositoryProvider, UserRepositoryProvider, VerificationCodeRepositoryProvider,
    },
};
use tollgate_migration::MigrationManager;

/// Repository provider implementation for SQLite
pub struct SqliteRepositoryProvider {
    pool: SqlitePool,
    user: SqliteUserRepository,
    session: SqliteSessionRepository,
    password: SqlitePasswordRepository,
    verification_code: SqliteVerificationCodeRepository,
    oauth: SqliteOAuthRepository,
}

impl SqliteRepositoryProvider {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            user: SqliteUserRepository::new(pool.clone()),
            session: SqliteSessionRepository::new(pool.clone()),
            password: SqlitePasswordRepository::new(pool.clone()),
            verification_code: SqliteVerificationCodeRepository::new(pool.clone()),
            oauth: SqliteOAuthRepository::new(pool.clone()),
            pool,
        }
    }

    /// Open a pool for `database_url`
    ///
    /// `sqlite::memory:` URLs get a single connection, since every
    /// connection to an in-memory database sees its own empty database.
    pub async fn connect(database_url: &str) -> Result<Self, Error> {
        let mut options = SqlitePoolOptions::new();
        if database_url.contains(":memory:") {
            options = options.max_connections(1);
        }

        let pool = options.connect(database_url).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to open SQLite database");
            Error::Storage(StorageError::Connection(e.to_string()))
        })?;

        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl UserRepositoryProvider for SqliteRepositoryProvider {
    type UserRepo = SqliteUserRepository;

    fn user(&self) -> &Self::UserRepo {
        &self.user
    }
}

impl SessionRepositoryProvider for SqliteRepositoryProvider {
    type SessionRepo = SqliteSessionRepository;

    fn session(&self) -> &Self::SessionRepo {
        &self.session
    }
}

impl PasswordRepositoryProvider for SqliteRepositoryProvider {
    type PasswordRepo = SqlitePasswordRepository;

    fn password(&self) -> &Self::PasswordRepo {
        &self.password
    }
}

impl VerificationCodeRepositoryProvider for SqliteRepositoryProvider {
    type VerificationCodeRepo = SqliteVerificationCodeRepository;

    fn verification_code(&self) -> &Self::VerificationCodeRepo {
        &self.verification_code
    }
}

impl OAuthRepositoryProvider for SqliteRepositoryProvider {
    type OAuthRepo = SqliteOAuthRepository;

    fn oauth(&self) -> &Self::OAuthRepo {
        &self.oauth
    }
}

#[async_trait]
impl RepositoryProvider for SqliteRepositoryProvider {
    async fn migrate(&self) -> Result<(), Error> {
        let manager = migrations::SqliteMigrationManager::new(self.pool.clone());
        manager.initialize().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to initialize migrations");
            Error::from(e)
        })?;

        manager.up(&migrations::all()).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to run migrations");
            Error::from(e)
        })?;

        Ok(())
    }

    async fn health_check(&self) -> Result<(), Error> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| Error::Storage(StorageError::Database(e.to_string())))?;
        Ok(())
    }
}
