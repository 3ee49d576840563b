//! Builder pattern for constructing Tollgate instances
//!
//! The builder checks at compile time that storage is configured before
//! [`TollgateBuilder::build`] can be called. The mailer is checked at build
//! time, since registration cannot work without one.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tollgate::{TollgateBuilder, VerificationMailer};
//!
//! # async fn example(mailer: Arc<dyn VerificationMailer>) -> Result<(), Box<dyn std::error::Error>> {
//! let tollgate = TollgateBuilder::new()
//!     .with_sqlite("sqlite::memory:")
//!     .await?
//!     .with_mailer(mailer)
//!     .apply_migrations(true)
//!     .build()
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use chrono::Duration;
use tollgate_core::{IdentityProvider, RepositoryProvider, VerificationMailer};

use crate::{AuthConfig, Tollgate};

/// Errors that can occur when building a Tollgate instance.
#[derive(Debug, thiserror::Error)]
pub enum TollgateBuilderError {
    /// Failed to connect to storage backend
    #[error("Storage connection failed: {0}")]
    StorageConnection(String),

    /// Failed to run database migrations
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Invalid configuration provided
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Marker type indicating no storage has been configured yet.
pub struct NoStorage;

/// Marker type indicating storage has been configured.
pub struct WithStorage<R: RepositoryProvider> {
    repositories: Arc<R>,
}

/// A type-safe builder for constructing [`Tollgate`] instances.
///
/// # Type States
///
/// - [`NoStorage`]: Initial state, storage must be configured
/// - [`WithStorage<R>`]: Storage configured, ready to build
pub struct TollgateBuilder<Storage> {
    storage: Storage,
    config: AuthConfig,
    mailer: Option<Arc<dyn VerificationMailer>>,
    providers: Vec<Arc<dyn IdentityProvider>>,
    apply_migrations: bool,
}

impl Default for TollgateBuilder<NoStorage> {
    fn default() -> Self {
        Self::new()
    }
}

impl TollgateBuilder<NoStorage> {
    /// Create a new builder with default lifetimes and no migrations
    pub fn new() -> Self {
        Self {
            storage: NoStorage,
            config: AuthConfig::default(),
            mailer: None,
            providers: Vec::new(),
            apply_migrations: false,
        }
    }

    /// Use an already constructed repository provider
    pub fn with_repositories<R: RepositoryProvider>(
        self,
        repositories: Arc<R>,
    ) -> TollgateBuilder<WithStorage<R>> {
        TollgateBuilder {
            storage: WithStorage { repositories },
            config: self.config,
            mailer: self.mailer,
            providers: self.providers,
            apply_migrations: self.apply_migrations,
        }
    }
}

#[cfg(feature = "sqlite")]
impl TollgateBuilder<NoStorage> {
    /// Configure SQLite storage by connecting to the given URL.
    ///
    /// * `url` - SQLite connection URL (e.g., "sqlite::memory:" or "sqlite://tollgate.db?mode=rwc")
    pub async fn with_sqlite(
        self,
        url: &str,
    ) -> Result<TollgateBuilder<WithStorage<crate::SqliteRepositoryProvider>>, TollgateBuilderError>
    {
        let repositories = crate::SqliteRepositoryProvider::connect(url)
            .await
            .map_err(|e| TollgateBuilderError::StorageConnection(e.to_string()))?;

        Ok(self.with_repositories(Arc::new(repositories)))
    }
}

impl<S> TollgateBuilder<S> {
    /// Set the session lifetime; defaults to 7 days
    pub fn with_session_expiry(mut self, duration: Duration) -> Self {
        self.config.session_expiration = duration;
        self
    }

    /// Set the verification code lifetime; defaults to 10 minutes
    pub fn with_code_expiry(mut self, duration: Duration) -> Self {
        self.config.code_expiration = duration;
        self
    }

    pub fn with_mailer(mut self, mailer: Arc<dyn VerificationMailer>) -> Self {
        self.mailer = Some(mailer);
        self
    }

    /// Enable federated login through `provider`
    pub fn with_provider(mut self, provider: Arc<dyn IdentityProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Run pending migrations during [`TollgateBuilder::build`]
    pub fn apply_migrations(mut self, apply: bool) -> Self {
        self.apply_migrations = apply;
        self
    }
}

impl<R: RepositoryProvider> TollgateBuilder<WithStorage<R>> {
    pub async fn build(self) -> Result<Tollgate<R>, TollgateBuilderError> {
        let mailer = self.mailer.ok_or_else(|| {
            TollgateBuilderError::InvalidConfiguration(
                "a verification mailer is required".to_string(),
            )
        })?;

        if self.config.session_expiration <= Duration::zero() {
            return Err(TollgateBuilderError::InvalidConfiguration(
                "session expiry must be positive".to_string(),
            ));
        }
        if self.config.code_expiration <= Duration::zero() {
            return Err(TollgateBuilderError::InvalidConfiguration(
                "verification code expiry must be positive".to_string(),
            ));
        }

        if self.apply_migrations {
            self.storage
                .repositories
                .migrate()
                .await
                .map_err(|e| TollgateBuilderError::Migration(e.to_string()))?;
        }

        let tollgate = self
            .providers
            .into_iter()
            .fold(
                Tollgate::with_config(self.storage.repositories, mailer, self.config),
                Tollgate::with_provider,
            );

        Ok(tollgate)
    }
}
