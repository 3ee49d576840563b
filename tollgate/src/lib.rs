//! # Tollgate
//!
//! Tollgate is the session authority behind a multi-service application. It
//! owns registration, email verification, password and federated login,
//! logout, and "who am I" resolution, all over an injected credential store.
//!
//! Every account moves through `Unregistered → PendingVerification →
//! Verified`; verified accounts cycle between logged out and logged in. A user
//! holds at most one live session: each login replaces the previous one.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tollgate::{Tollgate, VerificationMailer};
//! use tollgate_storage_sqlite::SqliteRepositoryProvider;
//!
//! # async fn run(mailer: Arc<dyn VerificationMailer>) -> Result<(), tollgate::Error> {
//! let repositories = Arc::new(SqliteRepositoryProvider::connect("sqlite::memory:").await?);
//! let tollgate = Tollgate::new(repositories, mailer);
//! tollgate.migrate().await?;
//!
//! let user_id = tollgate.register("a@x.com", "secret1", "Ann").await?;
//! # Ok(())
//! # }
//! ```
mod builder;

use std::{collections::HashMap, sync::Arc};

use chrono::Duration;
use tollgate_core::{
    RepositoryProvider,
    error::{AuthError, IdentityError, SessionError},
    repositories::{
        OAuthRepositoryAdapter, PasswordRepositoryAdapter, SessionRepositoryAdapter,
        UserRepositoryAdapter, VerificationCodeRepositoryAdapter,
    },
    services::{OAuthService, PasswordService, SessionService, UserService, VerificationService},
};

pub use builder::{NoStorage, TollgateBuilder, TollgateBuilderError, WithStorage};

/// Re-export core types from tollgate_core
pub use tollgate_core::{
    Error, ExternalIdentity, IdentityProvider, PublicUser, Session, SessionToken, User, UserId,
    VerificationMailer, VerificationOutcome,
};

#[cfg(feature = "sqlite")]
pub use tollgate_storage_sqlite::SqliteRepositoryProvider;

/// Lifetimes of the credentials Tollgate hands out
#[derive(Debug, Clone, Copy)]
pub struct AuthConfig {
    /// Lifetime of a session; the session cookie's max-age should match
    pub session_expiration: Duration,
    /// Lifetime of an email verification code
    pub code_expiration: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_expiration: Duration::days(7),
            code_expiration: Duration::minutes(10),
        }
    }
}

/// Result of [`Tollgate::resend_code`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResendOutcome {
    /// A fresh code was stored and mailed
    Sent,
    /// The account needs no code; nothing was sent
    AlreadyVerified,
}

type Users<R> = UserRepositoryAdapter<R>;

/// The auth coordinator composing every service over one credential store.
///
/// Handlers should share one instance behind an `Arc`; it holds no
/// per-request state.
pub struct Tollgate<R: RepositoryProvider> {
    repositories: Arc<R>,
    user_service: Arc<UserService<Users<R>>>,
    password_service: Arc<PasswordService<Users<R>, PasswordRepositoryAdapter<R>>>,
    session_service: Arc<SessionService<SessionRepositoryAdapter<R>, Users<R>>>,
    verification_service: Arc<VerificationService<VerificationCodeRepositoryAdapter<R>>>,
    oauth_service: Arc<OAuthService<Users<R>, OAuthRepositoryAdapter<R>>>,
    mailer: Arc<dyn VerificationMailer>,
    providers: HashMap<String, Arc<dyn IdentityProvider>>,
}

impl<R: RepositoryProvider> Tollgate<R> {
    /// Create a new Tollgate instance with default lifetimes
    pub fn new(repositories: Arc<R>, mailer: Arc<dyn VerificationMailer>) -> Self {
        Self::with_config(repositories, mailer, AuthConfig::default())
    }

    pub fn with_config(
        repositories: Arc<R>,
        mailer: Arc<dyn VerificationMailer>,
        config: AuthConfig,
    ) -> Self {
        let user_repo = Arc::new(UserRepositoryAdapter::new(repositories.clone()));

        Self {
            user_service: Arc::new(UserService::new(user_repo.clone())),
            password_service: Arc::new(PasswordService::new(
                user_repo.clone(),
                Arc::new(PasswordRepositoryAdapter::new(repositories.clone())),
            )),
            session_service: Arc::new(
                SessionService::new(
                    Arc::new(SessionRepositoryAdapter::new(repositories.clone())),
                    user_repo.clone(),
                )
                .with_expiration(config.session_expiration),
            ),
            verification_service: Arc::new(
                VerificationService::new(Arc::new(VerificationCodeRepositoryAdapter::new(
                    repositories.clone(),
                )))
                .with_expiration(config.code_expiration),
            ),
            oauth_service: Arc::new(OAuthService::new(
                user_repo,
                Arc::new(OAuthRepositoryAdapter::new(repositories.clone())),
            )),
            repositories,
            mailer,
            providers: HashMap::new(),
        }
    }

    /// Register an identity provider under its [`IdentityProvider::name`]
    pub fn with_provider(mut self, provider: Arc<dyn IdentityProvider>) -> Self {
        self.providers.insert(provider.name().to_string(), provider);
        self
    }

    pub fn has_provider(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    /// Run migrations for all repositories
    pub async fn migrate(&self) -> Result<(), Error> {
        self.repositories.migrate().await
    }

    /// Health check for all repositories
    pub async fn health_check(&self) -> Result<(), Error> {
        self.repositories.health_check().await
    }

    /// Register a local account and mail it a verification code
    ///
    /// If mailing fails the error is returned, but the account and code stay
    /// stored; the caller recovers with [`Self::resend_code`].
    pub async fn register(&self, email: &str, password: &str, name: &str) -> Result<UserId, Error> {
        let user = self.password_service.register(email, password, name).await?;
        tracing::info!(user_id = %user.id, "User registered");

        let code = self.verification_service.issue(&user.email).await?;
        self.mailer
            .send_verification_code(&user.email, Some(&user.name), &code.code)
            .await?;

        Ok(user.id)
    }

    /// Check a verification code and mark the email verified
    ///
    /// Unknown, used, and expired codes all fail with
    /// [`AuthError::InvalidOrExpiredCode`].
    pub async fn verify_email(&self, email: &str, code: &str) -> Result<(), Error> {
        let outcome = self.verification_service.verify(email, code).await?;
        if !outcome.is_valid() {
            tracing::debug!(?outcome, "Verification code rejected");
            return Err(Error::Auth(AuthError::InvalidOrExpiredCode));
        }

        self.user_service.mark_email_verified(email).await?;
        tracing::info!("Email verified");
        Ok(())
    }

    /// Log in with email and password, replacing any earlier session
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, Session), Error> {
        let user = self.password_service.authenticate(email, password).await?;
        let session = self.session_service.issue(&user.id).await?;
        Ok((user, session))
    }

    /// Mail a fresh verification code to an unverified account
    ///
    /// Expired codes for the address are purged first. Mailing failures
    /// behave as in [`Self::register`].
    pub async fn resend_code(&self, email: &str) -> Result<ResendOutcome, Error> {
        let user = self
            .user_service
            .get_user_by_email(email)
            .await?
            .ok_or(Error::Auth(AuthError::UserNotFound))?;

        if user.verified {
            return Ok(ResendOutcome::AlreadyVerified);
        }

        let purged = self.verification_service.cleanup(email).await?;
        tracing::debug!(user_id = %user.id, purged, "Expired verification codes purged");

        let code = self.verification_service.issue(email).await?;
        self.mailer
            .send_verification_code(email, Some(&user.name), &code.code)
            .await?;

        tracing::info!(user_id = %user.id, "Verification code resent");
        Ok(ResendOutcome::Sent)
    }

    /// Bind an external identity to an account and open a session for it
    ///
    /// The account is created verified on first login. No password is ever
    /// checked on this path.
    pub async fn complete_federated_login(
        &self,
        identity: &ExternalIdentity,
    ) -> Result<(User, Session), Error> {
        let user = self.oauth_service.get_or_create_user(identity).await?;
        let session = self.session_service.issue(&user.id).await?;
        Ok((user, session))
    }

    /// Start a federated login and return the provider URL to redirect to
    pub async fn begin_federated_login(&self, provider: &str) -> Result<String, Error> {
        let provider = self.provider(provider)?;
        self.oauth_service.begin(provider.as_ref()).await
    }

    /// Finish a federated login from the provider's callback parameters
    pub async fn finish_federated_login(
        &self,
        provider: &str,
        code: &str,
        state: &str,
    ) -> Result<(User, Session), Error> {
        let provider = self.provider(provider)?;
        let identity = self
            .oauth_service
            .finish(provider.as_ref(), code, state)
            .await?;
        self.complete_federated_login(&identity).await
    }

    /// Resolve a session token to its user
    ///
    /// Unknown and expired tokens both fail with [`SessionError::NotFound`].
    pub async fn current_user(&self, token: &SessionToken) -> Result<User, Error> {
        self.session_service
            .resolve(token)
            .await?
            .ok_or(Error::Session(SessionError::NotFound))
    }

    /// End the session identified by `token`
    ///
    /// Presenting no token fails with [`SessionError::NoSession`]; a token
    /// that matches no session is not an error.
    pub async fn logout(&self, token: Option<&SessionToken>) -> Result<(), Error> {
        let token = token.ok_or(Error::Session(SessionError::NoSession))?;
        self.session_service.revoke(token).await?;
        tracing::info!("Session revoked");
        Ok(())
    }

    pub async fn get_user(&self, user_id: &UserId) -> Result<Option<User>, Error> {
        self.user_service.get_user(user_id).await
    }

    /// Search users by name or email; see [`UserService::search_users`]
    pub async fn search_users(&self, query: &str, limit: Option<u32>) -> Result<Vec<User>, Error> {
        self.user_service.search_users(query, limit).await
    }

    /// Remove expired sessions, verification codes, and login states
    pub async fn cleanup(&self) -> Result<(), Error> {
        self.session_service.cleanup_expired_sessions().await?;
        let codes = self.verification_service.cleanup_all_expired().await?;
        self.oauth_service.cleanup_expired_states().await?;
        tracing::debug!(codes, "Expired credentials cleaned up");
        Ok(())
    }

    fn provider(&self, name: &str) -> Result<&Arc<dyn IdentityProvider>, Error> {
        self.providers
            .get(name)
            .ok_or_else(|| Error::Identity(IdentityError::UnknownProvider(name.to_string())))
    }
}
