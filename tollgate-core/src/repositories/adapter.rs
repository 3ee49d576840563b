use crate::{
    Error, NewUser, Session, User, UserId,
    repositories::{
        OAuthRepository, PasswordRepository, RepositoryProvider, SessionRepository,
        UserRepository, VerificationCodeRepository,
    },
    session::SessionToken,
    verification::{NewVerificationCode, VerificationCode},
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

/// Adapter that wraps a RepositoryProvider and implements individual repository traits
pub struct UserRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> UserRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> UserRepository for UserRepositoryAdapter<R> {
    async fn create(&self, user: NewUser) -> Result<User, Error> {
        self.provider.user().create(user).await
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, Error> {
        self.provider.user().find_by_id(id).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        self.provider.user().find_by_email(email).await
    }

    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<User>, Error> {
        self.provider.user().find_by_external_id(external_id).await
    }

    async fn mark_email_verified(&self, email: &str) -> Result<(), Error> {
        self.provider.user().mark_email_verified(email).await
    }

    async fn search(&self, query: &str, limit: u32) -> Result<Vec<User>, Error> {
        self.provider.user().search(query, limit).await
    }
}

pub struct SessionRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> SessionRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> SessionRepository for SessionRepositoryAdapter<R> {
    async fn create(&self, session: Session) -> Result<Session, Error> {
        self.provider.session().create(session).await
    }

    async fn find_by_token(&self, token: &SessionToken) -> Result<Option<Session>, Error> {
        self.provider.session().find_by_token(token).await
    }

    async fn delete(&self, token: &SessionToken) -> Result<(), Error> {
        self.provider.session().delete(token).await
    }

    async fn delete_by_user_id(&self, user_id: &UserId) -> Result<(), Error> {
        self.provider.session().delete_by_user_id(user_id).await
    }

    async fn count_by_user_id(&self, user_id: &UserId) -> Result<u64, Error> {
        self.provider.session().count_by_user_id(user_id).await
    }

    async fn cleanup_expired(&self) -> Result<(), Error> {
        self.provider.session().cleanup_expired().await
    }
}

pub struct PasswordRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> PasswordRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> PasswordRepository for PasswordRepositoryAdapter<R> {
    async fn get_password_hash(&self, user_id: &UserId) -> Result<Option<String>, Error> {
        self.provider.password().get_password_hash(user_id).await
    }
}

pub struct VerificationCodeRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> VerificationCodeRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> VerificationCodeRepository for VerificationCodeRepositoryAdapter<R> {
    async fn create(&self, code: NewVerificationCode) -> Result<VerificationCode, Error> {
        self.provider.verification_code().create(code).await
    }

    async fn find_latest(
        &self,
        email: &str,
        code: &str,
    ) -> Result<Option<VerificationCode>, Error> {
        self.provider.verification_code().find_latest(email, code).await
    }

    async fn mark_used(&self, id: i64, now: DateTime<Utc>) -> Result<bool, Error> {
        self.provider.verification_code().mark_used(id, now).await
    }

    async fn delete_expired_for_email(
        &self,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<u64, Error> {
        self.provider
            .verification_code()
            .delete_expired_for_email(email, now)
            .await
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, Error> {
        self.provider.verification_code().delete_expired(now).await
    }
}

pub struct OAuthRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> OAuthRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> OAuthRepository for OAuthRepositoryAdapter<R> {
    async fn store_pkce_verifier(
        &self,
        csrf_state: &str,
        pkce_verifier: &str,
        expires_in: Duration,
    ) -> Result<(), Error> {
        self.provider
            .oauth()
            .store_pkce_verifier(csrf_state, pkce_verifier, expires_in)
            .await
    }

    async fn take_pkce_verifier(&self, csrf_state: &str) -> Result<Option<String>, Error> {
        self.provider.oauth().take_pkce_verifier(csrf_state).await
    }

    async fn cleanup_expired(&self) -> Result<(), Error> {
        self.provider.oauth().cleanup_expired().await
    }
}
