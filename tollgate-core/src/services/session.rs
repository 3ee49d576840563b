use crate::{
    Error, Session, User, UserId,
    repositories::{SessionRepository, UserRepository},
    session::SessionToken,
};
use chrono::{Duration, Utc};
use std::sync::Arc;

/// Default session lifetime, matching the session cookie's max-age.
pub const DEFAULT_SESSION_EXPIRATION: Duration = Duration::days(7);

/// Service owning the session token lifecycle
///
/// Each user holds at most one live session: issuing a new one first
/// deletes every earlier session of that user.
pub struct SessionService<S: SessionRepository, U: UserRepository> {
    sessions: Arc<S>,
    users: Arc<U>,
    expires_in: Duration,
}

impl<S: SessionRepository, U: UserRepository> SessionService<S, U> {
    /// Create a new SessionService with the given repositories
    pub fn new(sessions: Arc<S>, users: Arc<U>) -> Self {
        Self {
            sessions,
            users,
            expires_in: DEFAULT_SESSION_EXPIRATION,
        }
    }

    /// Override the lifetime given to sessions issued by [`Self::issue`]
    pub fn with_expiration(mut self, expires_in: Duration) -> Self {
        self.expires_in = expires_in;
        self
    }

    pub fn expires_in(&self) -> Duration {
        self.expires_in
    }

    /// Issue a new session for a user, superseding any earlier ones
    pub async fn issue(&self, user_id: &UserId) -> Result<Session, Error> {
        self.issue_with_expiration(user_id, self.expires_in).await
    }

    /// Issue a new session with a caller-supplied lifetime
    ///
    /// Deleting the previous sessions is best effort. A failure there is
    /// logged and the new session is still created, so the user may briefly
    /// hold two sessions.
    pub async fn issue_with_expiration(
        &self,
        user_id: &UserId,
        expires_in: Duration,
    ) -> Result<Session, Error> {
        let now = Utc::now();
        let session = Session::builder()
            .token(SessionToken::new_random()?)
            .user_id(*user_id)
            .created_at(now)
            .expires_at(now + expires_in)
            .build()?;

        if let Err(e) = self.sessions.delete_by_user_id(user_id).await {
            tracing::warn!(
                user_id = %user_id,
                error = %e,
                "Failed to delete previous sessions, issuing new session anyway"
            );
        }

        let session = self.sessions.create(session).await?;
        tracing::info!(user_id = %user_id, "Session issued");
        Ok(session)
    }

    /// Resolve a token to its user
    ///
    /// Returns `None` both for unknown tokens and for expired ones.
    pub async fn resolve(&self, token: &SessionToken) -> Result<Option<User>, Error> {
        let Some(session) = self.sessions.find_by_token(token).await? else {
            return Ok(None);
        };

        if session.is_expired() {
            tracing::debug!(user_id = %session.user_id, "Session expired");
            return Ok(None);
        }

        self.users.find_by_id(&session.user_id).await
    }

    /// Delete a session; unknown tokens are ignored
    pub async fn revoke(&self, token: &SessionToken) -> Result<(), Error> {
        self.sessions.delete(token).await
    }

    /// Number of session rows held by a user
    pub async fn session_count(&self, user_id: &UserId) -> Result<u64, Error> {
        self.sessions.count_by_user_id(user_id).await
    }

    /// Clean up expired sessions
    pub async fn cleanup_expired_sessions(&self) -> Result<(), Error> {
        self.sessions.cleanup_expired().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NewUser, repositories::UserRepository, services::testing::MemoryStore};

    async fn setup() -> (SessionService<MemoryStore, MemoryStore>, User) {
        let store = Arc::new(MemoryStore::default());
        let user = UserRepository::create(store.as_ref(), NewUser::local("a@x.com", "Ann", "hash"))
            .await
            .unwrap();
        (SessionService::new(store.clone(), store), user)
    }

    #[tokio::test]
    async fn test_issue_and_resolve() {
        let (service, user) = setup().await;

        let session = service.issue(&user.id).await.unwrap();
        assert_eq!(session.token.as_str().len(), 64);

        let resolved = service.resolve(&session.token).await.unwrap().unwrap();
        assert_eq!(resolved.id, user.id);
    }

    #[tokio::test]
    async fn test_new_session_supersedes_previous() {
        let (service, user) = setup().await;

        let first = service.issue(&user.id).await.unwrap();
        let second = service.issue(&user.id).await.unwrap();

        assert_ne!(first.token, second.token);
        assert!(service.resolve(&first.token).await.unwrap().is_none());
        assert!(service.resolve(&second.token).await.unwrap().is_some());
        assert_eq!(service.session_count(&user.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_expired_session_resolves_to_none() {
        let (service, user) = setup().await;

        let session = service
            .issue_with_expiration(&user.id, Duration::seconds(-1))
            .await
            .unwrap();

        assert!(service.resolve(&session.token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_revoke_is_idempotent() {
        let (service, user) = setup().await;

        let session = service.issue(&user.id).await.unwrap();
        service.revoke(&session.token).await.unwrap();
        service.revoke(&session.token).await.unwrap();
        service
            .revoke(&SessionToken::new("never-issued"))
            .await
            .unwrap();

        assert!(service.resolve(&session.token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unknown_token_resolves_to_none() {
        let (service, _) = setup().await;
        let token = SessionToken::new_random().unwrap();
        assert!(service.resolve(&token).await.unwrap().is_none());
    }
}
