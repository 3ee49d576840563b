use crate::{
    Error, NewUser, User,
    error::{AuthError, IdentityError, StorageError},
    identity::{ExternalIdentity, IdentityProvider},
    repositories::{OAuthRepository, UserRepository},
};
use chrono::Duration;
use std::sync::Arc;

/// How long a started federated login may take before its state is dropped
pub const DEFAULT_STATE_EXPIRATION: Duration = Duration::minutes(10);

/// Service for federated login operations
pub struct OAuthService<U: UserRepository, O: OAuthRepository> {
    user_repository: Arc<U>,
    oauth_repository: Arc<O>,
}

impl<U: UserRepository, O: OAuthRepository> OAuthService<U, O> {
    /// Create a new OAuthService with the given repositories
    pub fn new(user_repository: Arc<U>, oauth_repository: Arc<O>) -> Self {
        Self {
            user_repository,
            oauth_repository,
        }
    }

    /// Start a federated login and return the provider URL to redirect to
    pub async fn begin(&self, provider: &dyn IdentityProvider) -> Result<String, Error> {
        let request = provider.authorization_request()?;

        self.oauth_repository
            .store_pkce_verifier(
                &request.csrf_state,
                &request.pkce_verifier,
                DEFAULT_STATE_EXPIRATION,
            )
            .await?;

        tracing::debug!(provider = provider.name(), "Federated login started");
        Ok(request.url)
    }

    /// Finish a federated login from the provider's callback parameters
    ///
    /// The CSRF state is consumed whether or not the exchange succeeds, so a
    /// callback URL cannot be replayed.
    pub async fn finish(
        &self,
        provider: &dyn IdentityProvider,
        code: &str,
        state: &str,
    ) -> Result<ExternalIdentity, Error> {
        let pkce_verifier = self
            .oauth_repository
            .take_pkce_verifier(state)
            .await?
            .ok_or(Error::Identity(IdentityError::InvalidState))?;

        provider.exchange(code, &pkce_verifier).await
    }

    /// Find the account bound to an external identity, creating it on first login
    ///
    /// Accounts are matched on the provider subject only. A local account
    /// with the same email is never linked implicitly; that case fails with
    /// [`AuthError::UserAlreadyExists`].
    pub async fn get_or_create_user(&self, identity: &ExternalIdentity) -> Result<User, Error> {
        if let Some(user) = self
            .user_repository
            .find_by_external_id(&identity.subject)
            .await?
        {
            return Ok(user);
        }

        let new_user = NewUser::federated(
            &identity.subject,
            &identity.email,
            &identity.name,
            identity.avatar_url.clone(),
        );

        match self.user_repository.create(new_user).await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "Federated account created");
                Ok(user)
            }
            Err(Error::Storage(StorageError::Constraint(_))) => {
                Err(Error::Auth(AuthError::UserAlreadyExists))
            }
            Err(e) => Err(e),
        }
    }

    /// Delete federated login state that was never completed
    pub async fn cleanup_expired_states(&self) -> Result<(), Error> {
        self.oauth_repository.cleanup_expired().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{identity::AuthorizationRequest, services::testing::MemoryStore};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubProvider {
        issued: AtomicUsize,
    }

    impl StubProvider {
        fn new() -> Self {
            Self {
                issued: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl IdentityProvider for StubProvider {
        fn name(&self) -> &str {
            "stub"
        }

        fn authorization_request(&self) -> Result<AuthorizationRequest, Error> {
            let n = self.issued.fetch_add(1, Ordering::SeqCst);
            Ok(AuthorizationRequest {
                url: format!("https://idp.test/authorize?state=state-{n}"),
                csrf_state: format!("state-{n}"),
                pkce_verifier: format!("verifier-{n}"),
            })
        }

        async fn exchange(
            &self,
            code: &str,
            pkce_verifier: &str,
        ) -> Result<ExternalIdentity, Error> {
            if pkce_verifier != "verifier-0" {
                return Err(Error::Identity(IdentityError::Exchange(
                    "verifier mismatch".to_string(),
                )));
            }
            Ok(ExternalIdentity {
                subject: format!("sub-{code}"),
                email: "fed@x.com".to_string(),
                name: "Fed".to_string(),
                avatar_url: Some("https://img.test/fed.png".to_string()),
            })
        }
    }

    fn service() -> (OAuthService<MemoryStore, MemoryStore>, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::default());
        (OAuthService::new(store.clone(), store.clone()), store)
    }

    #[tokio::test]
    async fn test_begin_then_finish() {
        let (service, _) = service();
        let provider = StubProvider::new();

        let url = service.begin(&provider).await.unwrap();
        assert!(url.contains("state-0"));

        let identity = service.finish(&provider, "abc", "state-0").await.unwrap();
        assert_eq!(identity.subject, "sub-abc");
    }

    #[tokio::test]
    async fn test_state_cannot_be_replayed() {
        let (service, _) = service();
        let provider = StubProvider::new();
        service.begin(&provider).await.unwrap();

        service.finish(&provider, "abc", "state-0").await.unwrap();
        let replay = service.finish(&provider, "abc", "state-0").await;
        assert!(matches!(
            replay,
            Err(Error::Identity(IdentityError::InvalidState))
        ));
    }

    #[tokio::test]
    async fn test_unknown_state() {
        let (service, _) = service();
        let provider = StubProvider::new();
        let result = service.finish(&provider, "abc", "forged").await;
        assert!(matches!(
            result,
            Err(Error::Identity(IdentityError::InvalidState))
        ));
    }

    #[tokio::test]
    async fn test_get_or_create_user_is_stable() {
        let (service, _) = service();
        let identity = ExternalIdentity {
            subject: "sub-1".to_string(),
            email: "fed@x.com".to_string(),
            name: "Fed".to_string(),
            avatar_url: None,
        };

        let first = service.get_or_create_user(&identity).await.unwrap();
        assert!(first.verified);
        assert_eq!(first.origin.external_id(), Some("sub-1"));

        let second = service.get_or_create_user(&identity).await.unwrap();
        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_get_or_create_user_does_not_link_local_account() {
        let (service, store) = service();
        UserRepository::create(store.as_ref(), NewUser::local("fed@x.com", "Local", "hash"))
            .await
            .unwrap();

        let identity = ExternalIdentity {
            subject: "sub-1".to_string(),
            email: "fed@x.com".to_string(),
            name: "Fed".to_string(),
            avatar_url: None,
        };
        let result = service.get_or_create_user(&identity).await;
        assert!(matches!(
            result,
            Err(Error::Auth(AuthError::UserAlreadyExists))
        ));
    }
}
