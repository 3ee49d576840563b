use crate::Error;
use async_trait::async_trait;
use chrono::Duration;

/// Repository for in-flight federated login state
#[async_trait]
pub trait OAuthRepository: Send + Sync + 'static {
    /// Store a PKCE verifier under its CSRF state with an expiration time
    async fn store_pkce_verifier(
        &self,
        csrf_state: &str,
        pkce_verifier: &str,
        expires_in: Duration,
    ) -> Result<(), Error>;

    /// Remove and return the verifier for `csrf_state` if it has not expired.
    /// A state can be taken at most once.
    async fn take_pkce_verifier(&self, csrf_state: &str) -> Result<Option<String>, Error>;

    /// Delete expired verifiers
    async fn cleanup_expired(&self) -> Result<(), Error>;
}
