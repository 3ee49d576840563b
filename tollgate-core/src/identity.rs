//! External identity providers
//!
//! A provider turns a browser redirect round-trip into a verified
//! [`ExternalIdentity`]. Implementations live outside the core (see
//! `tollgate-auth-oauth`); the core only sees this trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Error;

/// Where to send the browser, plus the state needed to finish the flow.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub url: String,
    pub csrf_state: String,
    pub pkce_verifier: String,
}

/// Identity asserted by a provider after a successful exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalIdentity {
    /// Stable subject identifier at the provider.
    pub subject: String,
    pub email: String,
    pub name: String,
    pub avatar_url: Option<String>,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync + 'static {
    /// Short lowercase name used in URLs, e.g. `google`.
    fn name(&self) -> &str;

    /// Build the authorization URL with fresh CSRF state and PKCE verifier.
    fn authorization_request(&self) -> Result<AuthorizationRequest, Error>;

    /// Exchange an authorization code for the caller's identity.
    async fn exchange(&self, code: &str, pkce_verifier: &str) -> Result<ExternalIdentity, Error>;
}
