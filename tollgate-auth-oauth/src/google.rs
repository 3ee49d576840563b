use async_trait::async_trait;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointNotSet, EndpointSet,
    PkceCodeChallenge, PkceCodeVerifier, RedirectUrl, Scope, TokenResponse, TokenUrl,
    basic::BasicClient,
};
use serde::Deserialize;
use std::time::Duration;
use tollgate_core::{
    AuthorizationRequest, Error, ExternalIdentity, IdentityProvider, error::IdentityError,
};

use crate::OAuthConfig;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

type GoogleClient =
    BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Provider endpoints; only tests point these anywhere but Google
#[derive(Debug, Clone)]
pub struct GoogleEndpoints {
    pub auth_url: String,
    pub token_url: String,
    pub userinfo_url: String,
}

impl Default for GoogleEndpoints {
    fn default() -> Self {
        Self {
            auth_url: GOOGLE_AUTH_URL.to_string(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
            userinfo_url: GOOGLE_USERINFO_URL.to_string(),
        }
    }
}

/// A limited subset of the user info response from Google.
#[derive(Debug, Clone, Deserialize)]
struct GoogleUserInfo {
    sub: String,
    email: String,
    #[serde(default)]
    email_verified: Option<bool>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    picture: Option<String>,
}

impl From<GoogleUserInfo> for ExternalIdentity {
    fn from(info: GoogleUserInfo) -> Self {
        ExternalIdentity {
            name: info.name.unwrap_or_else(|| info.email.clone()),
            subject: info.sub,
            email: info.email,
            avatar_url: info.picture,
        }
    }
}

pub struct Google {
    client: GoogleClient,
    scopes: Vec<String>,
    userinfo_url: String,
    http_client: reqwest::Client,
}

impl Google {
    pub fn new(config: OAuthConfig) -> Result<Self, Error> {
        Self::with_endpoints(config, GoogleEndpoints::default())
    }

    pub fn with_endpoints(config: OAuthConfig, endpoints: GoogleEndpoints) -> Result<Self, Error> {
        let client = BasicClient::new(ClientId::new(config.client_id))
            .set_client_secret(ClientSecret::new(config.client_secret))
            .set_auth_uri(AuthUrl::new(endpoints.auth_url).map_err(configuration)?)
            .set_token_uri(TokenUrl::new(endpoints.token_url).map_err(configuration)?)
            .set_redirect_uri(RedirectUrl::new(config.callback_url).map_err(configuration)?);

        let http_client = reqwest::ClientBuilder::new()
            // Following redirects opens the client up to SSRF vulnerabilities.
            .redirect(reqwest::redirect::Policy::none())
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(configuration)?;

        Ok(Self {
            client,
            scopes: config.scopes,
            userinfo_url: endpoints.userinfo_url,
            http_client,
        })
    }

    async fn fetch_user_info(&self, access_token: &str) -> Result<GoogleUserInfo, Error> {
        let response = self
            .http_client
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                tracing::error!(error = %e, "Error getting user info");
                exchange(e)
            })?;

        response.json::<GoogleUserInfo>().await.map_err(|e| {
            tracing::error!(error = %e, "Error parsing user info");
            exchange(e)
        })
    }
}

#[async_trait]
impl IdentityProvider for Google {
    fn name(&self) -> &str {
        "google"
    }

    fn authorization_request(&self) -> Result<AuthorizationRequest, Error> {
        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();
        let (auth_url, csrf_state) = self
            .client
            .authorize_url(CsrfToken::new_random)
            .set_pkce_challenge(pkce_challenge)
            .add_scopes(self.scopes.iter().map(|s| Scope::new(s.clone())))
            .url();

        Ok(AuthorizationRequest {
            url: auth_url.to_string(),
            csrf_state: csrf_state.secret().to_string(),
            pkce_verifier: pkce_verifier.secret().to_string(),
        })
    }

    async fn exchange(&self, code: &str, pkce_verifier: &str) -> Result<ExternalIdentity, Error> {
        let token = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .set_pkce_verifier(PkceCodeVerifier::new(pkce_verifier.to_string()))
            .request_async(&self.http_client)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Error exchanging authorization code");
                exchange(e)
            })?;

        let info = self.fetch_user_info(token.access_token().secret()).await?;

        if info.email_verified == Some(false) {
            return Err(Error::Identity(IdentityError::Exchange(
                "Provider reports the email address as unverified".to_string(),
            )));
        }

        Ok(info.into())
    }
}

fn configuration(err: impl std::fmt::Display) -> Error {
    Error::Identity(IdentityError::Configuration(err.to_string()))
}

fn exchange(err: impl std::fmt::Display) -> Error {
    Error::Identity(IdentityError::Exchange(err.to_string()))
}
