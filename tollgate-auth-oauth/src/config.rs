use tollgate_core::{Error, error::IdentityError};

/// Settings for one identity provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Where the provider sends the browser back, as registered with it
    pub callback_url: String,
    pub scopes: Vec<String>,
}

impl OAuthConfig {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        callback_url: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            callback_url: callback_url.into(),
            scopes: vec!["email".to_string(), "profile".to_string()],
        }
    }

    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    /// Google settings from `GOOGLE_CLIENT_ID` and `GOOGLE_CLIENT_SECRET`
    ///
    /// The callback is `{gateway_url}/auth/google/callback`, so the provider
    /// redirects through the gateway. Returns `Ok(None)` when neither
    /// variable is set and an error when only one of them is.
    pub fn google_from_env(gateway_url: &str) -> Result<Option<Self>, Error> {
        let client_id = std::env::var("GOOGLE_CLIENT_ID").ok().filter(|v| !v.is_empty());
        let client_secret = std::env::var("GOOGLE_CLIENT_SECRET")
            .ok()
            .filter(|v| !v.is_empty());

        match (client_id, client_secret) {
            (Some(client_id), Some(client_secret)) => Ok(Some(Self::new(
                client_id,
                client_secret,
                google_callback_url(gateway_url),
            ))),
            (None, None) => Ok(None),
            _ => Err(Error::Identity(IdentityError::Configuration(
                "GOOGLE_CLIENT_ID and GOOGLE_CLIENT_SECRET must be set together".to_string(),
            ))),
        }
    }
}

fn google_callback_url(gateway_url: &str) -> String {
    format!("{}/auth/google/callback", gateway_url.trim_end_matches('/'))
}
