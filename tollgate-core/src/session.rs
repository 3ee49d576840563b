//! Sessions
//!
//! | Field        | Type           | Description                                  |
//! | ------------ | -------------- | -------------------------------------------- |
//! | `token`      | `SessionToken` | Opaque 64-character hex capability.          |
//! | `user_id`    | `UserId`       | The account the session authenticates.       |
//! | `created_at` | `DateTime`     | When the session was issued.                 |
//! | `expires_at` | `DateTime`     | After this instant the token resolves to nothing. |
//!
//! A user holds at most one live session; see
//! [`SessionService::issue`](crate::services::SessionService::issue).

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    crypto::{generate_session_token, hash_token, verify_token_hash},
    error::ValidationError,
    user::UserId,
};

/// Opaque session token presented by clients in the `session_token` cookie.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: &str) -> Self {
        SessionToken(token.to_string())
    }

    /// A fresh token from the OS CSPRNG.
    pub fn new_random() -> Result<Self, Error> {
        Ok(SessionToken(generate_session_token()?))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// SHA256 of the token; the only form that reaches storage.
    pub fn token_hash(&self) -> String {
        hash_token(&self.0)
    }

    pub fn verify_hash(&self, stored_hash: &str) -> bool {
        verify_token_hash(&self.0, stored_hash)
    }
}

// Keep tokens out of logs.
impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(..)")
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for SessionToken {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: SessionToken,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn builder() -> SessionBuilder {
        SessionBuilder::default()
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

#[derive(Default)]
pub struct SessionBuilder {
    token: Option<SessionToken>,
    user_id: Option<UserId>,
    created_at: Option<DateTime<Utc>>,
    expires_at: Option<DateTime<Utc>>,
}

impl SessionBuilder {
    pub fn token(mut self, token: SessionToken) -> Self {
        self.token = Some(token);
        self
    }

    pub fn user_id(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Builds the session, generating a token when none was set and
    /// defaulting the lifetime to seven days.
    pub fn build(self) -> Result<Session, Error> {
        let now = Utc::now();
        let token = match self.token {
            Some(token) => token,
            None => SessionToken::new_random()?,
        };

        Ok(Session {
            token,
            user_id: self
                .user_id
                .ok_or(ValidationError::MissingField("User id is required".to_string()))?,
            created_at: self.created_at.unwrap_or(now),
            expires_at: self.expires_at.unwrap_or(now + Duration::days(7)),
        })
    }
}
