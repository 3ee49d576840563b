//! User accounts
//!
//! | Field        | Type             | Description                                        |
//! | ------------ | ---------------- | -------------------------------------------------- |
//! | `id`         | `UserId`         | Numeric identifier assigned by storage.            |
//! | `email`      | `String`         | Unique, compared case-sensitively as stored.       |
//! | `name`       | `String`         | Display name.                                      |
//! | `avatar_url` | `Option<String>` | Profile picture, usually set by federated login.   |
//! | `origin`     | `AccountOrigin`  | Whether the account has a local password or not.   |
//! | `verified`   | `bool`           | Whether the email address has been confirmed.      |
//! | `created_at` | `DateTime`       | When the account was created.                      |
//!
//! Password verifiers are never part of [`User`]; they are read through
//! [`PasswordRepository`](crate::repositories::PasswordRepository) only when
//! a login needs them.
use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, error::ValidationError};

/// Numeric identifier of a user, assigned by storage on creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    pub fn new(id: i64) -> Self {
        UserId(id)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl FromStr for UserId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>()
            .map(UserId)
            .map_err(|_| ValidationError::InvalidField(format!("Invalid user id: {s}")))
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How an account came to exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AccountOrigin {
    /// Registered locally with an email and password.
    Local,
    /// Created by a federated login; `external_id` is the provider's subject.
    Federated { external_id: String },
}

impl AccountOrigin {
    pub fn is_federated(&self) -> bool {
        matches!(self, AccountOrigin::Federated { .. })
    }

    pub fn external_id(&self) -> Option<&str> {
        match self {
            AccountOrigin::Local => None,
            AccountOrigin::Federated { external_id } => Some(external_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub avatar_url: Option<String>,
    pub origin: AccountOrigin,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn builder() -> UserBuilder {
        UserBuilder::default()
    }

    /// The projection of this user that may leave the auth service.
    pub fn public(&self) -> PublicUser {
        PublicUser::from(self)
    }
}

/// Redacted view of a user: no origin details, no password material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub avatar: Option<String>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            avatar: user.avatar_url.clone(),
        }
    }
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            avatar: user.avatar_url,
        }
    }
}

#[derive(Default)]
pub struct UserBuilder {
    id: Option<UserId>,
    email: Option<String>,
    name: Option<String>,
    avatar_url: Option<String>,
    origin: Option<AccountOrigin>,
    verified: bool,
    created_at: Option<DateTime<Utc>>,
}

impl UserBuilder {
    pub fn id(mut self, id: UserId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn avatar_url(mut self, avatar_url: Option<String>) -> Self {
        self.avatar_url = avatar_url;
        self
    }

    pub fn origin(mut self, origin: AccountOrigin) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn verified(mut self, verified: bool) -> Self {
        self.verified = verified;
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn build(self) -> Result<User, Error> {
        Ok(User {
            id: self
                .id
                .ok_or(ValidationError::MissingField("User id is required".to_string()))?,
            email: self
                .email
                .ok_or(ValidationError::MissingField("Email is required".to_string()))?,
            name: self.name.unwrap_or_default(),
            avatar_url: self.avatar_url,
            origin: self.origin.unwrap_or(AccountOrigin::Local),
            verified: self.verified,
            created_at: self.created_at.unwrap_or_else(Utc::now),
        })
    }
}

/// A user that has not been stored yet.
///
/// The two constructors keep password and external identity mutually
/// exclusive: local accounts start unverified with a password hash,
/// federated accounts start verified without one.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub avatar_url: Option<String>,
    pub origin: AccountOrigin,
    pub password_hash: Option<String>,
    pub verified: bool,
}

impl NewUser {
    pub fn local(
        email: impl Into<String>,
        name: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
            avatar_url: None,
            origin: AccountOrigin::Local,
            password_hash: Some(password_hash.into()),
            verified: false,
        }
    }

    pub fn federated(
        external_id: impl Into<String>,
        email: impl Into<String>,
        name: impl Into<String>,
        avatar_url: Option<String>,
    ) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
            avatar_url,
            origin: AccountOrigin::Federated {
                external_id: external_id.into(),
            },
            password_hash: None,
            verified: true,
        }
    }
}
