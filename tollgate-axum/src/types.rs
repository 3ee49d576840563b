use axum_extra::extract::cookie::{Cookie, SameSite};
use serde::{Deserialize, Serialize};
use tollgate::{PublicUser, UserId};

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "session_token";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResendCodeRequest {
    #[serde(default)]
    pub email: String,
}

/// Query string of `GET /api/users/search`
///
/// `limit` stays a string so that garbage falls back to the default instead
/// of failing the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub query: String,
    pub limit: Option<String>,
}

impl SearchQuery {
    pub fn limit(&self) -> Option<u32> {
        self.limit
            .as_deref()
            .and_then(|l| l.trim().parse::<u32>().ok())
            .filter(|l| *l > 0)
    }
}

/// Query string the identity provider sends back to the callback
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user_id: UserId,
}

/// Body of a successful login. The gateway moves `token` into a cookie.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub user: PublicUser,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub users: Vec<PublicUser>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub name: String,
    pub http_only: bool,
    pub secure: bool,
    pub same_site: CookieSameSite,
    pub path: String,
    pub max_age: time::Duration,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self::development()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub enum CookieSameSite {
    Strict,
    #[default]
    Lax,
    None,
}

impl From<CookieSameSite> for SameSite {
    fn from(same_site: CookieSameSite) -> Self {
        match same_site {
            CookieSameSite::Strict => SameSite::Strict,
            CookieSameSite::Lax => SameSite::Lax,
            CookieSameSite::None => SameSite::None,
        }
    }
}

impl CookieConfig {
    /// Plain-HTTP posture: the cookie is sent without the `Secure` flag
    pub fn development() -> Self {
        Self {
            name: SESSION_COOKIE.to_string(),
            http_only: true,
            secure: false,
            same_site: CookieSameSite::Lax,
            path: "/".to_string(),
            max_age: time::Duration::days(7),
        }
    }

    /// For deployments behind TLS
    pub fn production() -> Self {
        Self {
            secure: true,
            ..Self::development()
        }
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Cookie carrying `token`
    pub fn session_cookie(&self, token: impl Into<String>) -> Cookie<'static> {
        Cookie::build((self.name.clone(), token.into()))
            .path(self.path.clone())
            .http_only(self.http_only)
            .secure(self.secure)
            .same_site(self.same_site.into())
            .max_age(self.max_age)
            .build()
    }

    /// Cookie that makes the browser drop the session cookie
    pub fn removal_cookie(&self) -> Cookie<'static> {
        Cookie::build((self.name.clone(), ""))
            .path(self.path.clone())
            .http_only(self.http_only)
            .secure(self.secure)
            .same_site(self.same_site.into())
            .max_age(time::Duration::ZERO)
            .build()
    }
}
