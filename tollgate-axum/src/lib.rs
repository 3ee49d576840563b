//! # Tollgate Axum Integration
//!
//! The HTTP surface of the tollgate session authority:
//!
//! | Method | Path | Purpose |
//! | ------ | ---- | ------- |
//! | GET | `/` | Liveness greeting |
//! | GET | `/health` | Storage probe with a one second budget |
//! | POST | `/auth/register` | Create a local account and mail a code |
//! | POST | `/auth/verify` | Confirm an email with its code |
//! | POST | `/auth/login` | Exchange credentials for a session token |
//! | POST | `/auth/resend-code` | Mail a fresh code |
//! | POST | `/auth/logout` | End the presented session |
//! | GET | `/auth/{provider}` | Start a federated login |
//! | GET | `/auth/{provider}/callback` | Finish it and hand the token to the gateway |
//! | GET | `/api/me` | The caller's public profile |
//! | GET | `/api/users/search` | Search users by name or email |
//!
//! Login answers with the token in the JSON body; the gateway is what turns
//! it into a cookie.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tollgate::{SqliteRepositoryProvider, Tollgate};
//! use tollgate_axum::CookieConfig;
//!
//! # async fn run(tollgate: Arc<Tollgate<SqliteRepositoryProvider>>) {
//! let app = tollgate_axum::routes(tollgate)
//!     .with_cookie_config(CookieConfig::development())
//!     .with_gateway_url("http://localhost:8000")
//!     .build();
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3060").await.unwrap();
//! axum::serve(listener, app).await.unwrap();
//! # }
//! ```

mod error;
mod extractors;
mod routes;
mod types;

pub use error::{ApiError, Result};
pub use extractors::{AuthUser, SessionTokenFromRequest};
pub use routes::{AuthState, HEALTH_CHECK_TIMEOUT, create_router};
pub use types::{
    CallbackQuery, CookieConfig, CookieSameSite, HealthResponse, LoginRequest, LoginResponse,
    MessageResponse, RegisterRequest, RegisterResponse, ResendCodeRequest, SESSION_COOKIE,
    SearchQuery, SearchResponse, VerifyRequest,
};

use axum::Router;
use std::sync::Arc;
use tollgate::Tollgate;
use tollgate_core::RepositoryProvider;

/// Default public origin of the gateway
pub const DEFAULT_GATEWAY_URL: &str = "http://localhost:8000";

/// Start configuring the auth routes for `tollgate`
pub fn routes<R>(tollgate: Arc<Tollgate<R>>) -> AuthRouterBuilder<R>
where
    R: RepositoryProvider + 'static,
{
    AuthRouterBuilder {
        tollgate,
        cookie_config: CookieConfig::default(),
        gateway_url: DEFAULT_GATEWAY_URL.to_string(),
    }
}

/// Builder for configuring authentication routes
pub struct AuthRouterBuilder<R: RepositoryProvider> {
    tollgate: Arc<Tollgate<R>>,
    cookie_config: CookieConfig,
    gateway_url: String,
}

impl<R: RepositoryProvider + 'static> AuthRouterBuilder<R> {
    /// Set custom cookie configuration
    pub fn with_cookie_config(mut self, config: CookieConfig) -> Self {
        self.cookie_config = config;
        self
    }

    /// Public origin federated callbacks redirect to
    pub fn with_gateway_url(mut self, url: impl Into<String>) -> Self {
        self.gateway_url = url.into();
        self
    }

    /// Build the router with the configured options
    pub fn build(self) -> Router {
        create_router(AuthState {
            tollgate: self.tollgate,
            cookie_config: self.cookie_config,
            gateway_url: self.gateway_url,
        })
    }
}

impl<R: RepositoryProvider + 'static> From<AuthRouterBuilder<R>> for Router {
    fn from(builder: AuthRouterBuilder<R>) -> Self {
        builder.build()
    }
}
