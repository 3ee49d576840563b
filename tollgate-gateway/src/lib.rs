//! Public entry point in front of the tollgate auth service and the
//! application backend.
//!
//! Every request is matched against a static [`RouteTable`] and then either
//! forwarded, rejected locally, or intercepted:
//!
//! | Path | Target | Behavior |
//! | ---- | ------ | -------- |
//! | `/auth/login` | auth | token moved from the body into the `session_token` cookie |
//! | `/auth/callback` | none | `?token=` becomes the cookie, then `302` to the frontend |
//! | `/api/me`, `/api/avatars/*` | auth, backend | `401` without the cookie |
//! | `/auth/*`, `/api/*`, `/`, `/health` | auth | proxied |
//! | `/contracts`, `/friends`, `/messages`, `/api/subscriptions/*` | backend | proxied |
//!
//! Upstream `Access-Control-*` headers are always dropped; the CORS layer
//! installed by [`Gateway::into_router`] is the only source of them.
//!
//! ```rust,no_run
//! use std::net::SocketAddr;
//! use tollgate_gateway::GatewayConfig;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = GatewayConfig::from_env()?;
//! let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
//! let app = tollgate_gateway::router(config)?;
//!
//! let listener = tokio::net::TcpListener::bind(addr).await?;
//! axum::serve(
//!     listener,
//!     app.into_make_service_with_connect_info::<SocketAddr>(),
//! )
//! .await?;
//! # Ok(())
//! # }
//! ```
pub mod config;
pub mod error;
mod handlers;
pub mod headers;
mod proxy;
pub mod routes;

use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method, header},
};
use tower_http::cors::CorsLayer;

pub use config::GatewayConfig;
pub use error::{GatewayError, Result};
pub use handlers::{
    LANDING_PATH, MAX_BODY_BYTES, SESSION_COOKIE, is_session_token, session_cookie,
};
pub use proxy::UpstreamResponse;
pub use routes::{Backend, Behavior, RouteTable, default_table};

use proxy::ProxyClient;

pub struct Gateway {
    config: GatewayConfig,
    table: RouteTable,
    proxy: ProxyClient,
}

impl Gateway {
    /// A gateway serving [`default_table`]
    pub fn new(config: GatewayConfig) -> Result<Self> {
        Self::with_table(config, default_table())
    }

    pub fn with_table(config: GatewayConfig, table: RouteTable) -> Result<Self> {
        let proxy = ProxyClient::new(&config)?;
        Ok(Self {
            config,
            table,
            proxy,
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// The cross-origin policy applied to every response
    pub fn cors_layer(&self) -> Result<CorsLayer> {
        let origin = HeaderValue::from_str(&self.config.frontend_url).map_err(|_| {
            GatewayError::Config(format!(
                "FRONTEND_URL is not a valid origin: {}",
                self.config.frontend_url
            ))
        })?;

        Ok(CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([
                header::CONTENT_TYPE,
                header::AUTHORIZATION,
                header::COOKIE,
                HeaderName::from_static("stripe-signature"),
            ])
            .allow_credentials(true))
    }

    /// Every path is dispatched through the route table; CORS wraps it all
    pub fn into_router(self) -> Result<Router> {
        let cors = self.cors_layer()?;
        Ok(Router::new()
            .fallback(handlers::dispatch)
            .with_state(Arc::new(self))
            .layer(cors))
    }
}

/// Router for `config` with the default route table
pub fn router(config: GatewayConfig) -> Result<Router> {
    Gateway::new(config)?.into_router()
}
