use std::time::Duration;

use crate::error::GatewayError;

/// Gateway settings
///
/// | Variable | Default |
/// | -------- | ------- |
/// | `AUTH_SERVICE_URL` | `http://localhost:3060` |
/// | `BACKEND_SERVICE_URL` | `http://localhost:5000` |
/// | `FRONTEND_URL` | `http://localhost:3000` |
/// | `PORT` | `8000` |
/// | `GATEWAY_UPSTREAM_TIMEOUT_SECS` | `30` |
/// | `COOKIE_SECURE` | `false` |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub auth_service_url: String,
    pub backend_service_url: String,
    /// The only origin allowed by CORS, and where federated logins land
    pub frontend_url: String,
    pub port: u16,
    pub upstream_timeout: Duration,
    /// Set the `Secure` flag on the session cookie; enable behind TLS
    pub cookie_secure: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            auth_service_url: "http://localhost:3060".to_string(),
            backend_service_url: "http://localhost:5000".to_string(),
            frontend_url: "http://localhost:3000".to_string(),
            port: 8000,
            upstream_timeout: Duration::from_secs(30),
            cookie_secure: false,
        }
    }
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, GatewayError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any variable source; unset and empty values take defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, GatewayError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let port = match get("PORT") {
            Some(port) => port
                .trim()
                .parse::<u16>()
                .map_err(|_| GatewayError::Config(format!("PORT is not a valid port: {port}")))?,
            None => defaults.port,
        };

        let upstream_timeout = match get("GATEWAY_UPSTREAM_TIMEOUT_SECS") {
            Some(secs) => secs
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or_else(|| {
                    GatewayError::Config(format!(
                        "GATEWAY_UPSTREAM_TIMEOUT_SECS must be a positive number: {secs}"
                    ))
                })?,
            None => defaults.upstream_timeout,
        };

        let cookie_secure = match get("COOKIE_SECURE").as_deref().map(str::trim) {
            Some("true" | "1") => true,
            Some("false" | "0") | None => false,
            Some(other) => {
                return Err(GatewayError::Config(format!(
                    "COOKIE_SECURE must be true or false: {other}"
                )));
            }
        };

        Ok(Self {
            auth_service_url: trim_url(get("AUTH_SERVICE_URL"), defaults.auth_service_url),
            backend_service_url: trim_url(
                get("BACKEND_SERVICE_URL"),
                defaults.backend_service_url,
            ),
            frontend_url: trim_url(get("FRONTEND_URL"), defaults.frontend_url),
            port,
            upstream_timeout,
            cookie_secure,
        })
    }
}

fn trim_url(value: Option<String>, default: String) -> String {
    value
        .map(|v| v.trim().trim_end_matches('/').to_string())
        .unwrap_or(default)
}
