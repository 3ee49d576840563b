use anyhow::{Context, bail};
use chrono::Duration;

/// Auth service settings
///
/// | Variable | Default |
/// | -------- | ------- |
/// | `DATABASE_URL` | `sqlite://tollgate.db?mode=rwc` |
/// | `PORT` | `3060` |
/// | `GATEWAY_URL` | `http://localhost:8000` |
/// | `FRONTEND_ORIGIN` | `http://localhost:8000` |
/// | `SESSION_TTL_DAYS` | `7` |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthServerConfig {
    pub database_url: String,
    pub port: u16,
    /// Public origin of the gateway; federated callbacks come back through it
    pub gateway_url: String,
    /// Origin allowed to call the auth service directly
    pub frontend_origin: String,
    pub session_ttl: Duration,
}

impl Default for AuthServerConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://tollgate.db?mode=rwc".to_string(),
            port: 3060,
            gateway_url: "http://localhost:8000".to_string(),
            frontend_origin: "http://localhost:8000".to_string(),
            session_ttl: Duration::days(7),
        }
    }
}

impl AuthServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let port = match get("PORT") {
            Some(port) => port
                .parse::<u16>()
                .with_context(|| format!("PORT is not a valid port: {port}"))?,
            None => defaults.port,
        };

        let session_ttl = match get("SESSION_TTL_DAYS") {
            Some(days) => {
                let days = days
                    .parse::<i64>()
                    .with_context(|| format!("SESSION_TTL_DAYS is not a number: {days}"))?;
                if days <= 0 {
                    bail!("SESSION_TTL_DAYS must be positive");
                }
                Duration::days(days)
            }
            None => defaults.session_ttl,
        };

        Ok(Self {
            database_url: get("DATABASE_URL").unwrap_or(defaults.database_url),
            port,
            gateway_url: get("GATEWAY_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.gateway_url),
            frontend_origin: get("FRONTEND_ORIGIN")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.frontend_origin),
            session_ttl,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AuthServerConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, AuthServerConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = AuthServerConfig::from_lookup(|key| match key {
            "DATABASE_URL" => Some("sqlite::memory:".to_string()),
            "PORT" => Some("4000".to_string()),
            "GATEWAY_URL" => Some("https://gw.example.com/".to_string()),
            "SESSION_TTL_DAYS" => Some("30".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.port, 4000);
        assert_eq!(config.gateway_url, "https://gw.example.com");
        assert_eq!(config.session_ttl, Duration::days(30));
    }

    #[test]
    fn test_invalid_values() {
        assert!(AuthServerConfig::from_lookup(|k| (k == "PORT").then(|| "x".to_string())).is_err());
        assert!(
            AuthServerConfig::from_lookup(|k| (k == "SESSION_TTL_DAYS").then(|| "0".to_string()))
                .is_err()
        );
    }
}
