use std::{net::SocketAddr, sync::Arc};

use axum::{
    body::{Bytes, to_bytes},
    extract::{ConnectInfo, Query, Request, State},
    http::{HeaderMap, HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
};
use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    Gateway,
    error::{GatewayError, Result},
    proxy::UpstreamResponse,
    routes::{Backend, Behavior},
};

pub const SESSION_COOKIE: &str = "session_token";

/// Where a completed federated login lands on the frontend
pub const LANDING_PATH: &str = "/avatar";

/// Largest request body the gateway buffers before forwarding
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

const SESSION_MAX_AGE: time::Duration = time::Duration::days(7);

/// Session tokens are 32 random bytes as lowercase hex
const SESSION_TOKEN_LEN: usize = 64;

#[derive(Debug, Deserialize)]
struct CallbackParams {
    #[serde(default)]
    token: String,
}

/// Entry point for every request that reaches the gateway
pub async fn dispatch(State(gateway): State<Arc<Gateway>>, request: Request) -> Response {
    let path = request.uri().path().to_string();
    let Some(route) = gateway.table.resolve(&path) else {
        tracing::debug!(path = %path, "No route matched");
        return GatewayError::NotFound.into_response();
    };
    tracing::debug!(path = %path, behavior = ?route.behavior, "Route resolved");

    let behavior = route.behavior;
    let result = match behavior {
        Behavior::Proxy(backend) => proxy(&gateway, backend, request).await,
        Behavior::RequireSession(backend) => {
            require_session(&gateway, backend, request).await
        }
        Behavior::LoginInterception => login(&gateway, request).await,
        Behavior::FederatedCallback => federated_callback(&gateway, request),
    };

    result.unwrap_or_else(IntoResponse::into_response)
}

async fn proxy(gateway: &Gateway, backend: Backend, request: Request) -> Result<Response> {
    forward(gateway, backend, request)
        .await
        .map(IntoResponse::into_response)
}

async fn require_session(gateway: &Gateway, backend: Backend, request: Request) -> Result<Response> {
    let has_session = CookieJar::from_headers(request.headers())
        .get(SESSION_COOKIE)
        .is_some_and(|cookie| !cookie.value().is_empty());

    if !has_session {
        return Err(GatewayError::Unauthorized);
    }

    proxy(gateway, backend, request).await
}

async fn login(gateway: &Gateway, request: Request) -> Result<Response> {
    if request.method() != Method::POST {
        return Err(GatewayError::MethodNotAllowed);
    }

    let mut upstream = forward(gateway, Backend::Auth, request).await?;

    if !upstream.status.is_success() {
        tracing::warn!(status = %upstream.status, "Login rejected upstream");
        return Ok(upstream.into_response());
    }

    let Some((token, body)) = take_token(&upstream.body) else {
        tracing::warn!("Login response carried no token; relaying unchanged");
        return Ok(upstream.into_response());
    };
    if !is_session_token(&token) {
        return Err(GatewayError::BadGateway(
            "login response carried a malformed session token".to_string(),
        ));
    }

    upstream.body = body;
    upstream.headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    append_session_cookie(&mut upstream.headers, gateway, token)?;

    Ok(upstream.into_response())
}

fn federated_callback(gateway: &Gateway, request: Request) -> Result<Response> {
    if request.method() != Method::GET {
        return Err(GatewayError::MethodNotAllowed);
    }

    let Query(params) = Query::<CallbackParams>::try_from_uri(request.uri())
        .map_err(|_| GatewayError::BadRequest("Invalid query string".to_string()))?;
    let token = params.token.trim();
    if token.is_empty() {
        return Err(GatewayError::BadRequest("Missing token".to_string()));
    }
    if !is_session_token(token) {
        return Err(GatewayError::BadRequest("Invalid token".to_string()));
    }

    let location = format!("{}{}", gateway.config.frontend_url, LANDING_PATH);
    let location = HeaderValue::from_str(&location)
        .map_err(|e| GatewayError::Internal(format!("invalid redirect location: {e}")))?;

    let mut response = StatusCode::FOUND.into_response();
    response.headers_mut().insert(header::LOCATION, location);
    append_session_cookie(response.headers_mut(), gateway, token.to_string())?;

    Ok(response)
}

async fn forward(gateway: &Gateway, backend: Backend, request: Request) -> Result<UpstreamResponse> {
    let client_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    let (parts, body) = request.into_parts();

    let body = to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|_| GatewayError::BadRequest("Invalid request body".to_string()))?;

    gateway
        .proxy
        .forward(
            backend,
            parts.method,
            &parts.uri,
            &parts.headers,
            body,
            client_addr,
        )
        .await
}

/// Split a JSON object reply into its string `token` and the remaining body
fn take_token(body: &Bytes) -> Option<(String, Bytes)> {
    let mut value: Value = serde_json::from_slice(body).ok()?;
    let token = match value.as_object_mut()?.remove("token")? {
        Value::String(token) if !token.is_empty() => token,
        _ => return None,
    };
    let body = serde_json::to_vec(&value).ok()?;
    Some((token, Bytes::from(body)))
}

/// Whether `token` has the shape of a session token
///
/// Only such values may become a cookie value; anything else could smuggle
/// extra attributes into `Set-Cookie`.
pub fn is_session_token(token: &str) -> bool {
    token.len() == SESSION_TOKEN_LEN
        && token
            .bytes()
            .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(SESSION_MAX_AGE)
        .build()
}

fn append_session_cookie(
    headers: &mut HeaderMap,
    gateway: &Gateway,
    token: String,
) -> Result<()> {
    let cookie = session_cookie(token, gateway.config.cookie_secure);
    let value = HeaderValue::from_str(&cookie.to_string())
        .map_err(|e| GatewayError::Internal(format!("invalid session cookie: {e}")))?;
    headers.append(header::SET_COOKIE, value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_token_strips_field() {
        let body = Bytes::from_static(
            br#"{"message":"Login successful","token":"abc123","user":{"id":1}}"#,
        );
        let (token, rest) = take_token(&body).unwrap();
        assert_eq!(token, "abc123");

        let rest: Value = serde_json::from_slice(&rest).unwrap();
        assert!(rest.get("token").is_none());
        assert_eq!(rest["message"], "Login successful");
        assert_eq!(rest["user"]["id"], 1);
    }

    #[test]
    fn test_take_token_ignores_other_shapes() {
        assert!(take_token(&Bytes::from_static(b"not json")).is_none());
        assert!(take_token(&Bytes::from_static(br#"["token"]"#)).is_none());
        assert!(take_token(&Bytes::from_static(br#"{"token":42}"#)).is_none());
        assert!(take_token(&Bytes::from_static(br#"{"token":""}"#)).is_none());
        assert!(take_token(&Bytes::from_static(br#"{"message":"ok"}"#)).is_none());
    }

    #[test]
    fn test_is_session_token() {
        assert!(is_session_token(&"ab12".repeat(16)));
        assert!(!is_session_token(&"AB12".repeat(16)));
        assert!(!is_session_token(&"ab12".repeat(15)));
        assert!(!is_session_token(&format!("{}; Domain=evil.test", "a".repeat(64))));
        assert!(!is_session_token(""));
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("abc".to_string(), false).to_string();
        assert!(cookie.starts_with("session_token=abc"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("Max-Age=604800"));
        assert!(!cookie.contains("Secure"));

        assert!(session_cookie("abc".to_string(), true).to_string().contains("Secure"));
    }
}
