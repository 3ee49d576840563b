use axum::{
    RequestPartsExt,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::CookieJar;
use tollgate::{SessionToken, User};
use tollgate_core::RepositoryProvider;

use crate::{error::ApiError, routes::AuthState, types::CookieConfig};

/// Session token from the `Authorization: Bearer` header or the session cookie
pub struct SessionTokenFromRequest(pub Option<SessionToken>);

impl<S> FromRequestParts<S> for SessionTokenFromRequest
where
    S: Send + Sync,
    CookieConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Try Bearer token first, then fall back to cookie
        if let Some(token) = parts
            .headers
            .get("Authorization")
            .and_then(|header| header.to_str().ok())
            .and_then(|header| header.strip_prefix("Bearer "))
            .filter(|token| !token.is_empty())
        {
            return Ok(SessionTokenFromRequest(Some(SessionToken::new(token))));
        }

        let cookie_config = CookieConfig::from_ref(state);
        let jar = parts
            .extract::<CookieJar>()
            .await
            .map_err(|_| ApiError::BadRequest("Invalid cookie header".to_string()))?;

        let session_token = jar
            .get(&cookie_config.name)
            .map(|cookie| cookie.value())
            .filter(|value| !value.is_empty())
            .map(SessionToken::new);

        Ok(SessionTokenFromRequest(session_token))
    }
}

/// The user owning the presented session; rejects with 401 otherwise
pub struct AuthUser(pub User);

impl<R> FromRequestParts<AuthState<R>> for AuthUser
where
    R: RepositoryProvider,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AuthState<R>,
    ) -> Result<Self, Self::Rejection> {
        let SessionTokenFromRequest(token) =
            SessionTokenFromRequest::from_request_parts(parts, state).await?;
        let token = token.ok_or_else(ApiError::unauthorized)?;

        let user = state.tollgate.current_user(&token).await?;
        Ok(AuthUser(user))
    }
}
