use std::{sync::Arc, time::Duration};

use axum::{
    Json, Router,
    extract::{FromRef, Path, Query, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use axum_extra::extract::CookieJar;
use tollgate::{ResendOutcome, Tollgate};
use tollgate_core::RepositoryProvider;

use crate::{
    error::{ApiError, Result},
    extractors::{AuthUser, SessionTokenFromRequest},
    types::*,
};

/// Budget for the storage probe behind `GET /health`
pub const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(1);

pub struct AuthState<R: RepositoryProvider> {
    pub tollgate: Arc<Tollgate<R>>,
    pub cookie_config: CookieConfig,
    /// Public origin of the gateway; federated callbacks redirect through it
    pub gateway_url: String,
}

impl<R: RepositoryProvider> Clone for AuthState<R> {
    fn clone(&self) -> Self {
        Self {
            tollgate: self.tollgate.clone(),
            cookie_config: self.cookie_config.clone(),
            gateway_url: self.gateway_url.clone(),
        }
    }
}

impl<R: RepositoryProvider> FromRef<AuthState<R>> for CookieConfig {
    fn from_ref(state: &AuthState<R>) -> Self {
        state.cookie_config.clone()
    }
}

pub fn create_router<R>(state: AuthState<R>) -> Router
where
    R: RepositoryProvider + 'static,
{
    let auth_routes = Router::new()
        .route("/auth/register", post(register_handler))
        .route("/auth/verify", post(verify_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/resend-code", post(resend_code_handler))
        .route("/auth/logout", post(logout_handler))
        .route("/auth/{provider}", get(federated_begin_handler))
        .route("/auth/{provider}/callback", get(federated_callback_handler));

    let api_routes = Router::new()
        .route("/api/me", get(me_handler))
        .route("/api/users/search", get(search_handler));

    Router::new()
        .route("/", get(hello_handler))
        .route("/health", get(health_handler))
        .merge(auth_routes)
        .merge(api_routes)
        .with_state(state)
}

async fn hello_handler() -> impl IntoResponse {
    Json(MessageResponse::new("Hello World"))
}

async fn health_handler<R>(State(state): State<AuthState<R>>) -> Response
where
    R: RepositoryProvider,
{
    let healthy = match tokio::time::timeout(HEALTH_CHECK_TIMEOUT, state.tollgate.health_check())
        .await
    {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Health check failed");
            false
        }
        Err(_) => {
            tracing::error!("Health check timed out");
            false
        }
    };

    if healthy {
        Json(HealthResponse {
            status: "up".to_string(),
            message: "It's healthy".to_string(),
        })
        .into_response()
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "down".to_string(),
                message: "database unavailable".to_string(),
            }),
        )
            .into_response()
    }
}

async fn register_handler<R>(
    State(state): State<AuthState<R>>,
    payload: std::result::Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let Json(payload) = payload?;

    let user_id = state
        .tollgate
        .register(payload.email.trim(), &payload.password, &payload.name)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Registration successful. Please check your email for verification code."
                .to_string(),
            user_id,
        }),
    ))
}

async fn verify_handler<R>(
    State(state): State<AuthState<R>>,
    payload: std::result::Result<Json<VerifyRequest>, JsonRejection>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let Json(payload) = payload?;
    let (email, code) = (payload.email.trim(), payload.code.trim());
    if email.is_empty() || code.is_empty() {
        return Err(ApiError::BadRequest(
            "Email and code are required".to_string(),
        ));
    }

    state.tollgate.verify_email(email, code).await?;

    Ok(Json(MessageResponse::new(
        "Email verified successfully! You can now log in.",
    )))
}

async fn login_handler<R>(
    State(state): State<AuthState<R>>,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let Json(payload) = payload?;
    let email = payload.email.trim();
    if email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Email and password are required".to_string(),
        ));
    }

    let (user, session) = state.tollgate.login(email, &payload.password).await?;

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token: session.token.into_inner(),
        user: user.into(),
    }))
}

async fn resend_code_handler<R>(
    State(state): State<AuthState<R>>,
    payload: std::result::Result<Json<ResendCodeRequest>, JsonRejection>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let Json(payload) = payload?;
    let email = payload.email.trim();
    if email.is_empty() {
        return Err(ApiError::BadRequest("Email is required".to_string()));
    }

    let message = match state.tollgate.resend_code(email).await? {
        ResendOutcome::Sent => "Verification code sent successfully",
        ResendOutcome::AlreadyVerified => "Email already verified",
    };

    Ok(Json(MessageResponse::new(message)))
}

async fn logout_handler<R>(
    State(state): State<AuthState<R>>,
    jar: CookieJar,
    SessionTokenFromRequest(session_token): SessionTokenFromRequest,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    state.tollgate.logout(session_token.as_ref()).await?;

    let jar = jar.add(state.cookie_config.removal_cookie());

    Ok((jar, Json(MessageResponse::new("Logged out successfully"))))
}

async fn me_handler(AuthUser(user): AuthUser) -> impl IntoResponse {
    Json(user.public())
}

async fn search_handler<R>(
    State(state): State<AuthState<R>>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let users = state
        .tollgate
        .search_users(&query.query, query.limit())
        .await?;

    Ok(Json(SearchResponse {
        users: users.into_iter().map(Into::into).collect(),
    }))
}

async fn federated_begin_handler<R>(
    State(state): State<AuthState<R>>,
    Path(provider): Path<String>,
) -> Result<Response>
where
    R: RepositoryProvider,
{
    let url = state.tollgate.begin_federated_login(&provider).await?;
    Ok(found(&url))
}

async fn federated_callback_handler<R>(
    State(state): State<AuthState<R>>,
    Path(provider): Path<String>,
    Query(query): Query<CallbackQuery>,
) -> Result<Response>
where
    R: RepositoryProvider,
{
    if let Some(error) = query.error {
        tracing::warn!(provider = %provider, error = %error, "Provider denied the login");
        return Err(ApiError::BadRequest("Login was not completed".to_string()));
    }

    let (Some(code), Some(csrf_state)) = (query.code, query.state) else {
        return Err(ApiError::BadRequest(
            "Missing code or state parameter".to_string(),
        ));
    };

    let (user, session) = state
        .tollgate
        .finish_federated_login(&provider, &code, &csrf_state)
        .await?;
    tracing::info!(user_id = %user.id, provider = %provider, "Federated login completed");

    let location = format!(
        "{}/auth/callback?token={}",
        state.gateway_url.trim_end_matches('/'),
        session.token.as_str()
    );
    Ok(found(&location))
}

/// `302 Found`; axum's `Redirect` only offers 303, 307, and 308
fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}
