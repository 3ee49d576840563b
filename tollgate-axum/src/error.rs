use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tollgate_core::{
    Error,
    error::{AuthError, IdentityError, SessionError, StorageError, ValidationError},
};

/// Error returned by every handler, already reduced to what a client may see
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    /// Storage, hashing, mail, or provider failure; the detail is only logged
    #[error("Internal server error")]
    Upstream,
}

impl ApiError {
    pub fn unauthorized() -> Self {
        ApiError::Unauthorized("Unauthorized".to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Validation(e) => ApiError::BadRequest(validation_message(e)),
            Error::Auth(AuthError::UserAlreadyExists)
            | Error::Storage(StorageError::Constraint(_)) => {
                ApiError::Conflict("Email already registered".to_string())
            }
            Error::Auth(AuthError::InvalidCredentials) => {
                ApiError::Unauthorized("Invalid email or password".to_string())
            }
            Error::Auth(AuthError::EmailNotVerified) => {
                ApiError::Forbidden("Please verify your email before logging in".to_string())
            }
            Error::Auth(AuthError::InvalidOrExpiredCode) => {
                ApiError::BadRequest("Invalid or expired verification code".to_string())
            }
            Error::Auth(AuthError::UserNotFound) => ApiError::NotFound("User not found".to_string()),
            Error::Session(SessionError::NoSession) => {
                ApiError::BadRequest("No session found".to_string())
            }
            Error::Session(SessionError::NotFound | SessionError::InvalidToken(_)) => {
                ApiError::unauthorized()
            }
            Error::Identity(IdentityError::UnknownProvider(name)) => {
                ApiError::NotFound(format!("Unknown identity provider: {name}"))
            }
            Error::Identity(IdentityError::InvalidState) => {
                ApiError::BadRequest("Invalid or expired login state".to_string())
            }
            other => {
                tracing::error!(error = %other, "Request failed");
                ApiError::Upstream
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection, "Rejected request body");
        ApiError::BadRequest("Invalid request body".to_string())
    }
}

fn validation_message(err: ValidationError) -> String {
    match err {
        ValidationError::InvalidEmail(msg)
        | ValidationError::InvalidPassword(msg)
        | ValidationError::InvalidName(msg)
        | ValidationError::InvalidField(msg)
        | ValidationError::MissingField(msg) => msg,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "error": self.to_string(),
            "code": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
