use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// The upstream could not be reached, timed out, or sent an unreadable reply
    #[error("Bad Gateway")]
    BadGateway(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Method Not Allowed")]
    MethodNotAllowed,

    #[error("{0}")]
    BadRequest(String),

    #[error("Not Found")]
    NotFound,

    #[error("Internal Server Error")]
    Internal(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            GatewayError::Unauthorized => StatusCode::UNAUTHORIZED,
            GatewayError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::NotFound => StatusCode::NOT_FOUND,
            GatewayError::Internal(_) | GatewayError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        match &self {
            GatewayError::BadGateway(detail) => {
                tracing::error!(error = %detail, "Upstream request failed");
            }
            GatewayError::Internal(detail) | GatewayError::Config(detail) => {
                tracing::error!(error = %detail, "Gateway failure");
            }
            _ => {}
        }

        let status = self.status();
        let message = match self {
            GatewayError::Config(_) => "Internal Server Error".to_string(),
            other => other.to_string(),
        };
        let body = Json(json!({
            "error": message,
            "code": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;
