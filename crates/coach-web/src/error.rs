//! Error types for the web front.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Errors surfaced to HTTP callers.
///
/// Pipeline and dispatch failures never show up here; they are logged and
/// acknowledged with `200`.
#[derive(Debug, Error)]
pub enum WebError {
    /// Missing or wrong secret.
    #[error("Unauthorized")]
    Unauthorized,

    /// Bad request body.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The model call behind a synchronous endpoint failed.
    #[error("Upstream error: {0}")]
    Upstream(String),
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = match &self {
            WebError::Unauthorized => StatusCode::UNAUTHORIZED,
            WebError::BadRequest(_) => StatusCode::BAD_REQUEST,
            WebError::Upstream(_) => StatusCode::BAD_GATEWAY,
        };

        let body = serde_json::json!({
            "ok": false,
            "error": self.to_string()
        });

        (status, Json(body)).into_response()
    }
}

/// Result type for handlers.
pub type Result<T> = std::result::Result<T, WebError>;
