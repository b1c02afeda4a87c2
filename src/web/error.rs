use crate::error::Error;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

/// An HTTP error rendered as `{"detail": ...}`
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    /// Map a service error onto a status code. Validation problems are the
    /// caller's fault; everything else is reported as an internal error
    /// prefixed with `context`.
    pub fn from_error(err: Error, context: &str) -> Self {
        match err {
            Error::Validation(message) => Self::new(StatusCode::BAD_REQUEST, message),
            other => {
                error!("{}: {}", context, other);
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("{}: {}", context, other),
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}
