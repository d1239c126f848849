//! Error-to-HTTP response conversion.
//!
//! Implements `IntoResponse` for [`rc_core::Error`] so that route handlers
//! can return `Result<T, AppError>` and use `?` on core results directly.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Wrapper so we can implement `IntoResponse` for an external type.
pub struct AppError {
    inner: rc_core::Error,
    request_id: Option<String>,
}

impl AppError {
    pub fn new(inner: rc_core::Error) -> Self {
        Self {
            inner,
            request_id: None,
        }
    }

    pub fn with_request_id(mut self, id: String) -> Self {
        self.request_id = Some(id);
        self
    }
}

impl From<rc_core::Error> for AppError {
    fn from(e: rc_core::Error) -> Self {
        Self::new(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.inner.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(
                status = %status,
                error = %self.inner,
                "Server error in API handler"
            );
        }

        let code = match &self.inner {
            rc_core::Error::NotFound { .. } => "not_found",
            rc_core::Error::Validation(_) => "validation_error",
            rc_core::Error::Tool { .. } => "tool_error",
            rc_core::Error::Engine { .. } => "engine_error",
            rc_core::Error::Io { .. } => "io_error",
            rc_core::Error::Internal(_) => "internal_error",
        };

        let body = json!({
            "error": self.inner.to_string(),
            "code": code,
            "request_id": self.request_id,
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_produces_404() {
        let err = AppError::new(rc_core::Error::not_found("artifact", "x.pdf"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn validation_produces_400() {
        let err = AppError::new(rc_core::Error::validation("bad batch"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn tool_failure_produces_502() {
        let err = AppError::new(rc_core::Error::tool("ffmpeg", "exit 1"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn with_request_id() {
        let err = AppError::new(rc_core::Error::Internal("oops".into()))
            .with_request_id("req-123".into());
        assert_eq!(err.request_id.as_deref(), Some("req-123"));
    }
}
