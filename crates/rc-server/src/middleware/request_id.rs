//! Request ID middleware.
//!
//! Each request gets an identifier -- taken from an incoming `x-request-id`
//! header when present, freshly generated otherwise. The id is attached to
//! the request extensions for error bodies, wrapped around the handler as a
//! tracing span, and echoed back on the response.

use axum::http::{HeaderName, HeaderValue, Request};
use axum::middleware::Next;
use axum::response::Response;
use tracing::Instrument;
use uuid::Uuid;

/// Header name used for the request identifier.
pub static X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Identifier attached to the request extensions.
#[derive(Debug, Clone)]
pub struct RequestIdExt(pub String);

/// Middleware that assigns a request ID and echoes it on the response.
pub async fn request_id_middleware(
    mut request: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let id = incoming_id(&request).unwrap_or_else(|| Uuid::new_v4().to_string());

    request.extensions_mut().insert(RequestIdExt(id.clone()));

    let span = tracing::info_span!("request", request_id = %id);
    let mut response = next.run(request).instrument(span).await;

    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(X_REQUEST_ID.clone(), value);
    }

    response
}

fn incoming_id(request: &Request<axum::body::Body>) -> Option<String> {
    let value = request.headers().get(&X_REQUEST_ID)?.to_str().ok()?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_string())
}
