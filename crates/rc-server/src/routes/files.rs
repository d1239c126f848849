//! Artifact retrieval and deletion.
//!
//! Retrieval follows a single-retrieval policy: the artifact is deleted
//! once its bytes have been read for the response, so each produced file
//! can be fetched successfully at most once. Callers that never fetch can
//! clean up with the explicit DELETE, which is idempotent.

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use rc_core::Error;

use crate::context::AppContext;
use crate::error::AppError;

/// GET /api/files/{name}
pub async fn download_artifact(
    State(ctx): State<AppContext>,
    Path(name): Path<String>,
) -> Result<Response, AppError> {
    let path = ctx.outputs.resolve(&name)?;

    let data = match tokio::fs::read(&path).await {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::not_found("artifact", &name).into())
        }
        Err(e) => return Err(Error::from(e).into()),
    };

    // Single-retrieval policy: remove the artifact now that its bytes are
    // in hand; a second GET of the same name is a 404.
    ctx.outputs.release(&path).await;

    let headers = [
        (
            header::CONTENT_TYPE,
            "application/octet-stream".to_string(),
        ),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{name}\""),
        ),
    ];
    Ok((headers, data).into_response())
}

/// DELETE /api/files/{name}
///
/// Idempotent: deleting an absent artifact still returns 204.
pub async fn delete_artifact(
    State(ctx): State<AppContext>,
    Path(name): Path<String>,
) -> Result<StatusCode, AppError> {
    let path = ctx.outputs.resolve(&name)?;
    ctx.outputs.release(&path).await;
    Ok(StatusCode::NO_CONTENT)
}
