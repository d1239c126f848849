//! The batch conversion endpoint.
//!
//! `POST /api/convert` takes a multipart body: 1-5 parts named `files`
//! plus one `formats` text part holding a JSON array of per-file
//! descriptors, positionally aligned with the files. Files are staged to
//! the upload scratch area as they arrive; any exit path out of this
//! handler releases whatever was staged.

use axum::extract::{Multipart, State};
use axum::Json;

use rc_core::Error;

use crate::batch::{BatchDescriptor, ConversionResult, UploadedFile};
use crate::context::AppContext;
use crate::error::AppError;

/// POST /api/convert
pub async fn convert_batch(
    State(ctx): State<AppContext>,
    multipart: Multipart,
) -> Result<Json<Vec<ConversionResult>>, AppError> {
    let (uploads, formats_field) = match stage_parts(&ctx, multipart).await {
        Ok(parts) => parts,
        Err((staged, e)) => {
            release_all(&ctx, &staged).await;
            return Err(e.into());
        }
    };

    let Some(formats_json) = formats_field else {
        release_all(&ctx, &uploads).await;
        return Err(Error::validation("missing 'formats' field").into());
    };

    let descriptors: Vec<BatchDescriptor> = match serde_json::from_str(&formats_json) {
        Ok(descriptors) => descriptors,
        Err(e) => {
            release_all(&ctx, &uploads).await;
            return Err(Error::validation(format!("invalid formats descriptor: {e}")).into());
        }
    };

    // From here on the orchestrator owns the staged inputs and releases
    // them on every exit path.
    let results = ctx.batch.convert(uploads, descriptors).await?;
    Ok(Json(results))
}

/// Read the multipart stream, staging file parts and collecting the
/// formats descriptor. On failure, returns whatever was already staged so
/// the caller can release it.
async fn stage_parts(
    ctx: &AppContext,
    mut multipart: Multipart,
) -> Result<(Vec<UploadedFile>, Option<String>), (Vec<UploadedFile>, Error)> {
    let mut uploads: Vec<UploadedFile> = Vec::new();
    let mut formats_field: Option<String> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return Err((
                    uploads,
                    Error::validation(format!("malformed multipart body: {e}")),
                ))
            }
        };

        match field.name() {
            Some("formats") => match field.text().await {
                Ok(text) => formats_field = Some(text),
                Err(e) => {
                    return Err((
                        uploads,
                        Error::validation(format!("unreadable formats field: {e}")),
                    ))
                }
            },
            Some("files") => {
                let original = field
                    .file_name()
                    .map(str::to_string)
                    .unwrap_or_else(|| "upload".to_string());

                let data = match field.bytes().await {
                    Ok(data) => data,
                    Err(e) => {
                        return Err((
                            uploads,
                            Error::validation(format!(
                                "unreadable file part '{original}': {e}"
                            )),
                        ))
                    }
                };

                let path = ctx.uploads.stage(&original);
                if let Err(e) = tokio::fs::write(&path, &data).await {
                    return Err((uploads, Error::from(e)));
                }
                uploads.push(UploadedFile::new(original, path, data.len() as u64));
            }
            // Unknown parts are ignored rather than rejected.
            _ => {}
        }
    }

    Ok((uploads, formats_field))
}

async fn release_all(ctx: &AppContext, uploads: &[UploadedFile]) {
    for upload in uploads {
        ctx.uploads.release(&upload.path).await;
    }
}
