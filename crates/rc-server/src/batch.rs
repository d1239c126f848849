//! Batch orchestration.
//!
//! [`BatchConverter`] is the request-level coordinator: it validates the
//! whole batch before any engine runs, dispatches per-file conversions
//! concurrently, and guarantees that every staged input is released on
//! every exit path. The batch is fail-fast: the first per-file error aborts
//! the call, and outputs already produced by the failing batch are released
//! too, since the caller never learns their names.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future::try_join_all;
use serde::{Deserialize, Serialize};

use rc_core::staging::sanitize_name;
use rc_core::{formats, BatchId, ConversionKind, Error, RequestId, Result, Staging};
use rc_engines::{DispatchRequest, Dispatcher};

/// Maximum number of files per batch.
pub const MAX_BATCH_SIZE: usize = 5;

/// One inbound file, staged on disk for the duration of a request.
///
/// Owned exclusively by the orchestrator; the staged file is deleted when
/// the request finishes, success or failure.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Name the client uploaded the file under.
    pub original_name: String,
    /// Lowercased extension detected from the original name.
    pub extension: String,
    /// Path to the staged copy in the upload scratch area.
    pub path: PathBuf,
    /// Size of the staged copy in bytes.
    pub size: u64,
}

impl UploadedFile {
    /// Build the record for a file already staged at `path`.
    pub fn new(original_name: impl Into<String>, path: PathBuf, size: u64) -> Self {
        let original_name = original_name.into();
        let extension = Path::new(&original_name)
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        Self {
            original_name,
            extension,
            path,
            size,
        }
    }
}

/// One element of the `formats` descriptor array, positionally aligned
/// with the uploaded files.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchDescriptor {
    /// Target extension, or preset name for video/device and
    /// video/webservice.
    pub target: String,
    /// Category wire name.
    #[serde(rename = "type")]
    pub category: String,
    /// Subcategory wire name, where the category has one.
    #[serde(rename = "subSection", default)]
    pub subcategory: Option<String>,
    /// Caller-supplied correlation id; generated when absent.
    #[serde(default)]
    pub id: Option<String>,
}

/// Output of one successful conversion.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionResult {
    /// Correlation id tying this result to its descriptor. Match results
    /// by this id, never by position.
    pub id: String,
    /// Artifact file name, unique per conversion.
    pub name: String,
    /// Retrieval-relative path for the artifact.
    pub path: String,
}

/// Fully-validated plan for one conversion within a batch.
struct Plan<'a> {
    upload: &'a UploadedFile,
    kind: ConversionKind,
    target: String,
    id: String,
    name: String,
    output: PathBuf,
}

/// Request-level batch coordinator.
pub struct BatchConverter {
    dispatcher: Arc<Dispatcher>,
    uploads: Arc<Staging>,
    outputs: Arc<Staging>,
}

impl BatchConverter {
    /// Create an orchestrator over the given dispatcher and scratch areas.
    pub fn new(dispatcher: Arc<Dispatcher>, uploads: Arc<Staging>, outputs: Arc<Staging>) -> Self {
        Self {
            dispatcher,
            uploads,
            outputs,
        }
    }

    /// Convert a whole batch.
    ///
    /// Every staged input is released before this returns, whichever way
    /// the batch went.
    pub async fn convert(
        &self,
        uploads: Vec<UploadedFile>,
        descriptors: Vec<BatchDescriptor>,
    ) -> Result<Vec<ConversionResult>> {
        let batch_id = BatchId::new();
        let result = self.run(batch_id, &uploads, &descriptors).await;

        for upload in &uploads {
            self.uploads.release(&upload.path).await;
        }

        result
    }

    async fn run(
        &self,
        batch_id: BatchId,
        uploads: &[UploadedFile],
        descriptors: &[BatchDescriptor],
    ) -> Result<Vec<ConversionResult>> {
        if uploads.is_empty() || uploads.len() > MAX_BATCH_SIZE {
            return Err(Error::validation(format!(
                "batch size must be between 1 and {MAX_BATCH_SIZE}, got {}",
                uploads.len()
            )));
        }
        if uploads.len() != descriptors.len() {
            return Err(Error::validation(format!(
                "got {} files but {} format descriptors",
                uploads.len(),
                descriptors.len()
            )));
        }

        let plans = self.plan(uploads, descriptors)?;

        tracing::info!(batch = %batch_id, files = plans.len(), "dispatching batch");

        let dispatches = plans.iter().map(|plan| self.dispatch_one(plan));

        match try_join_all(dispatches).await {
            Ok(results) => Ok(results),
            Err(e) => {
                // Fail-fast: the caller never learns the artifact names of
                // a failed batch, so anything already produced would be
                // orphaned. Release the lot.
                for plan in &plans {
                    self.outputs.release(&plan.output).await;
                }
                Err(e)
            }
        }
    }

    /// Validate every element and build its plan. No engine runs until the
    /// whole batch has passed.
    fn plan<'a>(
        &self,
        uploads: &'a [UploadedFile],
        descriptors: &'a [BatchDescriptor],
    ) -> Result<Vec<Plan<'a>>> {
        let mut plans = Vec::with_capacity(uploads.len());

        for (upload, descriptor) in uploads.iter().zip(descriptors) {
            let file = &upload.original_name;

            if !formats::is_accepted_input(&upload.extension) {
                return Err(Error::validation(format!(
                    "file '{file}': input type '{}' is not accepted",
                    upload.extension
                )));
            }

            let kind =
                ConversionKind::resolve(&descriptor.category, descriptor.subcategory.as_deref())
                    .map_err(|e| name_validation(file, e))?;

            if !kind.is_valid_target(&descriptor.target) {
                return Err(Error::validation(format!(
                    "file '{file}': target '{}' is not valid for {}",
                    descriptor.target,
                    kind.label()
                )));
            }

            if !upload.path.is_file() {
                return Err(Error::validation(format!(
                    "file '{file}': staged input is missing"
                )));
            }

            let request_id = RequestId::new();
            let id = descriptor
                .id
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| request_id.to_string());

            // Engines match lowercase targets; normalize once here.
            let target = descriptor.target.trim().to_ascii_lowercase();
            let name = output_name(file, &request_id, &kind.output_extension(&target));
            let output = self.outputs.dir().join(&name);

            plans.push(Plan {
                upload,
                kind,
                target,
                id,
                name,
                output,
            });
        }

        Ok(plans)
    }

    async fn dispatch_one(&self, plan: &Plan<'_>) -> Result<ConversionResult> {
        self.dispatcher
            .dispatch(DispatchRequest {
                input: &plan.upload.path,
                output: &plan.output,
                kind: plan.kind,
                target: &plan.target,
                original_name: &plan.upload.original_name,
            })
            .await?;

        Ok(ConversionResult {
            id: plan.id.clone(),
            name: plan.name.clone(),
            path: format!("/api/files/{}", plan.name),
        })
    }
}

/// Prefix a validation message with the offending file's name.
fn name_validation(file: &str, e: Error) -> Error {
    match e {
        Error::Validation(message) => Error::validation(format!("file '{file}': {message}")),
        other => other,
    }
}

/// Collision-free artifact name: sanitized stem, per-request identifier,
/// output extension.
fn output_name(original_name: &str, request_id: &RequestId, extension: &str) -> String {
    let base = sanitize_name(original_name);
    let stem = Path::new(&base)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "file".to_string());
    format!("{stem}_{}.{extension}", request_id.short())
}
