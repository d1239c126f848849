//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which builds a full [`AppContext`] over
//! temp-dir scratch areas. The [`with_server`] constructor starts Axum on
//! a random port for HTTP-level testing.
//!
//! [`with_server`]: TestHarness::with_server

use std::io::Cursor;
use std::net::SocketAddr;

use rc_core::config::Config;
use rc_server::{build_router, AppContext};
use tempfile::TempDir;

/// Test harness wrapping a fully-constructed [`AppContext`] backed by
/// temporary scratch directories.
pub struct TestHarness {
    pub ctx: AppContext,
    _scratch: TempDir,
}

impl TestHarness {
    /// Create a new harness with default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create a new harness with a custom configuration. The storage
    /// directories are always redirected into a fresh temp dir.
    pub fn with_config(mut config: Config) -> Self {
        let scratch = TempDir::new().expect("failed to create scratch dir");
        config.storage.upload_dir = scratch.path().join("uploads");
        config.storage.output_dir = scratch.path().join("converted");

        let ctx = AppContext::new(config).expect("failed to build context");
        Self {
            ctx,
            _scratch: scratch,
        }
    }

    /// Start an Axum server on a random port and return the harness
    /// together with the bound socket address.
    pub async fn with_server() -> (Self, SocketAddr) {
        let harness = Self::new();
        let app = build_router(harness.ctx.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        (harness, addr)
    }

    /// Number of files currently staged in the upload scratch area.
    pub fn upload_count(&self) -> usize {
        std::fs::read_dir(self.ctx.uploads.dir()).unwrap().count()
    }

    /// Number of artifacts currently in the output scratch area.
    pub fn output_count(&self) -> usize {
        std::fs::read_dir(self.ctx.outputs.dir()).unwrap().count()
    }
}

/// A small valid PNG, encoded in memory.
pub fn png_bytes() -> Vec<u8> {
    let img = image::RgbImage::from_fn(16, 16, |x, y| {
        image::Rgb([(x * 16) as u8, (y * 16) as u8, 200])
    });
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .expect("png encode");
    buf
}

/// Build the multipart form for one conversion batch.
///
/// `files` pairs an upload filename with its bytes; `formats` is the raw
/// descriptor array.
pub fn batch_form(
    files: Vec<(&str, Vec<u8>)>,
    formats: serde_json::Value,
) -> reqwest::multipart::Form {
    let mut form = reqwest::multipart::Form::new();
    for (name, bytes) in files {
        form = form.part(
            "files",
            reqwest::multipart::Part::bytes(bytes).file_name(name.to_string()),
        );
    }
    form.text("formats", formats.to_string())
}
