//! Conversion dispatch.
//!
//! The [`Dispatcher`] routes one validated conversion request to the
//! matching engine. Routing is an exhaustive match over
//! [`ConversionKind`], so adding a category without a handler is a compile
//! error rather than a runtime fallthrough.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rc_core::config::ConversionConfig;
use rc_core::{ConversionKind, ImageMode, PdfMode, Result, VideoMode};

use crate::presets::{DevicePreset, ServicePreset};
use crate::tools::ToolRegistry;
use crate::{archive, document, ebook, image, media};

/// One validated conversion to execute.
#[derive(Debug, Clone, Copy)]
pub struct DispatchRequest<'a> {
    /// Staged input file.
    pub input: &'a Path,
    /// Where the engine must write its output.
    pub output: &'a Path,
    /// Resolved category/subcategory.
    pub kind: ConversionKind,
    /// Target extension, or preset name for the preset-keyed video modes.
    pub target: &'a str,
    /// The client's original upload name, for engines that embed it
    /// (archive entry naming).
    pub original_name: &'a str,
}

/// Routes validated requests to engines and normalizes their failures.
pub struct Dispatcher {
    tools: Arc<ToolRegistry>,
    conversion: ConversionConfig,
    invocations: AtomicU64,
}

impl Dispatcher {
    /// Create a dispatcher over the discovered tools and fixed conversion
    /// settings.
    pub fn new(tools: Arc<ToolRegistry>, conversion: ConversionConfig) -> Self {
        Self {
            tools,
            conversion,
            invocations: AtomicU64::new(0),
        }
    }

    /// How many dispatches have been attempted since startup. Batch
    /// validation tests assert this stays at zero when a batch is rejected.
    pub fn invocations(&self) -> u64 {
        self.invocations.load(Ordering::Relaxed)
    }

    /// The discovered tool registry.
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.conversion.tool_timeout_secs)
    }

    /// Execute one conversion.
    ///
    /// Exactly one terminal outcome per call: the output file is written
    /// and `Ok(())` returned, or an error is returned and any
    /// partially-written output has been discarded.
    pub async fn dispatch(&self, req: DispatchRequest<'_>) -> Result<()> {
        self.invocations.fetch_add(1, Ordering::Relaxed);
        tracing::info!(
            kind = %req.kind.label(),
            target = req.target,
            input = %req.input.display(),
            "dispatching conversion"
        );

        let result = self.route(&req).await;

        if let Err(ref e) = result {
            tracing::warn!(kind = %req.kind.label(), "conversion failed: {e}");
            match std::fs::remove_file(req.output) {
                Ok(()) => tracing::debug!("discarded partial output {}", req.output.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => tracing::warn!(
                    "could not discard partial output {}: {e}",
                    req.output.display()
                ),
            }
        }

        result
    }

    async fn route(&self, req: &DispatchRequest<'_>) -> Result<()> {
        let timeout = self.timeout();
        match req.kind {
            ConversionKind::Image(ImageMode::Convert) => {
                image::convert(&self.tools, req.input, req.output, req.target, timeout).await
            }
            ConversionKind::Image(ImageMode::Compress) => {
                image::compress(
                    req.input,
                    req.output,
                    req.target,
                    self.conversion.jpeg_quality,
                )
                .await
            }
            ConversionKind::Image(ImageMode::ToPdf) => {
                image::wrap_pdf(&self.tools, req.input, req.output, timeout).await
            }
            ConversionKind::Pdf(PdfMode::Compress) => {
                document::compress_pdf(&self.tools, req.input, req.output, timeout).await
            }
            ConversionKind::Pdf(PdfMode::ToImage) => {
                document::pdf_first_page(
                    &self.tools,
                    req.input,
                    req.output,
                    req.target,
                    self.conversion.pdf_image_dpi,
                    timeout,
                )
                .await
            }
            ConversionKind::Pdf(PdfMode::ToDocument)
            | ConversionKind::Pdf(PdfMode::ToEbook)
            | ConversionKind::Pdf(PdfMode::ToEbookProfile) => {
                document::office_convert(&self.tools, req.input, req.output, req.target, timeout)
                    .await
            }
            ConversionKind::Document => {
                document::convert_document(&self.tools, req.input, req.output, req.target, timeout)
                    .await
            }
            ConversionKind::Audio => {
                media::transcode_audio(&self.tools, req.input, req.output, timeout).await
            }
            ConversionKind::Video(VideoMode::Compress) => {
                media::compress_video(
                    &self.tools,
                    req.input,
                    req.output,
                    self.conversion.video_crf,
                    &self.conversion.video_preset,
                    timeout,
                )
                .await
            }
            ConversionKind::Video(VideoMode::ExtractAudio) => {
                media::extract_audio(&self.tools, req.input, req.output, timeout).await
            }
            ConversionKind::Video(VideoMode::Device) => {
                let preset = DevicePreset::resolve(req.target);
                tracing::debug!(preset = preset.name(), "device preset resolved");
                media::encode_with_preset(
                    &self.tools,
                    req.input,
                    req.output,
                    &preset.settings(),
                    timeout,
                )
                .await
            }
            ConversionKind::Video(VideoMode::WebService) => {
                let preset = ServicePreset::resolve(req.target);
                tracing::debug!(preset = preset.name(), "service preset resolved");
                media::encode_with_preset(
                    &self.tools,
                    req.input,
                    req.output,
                    &preset.settings(),
                    timeout,
                )
                .await
            }
            ConversionKind::Archive => {
                archive::pack(
                    &self.tools,
                    req.input,
                    req.output,
                    req.target,
                    req.original_name,
                    timeout,
                )
                .await
            }
            ConversionKind::Ebook => {
                ebook::convert_ebook(&self.tools, req.input, req.output, req.target, timeout).await
            }
        }
    }
}
