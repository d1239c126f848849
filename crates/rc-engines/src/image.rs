//! Raster image conversion.
//!
//! The primary engine is the `image` crate, run in-process under
//! `spawn_blocking`. Formats the primary encoder cannot produce (or inputs
//! it cannot decode, e.g. SVG) fall back to ImageMagick -- the one
//! documented fallback path in the system. Image-to-PDF wrapping also goes
//! through ImageMagick.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::time::Duration;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, ImageFormat};

use rc_core::{Error, Result};

use crate::command::ToolCommand;
use crate::tools::ToolRegistry;

/// Map a target extension to the primary encoder's format, if it has one.
fn primary_format(target: &str) -> Option<ImageFormat> {
    match target {
        "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
        "png" => Some(ImageFormat::Png),
        "webp" => Some(ImageFormat::WebP),
        "gif" => Some(ImageFormat::Gif),
        "bmp" => Some(ImageFormat::Bmp),
        "tiff" => Some(ImageFormat::Tiff),
        "ico" => Some(ImageFormat::Ico),
        _ => None,
    }
}

fn engine_err(e: image::ImageError) -> Error {
    Error::engine("image", e.to_string())
}

/// Direct raster format conversion.
///
/// Tries the in-process encoder first; on decode or encode failure the
/// partial output is discarded and the conversion is retried through
/// ImageMagick.
pub async fn convert(
    tools: &ToolRegistry,
    input: &Path,
    output: &Path,
    target: &str,
    timeout: Duration,
) -> Result<()> {
    if let Some(format) = primary_format(target) {
        let owned_in = input.to_path_buf();
        let owned_out = output.to_path_buf();
        let primary =
            tokio::task::spawn_blocking(move || encode_primary(&owned_in, &owned_out, format))
                .await
                .map_err(|e| Error::Internal(format!("image encode task failed: {e}")))?;

        match primary {
            Ok(()) => return Ok(()),
            Err(e) => {
                tracing::warn!(
                    "primary image encoder failed for {} ({e}); falling back to magick",
                    input.display()
                );
                let _ = std::fs::remove_file(output);
            }
        }
    }

    magick(tools, input, output, timeout).await
}

/// Fixed-quality re-encode for the lossy/lossless raster pair.
pub async fn compress(input: &Path, output: &Path, target: &str, quality: u8) -> Result<()> {
    let target = target.to_ascii_lowercase();
    let owned_in = input.to_path_buf();
    let owned_out = output.to_path_buf();
    tokio::task::spawn_blocking(move || encode_compressed(&owned_in, &owned_out, &target, quality))
        .await
        .map_err(|e| Error::Internal(format!("image compress task failed: {e}")))?
}

/// Wrap a raster image as a single-page PDF via ImageMagick.
pub async fn wrap_pdf(
    tools: &ToolRegistry,
    input: &Path,
    output: &Path,
    timeout: Duration,
) -> Result<()> {
    magick(tools, input, output, timeout).await
}

fn encode_primary(
    input: &Path,
    output: &Path,
    format: ImageFormat,
) -> std::result::Result<(), image::ImageError> {
    let img = image::open(input)?;
    // JPEG has no alpha channel; flatten before encoding.
    let img = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(img.to_rgb8()),
        _ => img,
    };
    img.save_with_format(output, format)
}

fn encode_compressed(input: &Path, output: &Path, target: &str, quality: u8) -> Result<()> {
    let img = image::open(input).map_err(engine_err)?;
    match target {
        "jpg" | "jpeg" => {
            let rgb = img.to_rgb8();
            let file = File::create(output)?;
            let mut writer = BufWriter::new(file);
            let mut encoder = JpegEncoder::new_with_quality(&mut writer, quality.min(100));
            encoder.encode_image(&rgb).map_err(engine_err)?;
        }
        "png" => {
            let file = File::create(output)?;
            let writer = BufWriter::new(file);
            let encoder =
                PngEncoder::new_with_quality(writer, CompressionType::Best, FilterType::Adaptive);
            img.write_with_encoder(encoder).map_err(engine_err)?;
        }
        other => {
            return Err(Error::validation(format!(
                "image compressor cannot target '{other}'"
            )))
        }
    }
    Ok(())
}

/// Run `magick <input> <output>`, letting ImageMagick infer both formats
/// from the extensions.
async fn magick(
    tools: &ToolRegistry,
    input: &Path,
    output: &Path,
    timeout: Duration,
) -> Result<()> {
    let magick = tools.require("magick")?;
    ToolCommand::new(magick.path.clone())
        .arg(input.to_string_lossy())
        .arg(output.to_string_lossy())
        .timeout(timeout)
        .execute()
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const TIMEOUT: Duration = Duration::from_secs(30);

    fn sample_png(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("sample.png");
        let img = image::RgbImage::from_fn(16, 16, |x, y| {
            image::Rgb([(x * 16) as u8, (y * 16) as u8, 128])
        });
        img.save(&path).unwrap();
        path
    }

    #[tokio::test]
    async fn convert_png_to_bmp_in_process() {
        let tmp = TempDir::new().unwrap();
        let input = sample_png(tmp.path());
        let output = tmp.path().join("out.bmp");

        convert(&ToolRegistry::empty(), &input, &output, "bmp", TIMEOUT)
            .await
            .unwrap();

        let img = image::open(&output).unwrap();
        assert_eq!(img.width(), 16);
    }

    #[tokio::test]
    async fn compress_png_to_jpeg() {
        let tmp = TempDir::new().unwrap();
        let input = sample_png(tmp.path());
        let output = tmp.path().join("out.jpg");

        compress(&input, &output, "jpg", 40).await.unwrap();

        assert!(output.exists());
        assert_ne!(input, output);
        // The output must be a decodable JPEG.
        let format = image::ImageFormat::from_path(&output).unwrap();
        assert_eq!(format, image::ImageFormat::Jpeg);
        image::open(&output).unwrap();
    }

    #[tokio::test]
    async fn compress_rejects_other_targets() {
        let tmp = TempDir::new().unwrap();
        let input = sample_png(tmp.path());
        let output = tmp.path().join("out.webp");

        let err = compress(&input, &output, "webp", 40).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn exotic_target_without_magick_fails_with_tool_error() {
        let tmp = TempDir::new().unwrap();
        let input = sample_png(tmp.path());
        let output = tmp.path().join("out.heic");

        let err = convert(&ToolRegistry::empty(), &input, &output, "heic", TIMEOUT)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Tool { .. }));
    }

    #[tokio::test]
    async fn undecodable_input_falls_back_and_reports_missing_tool() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("not_an_image.png");
        std::fs::write(&input, b"definitely not a png").unwrap();
        let output = tmp.path().join("out.jpg");

        // Primary decode fails; with no magick available the fallback
        // surfaces as a tool error.
        let err = convert(&ToolRegistry::empty(), &input, &output, "jpg", TIMEOUT)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Tool { .. }));
        assert!(!output.exists());
    }
}
