//! Application configuration types.
//!
//! The top-level [`Config`] struct is deserialized from JSON and carries all
//! sub-configs for server, storage, tools, and conversion defaults. Every
//! section defaults sensibly so a completely empty `{}` file is valid.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::Error;

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub tools: ToolsConfig,
    pub conversion: ConversionConfig,
}

impl Config {
    /// Deserialize a `Config` from a JSON string.
    ///
    /// This is intentionally string-based so the caller can read the file
    /// however it sees fit (async, embedded, etc.).
    pub fn from_json(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str)
            .map_err(|e| Error::Validation(format!("config parse error: {e}")))
    }

    /// Load configuration from a file path, falling back to defaults if the
    /// path is `None` or the file does not exist.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_json(&contents).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse config file {}: {e}", path.display());
                Self::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config file at {}; using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Failed to read config file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.server.port == 0 {
            warnings.push("server.port is 0; a random port will be assigned".into());
        }

        if self.storage.upload_dir == self.storage.output_dir {
            warnings.push(
                "storage.upload_dir and storage.output_dir are the same directory; \
                 staged inputs and produced artifacts will share a namespace"
                    .into(),
            );
        }

        if self.conversion.jpeg_quality > 100 {
            warnings.push(format!(
                "conversion.jpeg_quality {} exceeds 100 and will be clamped",
                self.conversion.jpeg_quality
            ));
        }

        if self.conversion.video_crf > 51 {
            warnings.push(format!(
                "conversion.video_crf {} is outside the libx264 range 0-51",
                self.conversion.video_crf
            ));
        }

        for (name, path) in [
            ("ffmpeg_path", &self.tools.ffmpeg_path),
            ("soffice_path", &self.tools.soffice_path),
            ("ebook_convert_path", &self.tools.ebook_convert_path),
            ("magick_path", &self.tools.magick_path),
            ("seven_zip_path", &self.tools.seven_zip_path),
            ("gs_path", &self.tools.gs_path),
        ] {
            if let Some(p) = path {
                if !p.exists() {
                    warnings.push(format!("tools.{name} {} does not exist", p.display()));
                }
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
        }
    }
}

/// Scratch directories for staged inputs and produced artifacts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub upload_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("./data/uploads"),
            output_dir: PathBuf::from("./data/converted"),
        }
    }
}

/// Paths to external CLI tools. `None` means look them up in `PATH`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub ffmpeg_path: Option<PathBuf>,
    pub soffice_path: Option<PathBuf>,
    pub ebook_convert_path: Option<PathBuf>,
    pub magick_path: Option<PathBuf>,
    pub seven_zip_path: Option<PathBuf>,
    pub gs_path: Option<PathBuf>,
}

/// Fixed conversion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// JPEG quality used by the image compressor.
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
    /// CRF used by the video compressor.
    #[serde(default = "default_video_crf")]
    pub video_crf: u32,
    /// x264 speed preset used by the video compressor.
    #[serde(default = "default_video_preset")]
    pub video_preset: String,
    /// Resolution for first-page PDF rasterization.
    #[serde(default = "default_pdf_image_dpi")]
    pub pdf_image_dpi: u32,
    /// Maximum run time for one external tool invocation, in seconds.
    #[serde(default = "default_tool_timeout")]
    pub tool_timeout_secs: u64,
}

fn default_jpeg_quality() -> u8 {
    40
}
fn default_video_crf() -> u32 {
    28
}
fn default_video_preset() -> String {
    "veryfast".into()
}
fn default_pdf_image_dpi() -> u32 {
    150
}
fn default_tool_timeout() -> u64 {
    300
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: default_jpeg_quality(),
            video_crf: default_video_crf(),
            video_preset: default_video_preset(),
            pdf_image_dpi: default_pdf_image_dpi(),
            tool_timeout_secs: default_tool_timeout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = Config::default();
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.storage.upload_dir, PathBuf::from("./data/uploads"));
        assert_eq!(cfg.conversion.jpeg_quality, 40);
        assert_eq!(cfg.conversion.video_crf, 28);
        assert_eq!(cfg.conversion.pdf_image_dpi, 150);
    }

    #[test]
    fn default_config_no_warnings() {
        let cfg = Config::default();
        let warnings = cfg.validate();
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
    }

    #[test]
    fn shared_scratch_dir_warns() {
        let mut cfg = Config::default();
        cfg.storage.output_dir = cfg.storage.upload_dir.clone();
        let warnings = cfg.validate();
        assert!(warnings.iter().any(|w| w.contains("same directory")));
    }

    #[test]
    fn out_of_range_crf_warns() {
        let mut cfg = Config::default();
        cfg.conversion.video_crf = 99;
        let warnings = cfg.validate();
        assert!(warnings.iter().any(|w| w.contains("video_crf")));
    }

    #[test]
    fn missing_tool_path_warns() {
        let mut cfg = Config::default();
        cfg.tools.ffmpeg_path = Some(PathBuf::from("/nonexistent/ffmpeg"));
        let warnings = cfg.validate();
        assert!(warnings.iter().any(|w| w.contains("ffmpeg_path")));
    }

    #[test]
    fn parse_json_config() {
        let json = r#"{"server": {"port": 9090}, "conversion": {"jpeg_quality": 60}}"#;
        let cfg = Config::from_json(json).unwrap();
        assert_eq!(cfg.server.port, 9090);
        assert_eq!(cfg.conversion.jpeg_quality, 60);
        // Unspecified sections keep their defaults.
        assert_eq!(cfg.conversion.video_crf, 28);
    }

    #[test]
    fn parse_empty_json_uses_defaults() {
        let cfg = Config::from_json("{}").unwrap();
        assert_eq!(cfg.server.port, 8080);
    }

    #[test]
    fn load_or_default_with_missing_file() {
        let cfg = Config::load_or_default(Some(Path::new("/nonexistent/config.json")));
        assert_eq!(cfg.server.port, 8080);
    }
}
