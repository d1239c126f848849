//! Format registry: the closed category/subcategory model and the static
//! tables of legal conversion targets.
//!
//! The wire format is string-keyed (`{"type": "video", "subSection":
//! "device"}`), but it is resolved into the tagged [`ConversionKind`] enum
//! before anything downstream looks at it, so engine routing is a
//! compile-time exhaustive match rather than runtime string fallthrough.
//! All tables are process-wide immutable statics.

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Target tables
// ---------------------------------------------------------------------------

/// Raster targets the primary in-process image encoder handles.
pub const IMAGE_TARGETS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "bmp", "tiff", "ico"];

/// The lossy/lossless pair supported by the image compressor.
pub const IMAGE_COMPRESS_TARGETS: &[&str] = &["jpg", "jpeg", "png"];

/// First-page rasterization targets for PDFs.
pub const PDF_IMAGE_TARGETS: &[&str] = &["png", "jpg"];

/// Office-converter targets for the pdfs/document subcategory.
pub const PDF_DOCUMENT_TARGETS: &[&str] = &["docx", "odt", "rtf", "txt", "html"];

/// Office-converter targets for the standalone document category.
pub const DOCUMENT_TARGETS: &[&str] = &["pdf", "docx", "odt", "rtf", "txt", "html"];

/// Direct audio transcode targets.
pub const AUDIO_TARGETS: &[&str] = &["mp3", "wav", "ogg", "flac", "aac", "m4a", "opus"];

/// Audio-extraction targets for the video/audio subcategory.
pub const VIDEO_AUDIO_TARGETS: &[&str] = &["mp3", "aac", "wav", "ogg"];

/// Supported archive containers. Everything else (rar in particular) is
/// rejected.
pub const ARCHIVE_TARGETS: &[&str] = &["zip", "7z"];

/// E-book conversion targets.
pub const EBOOK_TARGETS: &[&str] = &["epub", "mobi", "azw3", "fb2", "pdf", "txt"];

const PDF_ONLY: &[&str] = &["pdf"];
const EPUB_ONLY: &[&str] = &["epub"];
const MP4_ONLY: &[&str] = &["mp4"];

/// Every input extension the service accepts, across all categories.
pub const ACCEPTED_INPUTS: &[&str] = &[
    // images
    "jpg", "jpeg", "png", "gif", "webp", "bmp", "tiff", "tif", "svg", "ico", "avif", "heic",
    // documents
    "pdf", "doc", "docx", "odt", "ods", "odp", "rtf", "txt", "md", "html", "htm", "csv", "xls",
    "xlsx", "ppt", "pptx",
    // ebooks
    "epub", "mobi", "azw3", "fb2", "lit",
    // audio
    "mp3", "wav", "ogg", "oga", "flac", "aac", "m4a", "wma", "opus", "aiff",
    // video
    "mp4", "mkv", "avi", "mov", "wmv", "flv", "webm", "m4v", "mpg", "mpeg", "3gp", "ts",
    // archives
    "zip", "tar", "gz", "tgz", "bz2", "7z", "rar", "xz",
];

// ---------------------------------------------------------------------------
// Categories and kinds
// ---------------------------------------------------------------------------

/// Top-level conversion domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Image,
    Pdf,
    Document,
    Audio,
    Video,
    Archive,
    Ebook,
}

impl Category {
    /// All categories in wire order.
    pub const ALL: &'static [Category] = &[
        Category::Image,
        Category::Pdf,
        Category::Document,
        Category::Audio,
        Category::Video,
        Category::Archive,
        Category::Ebook,
    ];

    /// Parse the wire name of a category.
    pub fn parse(s: &str) -> Option<Category> {
        match s.to_ascii_lowercase().as_str() {
            "image" => Some(Category::Image),
            "pdfs" => Some(Category::Pdf),
            "document" => Some(Category::Document),
            "audio" => Some(Category::Audio),
            "video" => Some(Category::Video),
            "archive" => Some(Category::Archive),
            "ebook" => Some(Category::Ebook),
            _ => None,
        }
    }

    /// Wire name of this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Image => "image",
            Category::Pdf => "pdfs",
            Category::Document => "document",
            Category::Audio => "audio",
            Category::Video => "video",
            Category::Archive => "archive",
            Category::Ebook => "ebook",
        }
    }
}

/// Mode within the image category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageMode {
    /// Direct raster format conversion.
    Convert,
    /// Fixed-quality re-encode.
    Compress,
    /// Wrap the raster image as a single-page PDF.
    ToPdf,
}

/// Mode within the pdfs category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PdfMode {
    /// Fixed document-optimization profile.
    Compress,
    /// Rasterize only the first page.
    ToImage,
    /// Round-trip through the office converter into a document format.
    ToDocument,
    /// Round-trip into epub.
    ToEbook,
    /// Round-trip into epub for e-reader profiles.
    ToEbookProfile,
}

/// Mode within the video category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VideoMode {
    /// Fixed-quality re-encode into a single container.
    Compress,
    /// Strip the video track and transcode the remaining audio.
    ExtractAudio,
    /// Scale/bitrate preset keyed by device name. Unknown names resolve to
    /// the generic preset, so any non-empty target is legal here.
    Device,
    /// Same preset pattern keyed by target platform name.
    WebService,
}

/// One fully-resolved conversion selector: category plus subcategory, as a
/// closed tagged enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConversionKind {
    Image(ImageMode),
    Pdf(PdfMode),
    Document,
    Audio,
    Video(VideoMode),
    Archive,
    Ebook,
}

impl ConversionKind {
    /// Resolve wire strings into a kind.
    ///
    /// Categories without a subcategory concept reject any provided
    /// subcategory; categories that require one reject its absence. Both
    /// cases are `Validation` errors, never panics.
    pub fn resolve(category: &str, subcategory: Option<&str>) -> Result<ConversionKind> {
        let cat = Category::parse(category)
            .ok_or_else(|| Error::validation(format!("unknown category '{category}'")))?;

        let sub = subcategory
            .map(|s| s.trim().to_ascii_lowercase())
            .filter(|s| !s.is_empty());
        let sub = sub.as_deref();

        let unknown_sub = |s: &str| {
            Error::validation(format!(
                "unknown subcategory '{s}' for category '{}'",
                cat.as_str()
            ))
        };

        match cat {
            Category::Image => match sub {
                None | Some("convert") => Ok(ConversionKind::Image(ImageMode::Convert)),
                Some("compressor") => Ok(ConversionKind::Image(ImageMode::Compress)),
                Some("pdf") => Ok(ConversionKind::Image(ImageMode::ToPdf)),
                Some(s) => Err(unknown_sub(s)),
            },
            Category::Pdf => match sub {
                Some("compressor") => Ok(ConversionKind::Pdf(PdfMode::Compress)),
                Some("pdf_to_image") => Ok(ConversionKind::Pdf(PdfMode::ToImage)),
                Some("document") => Ok(ConversionKind::Pdf(PdfMode::ToDocument)),
                Some("ebook") => Ok(ConversionKind::Pdf(PdfMode::ToEbook)),
                Some("pdf_ebook") => Ok(ConversionKind::Pdf(PdfMode::ToEbookProfile)),
                Some(s) => Err(unknown_sub(s)),
                None => Err(Error::validation(
                    "category 'pdfs' requires a subcategory".to_string(),
                )),
            },
            Category::Video => match sub {
                Some("compressor") => Ok(ConversionKind::Video(VideoMode::Compress)),
                Some("audio") => Ok(ConversionKind::Video(VideoMode::ExtractAudio)),
                Some("device") => Ok(ConversionKind::Video(VideoMode::Device)),
                Some("webservice") => Ok(ConversionKind::Video(VideoMode::WebService)),
                Some(s) => Err(unknown_sub(s)),
                None => Err(Error::validation(
                    "category 'video' requires a subcategory".to_string(),
                )),
            },
            Category::Document | Category::Audio | Category::Archive | Category::Ebook => {
                if let Some(s) = sub {
                    return Err(unknown_sub(s));
                }
                Ok(match cat {
                    Category::Document => ConversionKind::Document,
                    Category::Audio => ConversionKind::Audio,
                    Category::Archive => ConversionKind::Archive,
                    Category::Ebook => ConversionKind::Ebook,
                    _ => unreachable!(),
                })
            }
        }
    }

    /// The category this kind belongs to.
    pub fn category(&self) -> Category {
        match self {
            ConversionKind::Image(_) => Category::Image,
            ConversionKind::Pdf(_) => Category::Pdf,
            ConversionKind::Document => Category::Document,
            ConversionKind::Audio => Category::Audio,
            ConversionKind::Video(_) => Category::Video,
            ConversionKind::Archive => Category::Archive,
            ConversionKind::Ebook => Category::Ebook,
        }
    }

    /// Wire name of the subcategory, if this kind has one.
    pub fn subcategory(&self) -> Option<&'static str> {
        match self {
            ConversionKind::Image(ImageMode::Convert) => None,
            ConversionKind::Image(ImageMode::Compress) => Some("compressor"),
            ConversionKind::Image(ImageMode::ToPdf) => Some("pdf"),
            ConversionKind::Pdf(PdfMode::Compress) => Some("compressor"),
            ConversionKind::Pdf(PdfMode::ToImage) => Some("pdf_to_image"),
            ConversionKind::Pdf(PdfMode::ToDocument) => Some("document"),
            ConversionKind::Pdf(PdfMode::ToEbook) => Some("ebook"),
            ConversionKind::Pdf(PdfMode::ToEbookProfile) => Some("pdf_ebook"),
            ConversionKind::Video(VideoMode::Compress) => Some("compressor"),
            ConversionKind::Video(VideoMode::ExtractAudio) => Some("audio"),
            ConversionKind::Video(VideoMode::Device) => Some("device"),
            ConversionKind::Video(VideoMode::WebService) => Some("webservice"),
            ConversionKind::Document
            | ConversionKind::Audio
            | ConversionKind::Archive
            | ConversionKind::Ebook => None,
        }
    }

    /// Allowed target extensions for this kind, or `None` for the
    /// preset-name-keyed kinds (video/device, video/webservice) where the
    /// target field carries a preset name rather than an extension.
    pub fn allowed_targets(&self) -> Option<&'static [&'static str]> {
        match self {
            ConversionKind::Image(ImageMode::Convert) => Some(IMAGE_TARGETS),
            ConversionKind::Image(ImageMode::Compress) => Some(IMAGE_COMPRESS_TARGETS),
            ConversionKind::Image(ImageMode::ToPdf) => Some(PDF_ONLY),
            ConversionKind::Pdf(PdfMode::Compress) => Some(PDF_ONLY),
            ConversionKind::Pdf(PdfMode::ToImage) => Some(PDF_IMAGE_TARGETS),
            ConversionKind::Pdf(PdfMode::ToDocument) => Some(PDF_DOCUMENT_TARGETS),
            ConversionKind::Pdf(PdfMode::ToEbook) => Some(EPUB_ONLY),
            ConversionKind::Pdf(PdfMode::ToEbookProfile) => Some(EPUB_ONLY),
            ConversionKind::Document => Some(DOCUMENT_TARGETS),
            ConversionKind::Audio => Some(AUDIO_TARGETS),
            ConversionKind::Video(VideoMode::Compress) => Some(MP4_ONLY),
            ConversionKind::Video(VideoMode::ExtractAudio) => Some(VIDEO_AUDIO_TARGETS),
            ConversionKind::Video(VideoMode::Device) => None,
            ConversionKind::Video(VideoMode::WebService) => None,
            ConversionKind::Archive => Some(ARCHIVE_TARGETS),
            ConversionKind::Ebook => Some(EBOOK_TARGETS),
        }
    }

    /// Whether `target` is a legal target value for this kind.
    pub fn is_valid_target(&self, target: &str) -> bool {
        let t = target.trim().to_ascii_lowercase();
        match self.allowed_targets() {
            Some(set) => set.contains(&t.as_str()),
            // Preset-keyed: any non-empty name is legal; unknown names
            // resolve to the generic preset downstream.
            None => !t.is_empty(),
        }
    }

    /// The file extension of the produced output for the given target
    /// value. Preset-keyed kinds always produce mp4.
    pub fn output_extension(&self, target: &str) -> String {
        match self {
            ConversionKind::Video(VideoMode::Device)
            | ConversionKind::Video(VideoMode::WebService) => "mp4".to_string(),
            _ => target.trim().to_ascii_lowercase(),
        }
    }

    /// `category/subcategory` label for error messages and logs.
    pub fn label(&self) -> String {
        match self.subcategory() {
            Some(sub) => format!("{}/{sub}", self.category().as_str()),
            None => self.category().as_str().to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Registry surface
// ---------------------------------------------------------------------------

/// One row of the registry, for clients enumerating the format matrix.
#[derive(Debug, Clone, Copy)]
pub struct RegistryEntry {
    pub kind: ConversionKind,
    /// Allowed target extensions; `None` for preset-name-keyed rows.
    pub targets: Option<&'static [&'static str]>,
}

/// Every legal (category, subcategory) pair.
pub static REGISTRY: &[RegistryEntry] = &[
    RegistryEntry {
        kind: ConversionKind::Image(ImageMode::Convert),
        targets: Some(IMAGE_TARGETS),
    },
    RegistryEntry {
        kind: ConversionKind::Image(ImageMode::Compress),
        targets: Some(IMAGE_COMPRESS_TARGETS),
    },
    RegistryEntry {
        kind: ConversionKind::Image(ImageMode::ToPdf),
        targets: Some(PDF_ONLY),
    },
    RegistryEntry {
        kind: ConversionKind::Pdf(PdfMode::Compress),
        targets: Some(PDF_ONLY),
    },
    RegistryEntry {
        kind: ConversionKind::Pdf(PdfMode::ToImage),
        targets: Some(PDF_IMAGE_TARGETS),
    },
    RegistryEntry {
        kind: ConversionKind::Pdf(PdfMode::ToDocument),
        targets: Some(PDF_DOCUMENT_TARGETS),
    },
    RegistryEntry {
        kind: ConversionKind::Pdf(PdfMode::ToEbook),
        targets: Some(EPUB_ONLY),
    },
    RegistryEntry {
        kind: ConversionKind::Pdf(PdfMode::ToEbookProfile),
        targets: Some(EPUB_ONLY),
    },
    RegistryEntry {
        kind: ConversionKind::Document,
        targets: Some(DOCUMENT_TARGETS),
    },
    RegistryEntry {
        kind: ConversionKind::Audio,
        targets: Some(AUDIO_TARGETS),
    },
    RegistryEntry {
        kind: ConversionKind::Video(VideoMode::Compress),
        targets: Some(MP4_ONLY),
    },
    RegistryEntry {
        kind: ConversionKind::Video(VideoMode::ExtractAudio),
        targets: Some(VIDEO_AUDIO_TARGETS),
    },
    RegistryEntry {
        kind: ConversionKind::Video(VideoMode::Device),
        targets: None,
    },
    RegistryEntry {
        kind: ConversionKind::Video(VideoMode::WebService),
        targets: None,
    },
    RegistryEntry {
        kind: ConversionKind::Archive,
        targets: Some(ARCHIVE_TARGETS),
    },
    RegistryEntry {
        kind: ConversionKind::Ebook,
        targets: Some(EBOOK_TARGETS),
    },
];

/// Wire names of all categories.
pub fn categories() -> Vec<&'static str> {
    Category::ALL.iter().map(|c| c.as_str()).collect()
}

/// Whether the given input extension is accepted at all.
///
/// A leading dot and mixed case are tolerated.
pub fn is_accepted_input(extension: &str) -> bool {
    let ext = extension.trim_start_matches('.').to_ascii_lowercase();
    ACCEPTED_INPUTS.contains(&ext.as_str())
}
