//! # rc-engines
//!
//! Conversion engines and the dispatcher for the recast service.
//!
//! This crate provides:
//!
//! - **Tool discovery** ([`ToolRegistry`]) -- find and cache paths to
//!   ffmpeg, soffice, ebook-convert, magick, 7z, and gs.
//! - **Command execution** ([`ToolCommand`]) -- async builder with timeout
//!   support for running external processes.
//! - **Engine functions** -- one module per category: [`image`],
//!   [`document`], [`media`], [`archive`], [`ebook`].
//! - **Preset tables** ([`presets`]) -- device and web-service encode
//!   presets with an explicit generic default.
//! - **Dispatch** ([`Dispatcher`]) -- routes one validated conversion
//!   request to the matching engine and normalizes failures.

pub mod archive;
pub mod command;
pub mod dispatch;
pub mod document;
pub mod ebook;
pub mod image;
pub mod media;
pub mod presets;
pub mod tools;

// ---- Re-exports for convenience ----

pub use command::{ToolCommand, ToolOutput};
pub use dispatch::{DispatchRequest, Dispatcher};
pub use presets::{DevicePreset, EncodeSettings, ServicePreset};
pub use tools::{ToolConfig, ToolInfo, ToolRegistry};
