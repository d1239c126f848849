//! # rc-core
//!
//! Shared foundation for the recast conversion service.
//!
//! This crate provides:
//!
//! - **Error taxonomy** ([`Error`]) -- one unified error type with an HTTP
//!   status mapping used by every other crate.
//! - **Configuration** ([`config::Config`]) -- serde-backed settings with
//!   sensible defaults for every section.
//! - **Typed IDs** ([`RequestId`], [`BatchId`]) -- newtype wrappers over UUID.
//! - **Format registry** ([`formats`]) -- the closed category/subcategory
//!   model and the static tables of legal conversion targets.
//! - **Staging** ([`staging::Staging`]) -- scratch-area lifecycle for
//!   uploaded inputs and produced outputs.

pub mod config;
pub mod error;
pub mod formats;
pub mod ids;
pub mod staging;

// ---- Re-exports for convenience ----

pub use error::{Error, Result};
pub use formats::{Category, ConversionKind, ImageMode, PdfMode, VideoMode};
pub use ids::{BatchId, RequestId};
pub use staging::Staging;
