//! # rc-server
//!
//! HTTP surface of the recast conversion service.
//!
//! This crate provides:
//!
//! - **Context** ([`context::AppContext`]) -- shared state handed to every
//!   handler via Axum state.
//! - **Batch orchestration** ([`batch::BatchConverter`]) -- validates a
//!   whole batch, dispatches per-file conversions concurrently, and
//!   guarantees scratch cleanup on every exit path.
//! - **Routes** ([`routes`]) -- the convert endpoint, artifact
//!   retrieval/deletion, health, tools, and formats.
//! - **Router** ([`router::build_router`]) -- wires routes, CORS, tracing,
//!   and the request-id middleware together.

pub mod batch;
pub mod context;
pub mod error;
pub mod middleware;
pub mod router;
pub mod routes;

// ---- Re-exports for convenience ----

pub use batch::{BatchConverter, BatchDescriptor, ConversionResult, UploadedFile, MAX_BATCH_SIZE};
pub use context::AppContext;
pub use error::AppError;
pub use router::build_router;
