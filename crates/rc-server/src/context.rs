//! Shared application context.
//!
//! [`AppContext`] is the central struct shared across all route handlers
//! via Axum state. Everything in it is immutable infrastructure wrapped in
//! `Arc`s, so cloning is cheap and no locking is needed anywhere in the
//! request path.

use std::sync::Arc;
use std::time::Instant;

use rc_core::config::Config;
use rc_core::{Result, Staging};
use rc_engines::{Dispatcher, ToolRegistry};

use crate::batch::BatchConverter;

/// Application context shared by all request handlers (via Axum state).
///
/// This is cheaply cloneable because it only holds `Arc`s.
#[derive(Clone)]
pub struct AppContext {
    /// Immutable application configuration snapshot.
    pub config: Arc<Config>,
    /// External tool registry.
    pub tools: Arc<ToolRegistry>,
    /// Conversion dispatcher.
    pub dispatcher: Arc<Dispatcher>,
    /// Scratch area for staged uploads.
    pub uploads: Arc<Staging>,
    /// Scratch area for produced artifacts.
    pub outputs: Arc<Staging>,
    /// Batch orchestrator.
    pub batch: Arc<BatchConverter>,
    /// Process start time, for the health probe.
    pub started_at: Instant,
}

impl AppContext {
    /// Build the full context from a configuration: discover tools, create
    /// the scratch directories, and wire the dispatcher and orchestrator.
    pub fn new(config: Config) -> Result<Self> {
        let tools = Arc::new(ToolRegistry::discover(&config.tools));
        let dispatcher = Arc::new(Dispatcher::new(tools.clone(), config.conversion.clone()));
        let uploads = Arc::new(Staging::new(&config.storage.upload_dir)?);
        let outputs = Arc::new(Staging::new(&config.storage.output_dir)?);
        let batch = Arc::new(BatchConverter::new(
            dispatcher.clone(),
            uploads.clone(),
            outputs.clone(),
        ));

        Ok(Self {
            config: Arc::new(config),
            tools,
            dispatcher,
            uploads,
            outputs,
            batch,
            started_at: Instant::now(),
        })
    }

    /// Delete leftover scratch files from a previous process.
    pub fn sweep_scratch(&self) {
        self.uploads.sweep();
        self.outputs.sweep();
    }
}
