use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "recast")]
#[command(author, version, about = "Self-hosted batch file conversion service")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the conversion server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// Convert a single file without starting the server
    Convert {
        /// Input file to convert
        #[arg(required = true)]
        input: PathBuf,

        /// Conversion category (image, pdfs, document, audio, video,
        /// archive, ebook)
        #[arg(long)]
        category: String,

        /// Subcategory, for categories that have one
        #[arg(long)]
        subcategory: Option<String>,

        /// Target extension (or preset name for video/device and
        /// video/webservice)
        #[arg(long)]
        target: String,

        /// Output path (defaults to the input path with the target
        /// extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check that the external conversion tools are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },
}
