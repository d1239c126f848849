mod cli;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};
use rc_core::config::Config;
use rc_core::ConversionKind;
use rc_engines::{DispatchRequest, Dispatcher, ToolRegistry};
use rc_server::{build_router, AppContext};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Serve { host, port } => serve(cli.config.as_deref(), host, port).await,
        Commands::Convert {
            input,
            category,
            subcategory,
            target,
            output,
        } => {
            convert_one(
                cli.config.as_deref(),
                input,
                &category,
                subcategory.as_deref(),
                &target,
                output,
            )
            .await
        }
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Validate { config } => validate(config.or(cli.config)),
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn serve(config_path: Option<&Path>, host: String, port: u16) -> Result<()> {
    let mut config = Config::load_or_default(config_path);
    config.server.host = host;
    config.server.port = port;

    for warning in config.validate() {
        tracing::warn!("config: {warning}");
    }

    let ctx = AppContext::new(config)?;

    // Drop anything a previous process left behind in the scratch areas.
    ctx.sweep_scratch();

    let available: Vec<String> = ctx
        .tools
        .iter()
        .map(|(name, _)| name.clone())
        .collect();
    tracing::info!("discovered tools: {}", available.join(", "));

    let addr = format!("{}:{}", ctx.config.server.host, ctx.config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("recast listening on {addr}");

    let app = build_router(ctx);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("shutdown signal received");
    }
}

async fn convert_one(
    config_path: Option<&Path>,
    input: PathBuf,
    category: &str,
    subcategory: Option<&str>,
    target: &str,
    output: Option<PathBuf>,
) -> Result<()> {
    let config = Config::load_or_default(config_path);

    let kind = ConversionKind::resolve(category, subcategory)?;
    if !kind.is_valid_target(target) {
        anyhow::bail!("target '{target}' is not valid for {}", kind.label());
    }

    let target = target.trim().to_ascii_lowercase();
    let extension = kind.output_extension(&target);
    let output = output.unwrap_or_else(|| input.with_extension(&extension));
    let original_name = input
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "input".to_string());

    let tools = Arc::new(ToolRegistry::discover(&config.tools));
    let dispatcher = Dispatcher::new(tools, config.conversion.clone());

    dispatcher
        .dispatch(DispatchRequest {
            input: &input,
            output: &output,
            kind,
            target: &target,
            original_name: &original_name,
        })
        .await?;

    println!("wrote {}", output.display());
    Ok(())
}

fn check_tools(config_path: Option<&Path>) -> Result<()> {
    let config = Config::load_or_default(config_path);
    let registry = ToolRegistry::discover(&config.tools);

    for info in registry.check_all() {
        let status = if info.available { "ok" } else { "missing" };
        let version = info.version.as_deref().unwrap_or("-");
        println!("{:<14} {:<8} {version}", info.name, status);
    }
    Ok(())
}

fn validate(config_path: Option<PathBuf>) -> Result<()> {
    let config = Config::load_or_default(config_path.as_deref());
    let warnings = config.validate();

    if warnings.is_empty() {
        println!("configuration ok");
    } else {
        for warning in &warnings {
            println!("warning: {warning}");
        }
    }
    Ok(())
}
