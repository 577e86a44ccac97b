use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};

use symscope::cli::Cli;
use symscope::core::OutlineEngine;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let max_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(max_level)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    info!("Starting Symscope v{}", env!("CARGO_PKG_VERSION"));

    // Create the core engine with configuration
    let engine = OutlineEngine::new(cli.config.as_deref())?;

    // Execute the requested command
    cli.execute(engine).await
}
