//! chunkdrop entry point.

mod app;
mod cli;
mod config;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

fn main() -> anyhow::Result<()> {
    // Bad invocations exit here, before the config file is touched.
    let cli = Cli::parse();

    // Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting chunkdrop");

    let mut config = config::Config::load()?;
    config.apply_endpoint_override(cli.endpoint);
    tracing::info!(endpoint = %config.endpoint, "configuration loaded");

    let rt = tokio::runtime::Runtime::new()?;
    let outcome = rt.block_on(app::run(config, cli.files))?;
    outcome.ensure_success()?;

    tracing::info!(files = outcome.reports.len(), "all uploads completed");
    Ok(())
}
