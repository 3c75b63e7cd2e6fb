//! Trendwatch - scheduled short-video trend reports
//!
//! Main entry point for the CLI application.

use clap::Parser;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trendwatch::cli::{self, Cli};
use trendwatch::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    // Build configuration
    let mut config = Config::load();
    if args.debug {
        config.agent.debug = true;
    }

    // Initialize logging; RUST_LOG wins over the flag
    let default_filter = if config.agent.debug {
        "trendwatch=debug"
    } else {
        "trendwatch=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    debug!(config_file = %Config::config_file().display(), "Configuration loaded");

    cli::execute(args.command, config, args.dry_run).await?;

    Ok(())
}
