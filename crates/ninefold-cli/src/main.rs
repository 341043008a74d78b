//! Ninefold CLI entry point

use clap::Parser;
use tracing::info;

use ninefold_cli::{
    app,
    cli::{Cli, Commands},
    config::AppConfig,
    error::Result,
};
use ninefold_relay::RelayServer;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let config = load_configuration(&cli)?;

    match cli.command {
        Commands::Relay { bind } => {
            let addr = bind.unwrap_or_else(|| config.relay.bind.clone()).parse()?;
            info!(%addr, "starting relay");
            RelayServer::new().run(addr).await?;
        }
        Commands::Play {
            mode,
            room,
            relay_url,
        } => {
            app::run(mode, room, relay_url, config).await?;
        }
    }

    Ok(())
}

/// Setup logging based on verbosity level
fn setup_logging(verbose: bool) {
    let log_level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

/// Load configuration from file or use defaults
fn load_configuration(cli: &Cli) -> Result<AppConfig> {
    match &cli.config {
        Some(path) => {
            info!("loading configuration from {path}");
            AppConfig::load_from_file(path)
        }
        None => AppConfig::load(),
    }
}
