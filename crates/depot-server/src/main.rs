//! depot - release distribution server

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use depot_server::{Cli, Commands, ServerConfig, cmd};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise --debug picks the default level.
    let default_level = if cli.debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Some(Commands::Hash { files }) => cmd::hash::hash(&files),
        Some(Commands::Check { server, current }) => cmd::check::check(&server, &current).await,
        None => {
            let config = ServerConfig::from(&cli.serve);
            if cli.serve.build {
                tokio::task::spawn_blocking(move || cmd::build::build_only(&config)).await?
            } else {
                cmd::serve::serve(&config).await
            }
        }
    }
}
