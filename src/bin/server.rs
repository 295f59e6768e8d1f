use clap::Parser;
use keyvald::config::Config;
use keyvald::{server, Result};
use tracing::debug;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    let _ = tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .try_init()
        .map_err(|e| debug!("Failed to initialize global tracing: {}", e));

    server::run(config).await
}
