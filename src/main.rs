mod aggregator;
mod api;
mod clash;
mod config;
mod error;
mod models;

use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stdout)
        .with_target(false)
        .init();

    info!("Clan summary service starting...");

    let cfg = config::load()?;
    info!("  Upstream: {}", cfg.api_base_url);
    info!("  Port: {}", cfg.port);
    info!("  Upstream timeout: {:?}", cfg.upstream_timeout);

    let api_handle = tokio::spawn({
        let cfg = cfg.clone();
        async move { api::serve(cfg).await }
    });

    tokio::select! {
        res = api_handle => match res {
            Ok(Ok(_)) => info!("API exited cleanly"),
            Ok(Err(e)) => error!("API error: {:?}", e),
            Err(e) => error!("API task panicked: {:?}", e),
        },
        _ = signal::ctrl_c() => {
            info!("Shutdown signal received, stopping...");
        }
    }

    info!("Clan summary service stopped.");
    Ok(())
}
