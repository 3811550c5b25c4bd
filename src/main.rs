use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use panna_activity::{api, config, ActivityService, BlockscoutClient};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stdout)
        .with_target(false)
        .init();

    info!("Panna activity service starting...");

    let cfg = config::load()?;
    info!("  Explorer: {}", cfg.explorer_url);
    info!("  Port: {}", cfg.port);
    info!("  Request timeout: {}s", cfg.request_timeout_secs);

    let explorer = Arc::new(BlockscoutClient::new(&cfg)?);
    let service = Arc::new(ActivityService::new(explorer, &cfg));

    let api_handle = tokio::spawn({
        let cfg = cfg.clone();
        let service = Arc::clone(&service);
        async move { api::serve(cfg, service).await }
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

    info!("Panna activity service stopped.");
    Ok(())
}
