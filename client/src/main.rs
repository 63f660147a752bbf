use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use client::{ApiClient, HyperTransport, MemoryNavigator, event};

/// Live-update monitor: connects the client against a backend and logs
/// every event the dashboards would react to. Doubles as the reference for
/// how an application shell composes and tears down the client.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "client.toml".to_string());
    let config =
        shared::load_config(&path).with_context(|| format!("Failed to load config from {}", path))?;

    let navigator = Arc::new(MemoryNavigator::new("/dashboard"));
    let client = ApiClient::new(config, Arc::new(HyperTransport::new()), navigator);

    for name in event::ALL {
        client.events().on(
            name,
            Arc::new(move |data| info!("{}: {}", name, data)),
        );
    }

    client.start_live_channel();
    client.start_polling();

    if client.check_health().await {
        info!("Backend is healthy");
    } else {
        info!("Backend health probe failed, continuing anyway");
    }

    info!("Monitoring live updates, Ctrl-C to exit");
    tokio::signal::ctrl_c().await?;

    client.close().await;
    Ok(())
}
