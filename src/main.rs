//! taskdeck - HTTP Server Entry Point
//!
//! Starts the HTTP server that exposes the task orchestration API.

use taskdeck::{api, config::Config};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskdeck=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!(
        "Loaded configuration: model={} router={}",
        config.default_model, config.router_url
    );

    // Start HTTP server
    api::serve(config).await?;

    Ok(())
}
