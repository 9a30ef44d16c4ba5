//! # ReserveLink
//!
//! Relay server entry point. Initializes:
//! - Tracing/logging subsystem
//! - Configuration loading
//! - HTTP/WebSocket server

use anyhow::Result;
use tracing::info;

use reservelink::config::Settings;
use reservelink::startup::Application;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber for structured logging
    reservelink::telemetry::init_tracing();

    info!("Starting ReserveLink relay...");

    // Load configuration from environment and config files
    let settings = Settings::load()?;
    info!(
        host = %settings.server.host,
        port = %settings.server.port,
        environment = %settings.environment,
        "Configuration loaded"
    );

    // Build and run the application
    let application = Application::build(settings).await?;

    info!("Relay ready to accept connections");
    application.run_until_stopped().await?;

    Ok(())
}
