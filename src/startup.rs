//! Application Startup
//!
//! Application building and server initialization.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;

use crate::config::Settings;
use crate::relay::registry::ClientRegistry;
use crate::relay::routes;
use crate::shared::error::AppError;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ClientRegistry>,
    pub settings: Arc<Settings>,
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self, AppError> {
        let addr = settings.server.socket_addr();

        // Create the client registry
        let registry = Arc::new(ClientRegistry::new());

        // Create app state
        let state = AppState {
            registry,
            settings: Arc::new(settings),
        };

        // Build router
        let router = routes::create_router(state);

        // Bind to address (port 0 picks an ephemeral port, used by tests)
        let listener = TcpListener::bind(addr).await?;
        tracing::info!("Listening on {}", listener.local_addr()?);

        Ok(Self { listener, router })
    }

    /// Run the server until stopped
    pub async fn run_until_stopped(self) -> Result<(), AppError> {
        axum::serve(self.listener, self.router).await?;
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}
