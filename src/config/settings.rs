//! Application settings and configuration structures.

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::shared::error::AppError;

/// Development fallback for the symmetric session secret.
///
/// Used only when neither configuration files nor `SESSION_SECRET`
/// provide a value; deployments are expected to override it.
pub const DEFAULT_SESSION_SECRET: &str = "reservelink-dev-secret-change-me";

/// Root configuration structure containing all application settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Server configuration (host, port)
    pub server: ServerSettings,

    /// WebSocket relay configuration
    pub relay: RelaySettings,

    /// Session lifecycle configuration
    pub session: SessionSettings,

    /// Symmetric crypto configuration
    pub crypto: CryptoSettings,

    /// Current environment (development, staging, production)
    pub environment: String,
}

/// Server binding configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// Host address to bind to (e.g., "0.0.0.0")
    pub host: String,

    /// Port number to listen on
    pub port: u16,
}

/// WebSocket relay configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RelaySettings {
    /// Heartbeat probe interval in seconds (default: 30)
    pub heartbeat_interval_secs: u64,

    /// Maximum message size in bytes (default: 64KB)
    /// Protects against DoS via oversized messages
    pub max_message_size: usize,
}

/// Session lifecycle configuration.
///
/// The session manager itself is a client-side model; these values are the
/// server-distributed defaults it is constructed with.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionSettings {
    /// Inactivity tolerated before the expiry warning, in milliseconds
    /// (default: 3600000, one hour)
    pub timeout_ms: u64,

    /// Length of the visible expiry countdown, in seconds (default: 10)
    pub countdown_secs: u32,

    /// Interval of the cookie-presence poll, in seconds (default: 5)
    pub cookie_poll_interval_secs: u64,

    /// Floor for the warning delay so a tiny timeout cannot arm a
    /// zero-delay timer, in milliseconds (default: 1000)
    pub min_warning_delay_ms: u64,
}

/// Symmetric crypto configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CryptoSettings {
    /// Passphrase the AES-256-GCM key is derived from
    pub secret: String,
}

impl Settings {
    /// Load settings from environment variables and configuration files.
    ///
    /// The loading order is:
    /// 1. config/default.toml (base configuration)
    /// 2. config/{RUN_ENV}.toml (environment-specific overrides)
    /// 3. Environment variables (highest priority)
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] if configuration cannot be loaded or
    /// parsed.
    pub fn load() -> Result<Self, AppError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        // Determine the running environment
        let environment = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".into());

        let settings = Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("relay.heartbeat_interval_secs", 30_i64)?
            .set_default("relay.max_message_size", 65536_i64)? // 64KB
            .set_default("session.timeout_ms", 3_600_000_i64)?
            .set_default("session.countdown_secs", 10_i64)?
            .set_default("session.cookie_poll_interval_secs", 5_i64)?
            .set_default("session.min_warning_delay_ms", 1000_i64)?
            .set_default("crypto.secret", DEFAULT_SESSION_SECRET)?
            // Load from config files
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Load from environment variables
            // APP__SERVER__PORT=8080 -> server.port = 8080
            .add_source(
                Environment::default()
                    .prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            // Map simple environment variables
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option("server.port", std::env::var("SERVER_PORT").ok())?
            .set_override_option("crypto.secret", std::env::var("SESSION_SECRET").ok())?
            .build()?
            .try_deserialize()?;

        Ok(settings)
    }

    /// Get the full server address as a string.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl ServerSettings {
    /// Get the socket address for binding.
    pub fn socket_addr(&self) -> std::net::SocketAddr {
        format!("{}:{}", self.host, self.port)
            .parse()
            .expect("Invalid server address configuration")
    }
}
