//! Application Error Types
//!
//! Centralized error handling. Handlers inside the relay loop log and
//! continue instead of returning errors (malformed frames are non-fatal),
//! so this enum covers the startup and session-management surfaces.

use crate::session::storage::StoreError;
use crate::shared::crypto::CryptoError;

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}
