//! Configuration Management
//!
//! Settings loading from environment variables and configuration files.

pub mod settings;

pub use settings::{
    CryptoSettings, RelaySettings, ServerSettings, SessionSettings, Settings,
    DEFAULT_SESSION_SECRET,
};
