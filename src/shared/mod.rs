//! Shared Utilities
//!
//! Crate-wide error types and the secure storage codec.

pub mod crypto;
pub mod error;

pub use crypto::SecureCodec;
pub use error::AppError;
