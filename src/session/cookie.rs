//! Session Cookie
//!
//! The encrypted `userSession` cookie is the authoritative "is a session
//! alive" signal, independent of in-memory flags. Its value is an
//! AES-256-GCM blob of the identity fields; reads are fail closed, so a
//! missing, tampered, or foreign cookie all mean "no session".

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::session::storage::{CookieJar, StoreResult};
use crate::shared::crypto::SecureCodec;
use crate::shared::error::AppError;

/// Name of the session cookie.
pub const SESSION_COOKIE_NAME: &str = "userSession";

/// Identity fields carried by the session cookie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionIdentity {
    pub user_id: i64,
    pub school_id: i64,
    pub user_level: String,
    /// Issue time in milliseconds since the Unix epoch
    pub timestamp: i64,
}

impl SessionIdentity {
    /// Build an identity stamped with the current wall-clock time.
    pub fn issued_now(user_id: i64, school_id: i64, user_level: impl Into<String>) -> Self {
        Self {
            user_id,
            school_id,
            user_level: user_level.into(),
            timestamp: Utc::now().timestamp_millis(),
        }
    }
}

/// Attributes a cookie is set with.
#[derive(Debug, Clone, PartialEq)]
pub struct CookieAttributes {
    pub path: &'static str,
    pub max_age_secs: u64,
    pub same_site_strict: bool,
    pub secure: bool,
}

impl CookieAttributes {
    /// Attributes used for the session cookie: path `/`, `SameSite=Strict`,
    /// `Secure`, expiry matching the session timeout.
    pub fn session(max_age_secs: u64) -> Self {
        Self {
            path: "/",
            max_age_secs,
            same_site_strict: true,
            secure: true,
        }
    }
}

/// Read and decrypt the session cookie. Fail closed.
pub fn read_session(jar: &dyn CookieJar, codec: &SecureCodec) -> Option<SessionIdentity> {
    let blob = jar.get(SESSION_COOKIE_NAME)?;
    codec.decrypt_json(&blob)
}

/// Encrypt and write the session cookie with a renewed expiry.
pub fn write_session(
    jar: &mut dyn CookieJar,
    codec: &SecureCodec,
    identity: &SessionIdentity,
    max_age_secs: u64,
) -> Result<(), AppError> {
    let blob = codec.encrypt_json(identity)?;
    jar.set(
        SESSION_COOKIE_NAME,
        &blob,
        &CookieAttributes::session(max_age_secs),
    )?;
    Ok(())
}

/// Remove the session cookie.
pub fn clear_session(jar: &mut dyn CookieJar) -> StoreResult {
    jar.remove(SESSION_COOKIE_NAME)
}
