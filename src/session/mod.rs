//! Session Lifecycle
//!
//! Deterministic model of the console's browser-side session handling:
//! inactivity tracking, the expiry-warning countdown, the encrypted
//! `userSession` cookie, and idempotent logout. The whole machine runs on
//! one cooperative thread of execution; clock, timers, storage, cookies
//! and UI are injected as traits so every suspension point can be driven
//! by fakes in tests.

pub mod clock;
pub mod cookie;
pub mod manager;
pub mod storage;
pub mod timer;

#[cfg(test)]
pub(crate) mod support;

pub use clock::{Clock, SystemClock};
pub use cookie::{CookieAttributes, SessionIdentity, SESSION_COOKIE_NAME};
pub use manager::{ActivityEvent, ActivityKind, LogoutReason, SessionConfig, SessionManager, SessionUi};
pub use storage::{CookieJar, KeyValueStore, MemoryCookieJar, MemoryStore, SecureStore};
pub use timer::{Debounce, Scheduler, TimerId};
