//! # ReserveLink
//!
//! Realtime relay and session lifecycle services for the reservation
//! admin console:
//!
//! - A WebSocket **relay server** that registers identified clients and
//!   forwards point-to-point JSON messages between them, with ping/pong
//!   heartbeat reaping of half-open connections.
//! - A deterministic **session lifecycle manager** modelling inactivity
//!   tracking, the expiry-warning countdown and idempotent logout, with
//!   every suspension point (clock, timers, storage, cookies, UI) injected
//!   as a trait so the whole machine is testable with fakes.
//! - A shared **secure storage codec** (AES-256-GCM) used for the session
//!   cookie blob and every persisted key-value entry.
//!
//! ## Module Structure
//!
//! ```text
//! reservelink/
//! +-- config/    Configuration management
//! +-- relay/     WebSocket relay: wire frames, registry, handler, routes
//! +-- session/   Session lifecycle: clock, timers, storage, cookie, manager
//! +-- shared/    Common utilities (errors, secure codec)
//! +-- startup    Application startup and state management
//! +-- telemetry  Structured logging setup
//! ```

// Configuration module
pub mod config;

// WebSocket relay server
pub mod relay;

// Browser-side session lifecycle model
pub mod session;

// Shared utilities
pub mod shared;

// Application startup and state management
pub mod startup;

// Telemetry and observability
pub mod telemetry;
