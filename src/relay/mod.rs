//! WebSocket Relay
//!
//! Best-effort, in-memory, single-process message relay. Clients announce a
//! `sender_id` to register themselves and address each other by
//! `receiver_id`; the relay forwards matching frames verbatim and never
//! interprets the rest of the payload. Half-open connections are reaped by
//! a ping/pong heartbeat.

pub mod handler;
pub mod messages;
pub mod registry;
pub mod routes;

pub use handler::ws_handler;
pub use messages::{ClientFrame, ServerFrame};
pub use registry::ClientRegistry;
