//! API Tests
//!
//! HTTP and WebSocket tests, organized by surface.

mod health_tests;
mod relay_tests;
