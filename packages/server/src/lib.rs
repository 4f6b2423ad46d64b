//! Teleoperation bridge library.
//!
//! Relays operator commands from a browser WebSocket to a mobile robot's
//! velocity topic and relays the robot's pose back, rate-limited.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

// wiring
pub mod app;
pub mod config;

#[cfg(test)]
pub(crate) mod test_support;
