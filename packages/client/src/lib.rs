//! Operator console for teleop-bridge.
//!
//! Reads driving commands from a terminal prompt, sends them to the bridge
//! over WebSocket and prints the robot's pose as it comes back.

pub mod command;
pub mod error;
pub mod formatter;
mod runner;
pub mod session;
mod ui;

pub use runner::run_client;
