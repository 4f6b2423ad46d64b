//! Data Transfer Objects (DTOs) for the teleop bridge.
//!
//! DTOs are organized by protocol:
//! - `websocket`: operator <-> bridge messages
//! - `http`: HTTP API response DTOs
//! - `robot`: bridge <-> remote robot agent messages

pub mod conversion;
pub mod http;
pub mod robot;
pub mod websocket;

pub use conversion::{DecodeError, decode_command};
