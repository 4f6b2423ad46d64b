//! Utilities shared by the teleop bridge server and the operator console.

pub mod logger;
pub mod time;
