//! Infrastructure layer: wire formats, the session registry and robot links.

pub mod dto;
pub mod message_pusher;
pub mod repository;
pub mod robot;
