//! Robot link implementations
//!
//! - `simulated`: in-process unicycle model, for development without hardware
//! - `relay`: WebSocket client to an agent running next to the robot runtime

pub mod relay;
pub mod simulated;

pub use relay::RelayRobotLink;
pub use simulated::SimulatedRobotLink;
