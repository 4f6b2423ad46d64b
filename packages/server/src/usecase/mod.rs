//! UseCase 層
//!
//! The bridge's behaviour: encoding velocities, running spins, relaying poses
//! and owning each operator session from connect to teardown.

mod connect_operator;
mod disconnect_operator;
mod dispatch_command;
pub mod error;
mod get_bridge_status;
mod pose_relay;
pub mod session_motion;
pub mod spin_controller;
pub mod velocity_encoder;

pub use connect_operator::ConnectOperatorUseCase;
pub use disconnect_operator::DisconnectOperatorUseCase;
pub use dispatch_command::DispatchCommandUseCase;
pub use error::{ConnectError, DisconnectError, EncodeError};
pub use get_bridge_status::{BridgeStatus, GetBridgeStatusUseCase};
pub use pose_relay::PoseRelay;
pub use session_motion::SessionMotion;
pub use spin_controller::{SpinConfig, SpinController, SpinTask};
pub use velocity_encoder::VelocityEncoder;
