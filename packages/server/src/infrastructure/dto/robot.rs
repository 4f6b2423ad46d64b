//! Messages exchanged with a remote robot agent over the relay link.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RobotMessageType {
    TwistCommand,
    Odometry,
}

/// Bridge -> robot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwistCommandMessage {
    pub r#type: RobotMessageType,
    pub linear_x: f64,
    pub angular_z: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuaternionDto {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

/// Robot -> bridge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OdometryMessage {
    pub r#type: RobotMessageType,
    pub x: f64,
    pub y: f64,
    pub orientation: QuaternionDto,
}
