//! WebSocket message DTOs exchanged with the operator UI.

use serde::{Deserialize, Serialize};

/// Message type discriminator carried in every frame's `type` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Move,
    Stop,
    Spin,
    Status,
    PoseUpdate,
}

// ========================================
// Operator -> Bridge
// ========================================

/// `{"type":"move","linear_x":..,"angular_z":..}`; missing numbers mean 0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveMessage {
    pub r#type: MessageType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linear_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angular_z: Option<f64>,
    /// UI speed scalar (0..1)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopMessage {
    pub r#type: MessageType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinMessage {
    pub r#type: MessageType,
    /// rad/s, signed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angular_speed: Option<f64>,
    /// seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

// ========================================
// Bridge -> Operator
// ========================================

/// Sent once right after the upgrade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub r#type: MessageType,
    /// Whether the robot link is up
    pub connected: bool,
}

impl StatusMessage {
    pub fn new(connected: bool) -> Self {
        Self {
            r#type: MessageType::Status,
            connected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseUpdateMessage {
    pub r#type: MessageType,
    pub x: f64,
    pub y: f64,
    /// radians
    pub yaw: f64,
}
