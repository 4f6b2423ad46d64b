//! Entities of the teleop bridge domain.

use super::value_object::{SessionId, SpeedScalar, Timestamp};

/// Lifecycle state of an operator connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Handshake accepted, protocol upgrade pending
    Connecting,
    Open,
    Closed,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Connecting => "connecting",
            ConnectionState::Open => "open",
            ConnectionState::Closed => "closed",
        }
    }
}

/// One operator's bridge connection.
///
/// Owned by the session registry; inserted on handshake and removed on teardown.
#[derive(Debug, Clone, PartialEq)]
pub struct OperatorSession {
    pub id: SessionId,
    pub state: ConnectionState,
    pub speed: SpeedScalar,
    pub connected_at: Timestamp,
}

impl OperatorSession {
    pub fn new(id: SessionId, connected_at: Timestamp) -> Self {
        Self {
            id,
            state: ConnectionState::Connecting,
            speed: SpeedScalar::default(),
            connected_at,
        }
    }

    pub fn open(&mut self) {
        if self.state == ConnectionState::Connecting {
            self.state = ConnectionState::Open;
        }
    }

    pub fn close(&mut self) {
        self.state = ConnectionState::Closed;
    }

    pub fn is_open(&self) -> bool {
        self.state == ConnectionState::Open
    }

    pub fn set_speed(&mut self, speed: SpeedScalar) {
        self.speed = speed;
    }
}

/// A decoded operator command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionCommand {
    Move {
        linear_x: f64,
        angular_z: f64,
        /// Speed scalar the operator UI was using; recorded on the session only
        speed: Option<SpeedScalar>,
    },
    Stop,
    Spin {
        /// Signed, rad/s
        angular_speed: f64,
        /// Seconds, finite and positive
        duration_secs: f64,
    },
}

impl MotionCommand {
    pub fn kind(&self) -> &'static str {
        match self {
            MotionCommand::Move { .. } => "move",
            MotionCommand::Stop => "stop",
            MotionCommand::Spin { .. } => "spin",
        }
    }
}
