//! Console command parsing.
//!
//! | input                      | frame sent                                   |
//! |----------------------------|----------------------------------------------|
//! | `w` / `s`                  | `move` forward / backward at `speed`         |
//! | `a` / `d`                  | `move` turning left / right at `speed`       |
//! | `x`, `stop`                | `stop`                                       |
//! | `spin [rad/s] [seconds]`   | `spin`, missing values left to the bridge    |
//! | `speed <0..1>`             | nothing; scales the following moves          |

use teleop_bridge::{
    domain::SpeedScalar,
    infrastructure::dto::websocket::{MessageType, MoveMessage, SpinMessage, StopMessage},
};
use thiserror::Error;

/// Linear speed at full scale (m/s)
pub const BASE_LINEAR_X: f64 = 1.0;
/// Angular speed at full scale (rad/s)
pub const BASE_ANGULAR_Z: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConsoleCommand {
    Forward,
    Backward,
    Left,
    Right,
    Stop,
    Spin {
        angular_speed: Option<f64>,
        duration: Option<f64>,
    },
    Speed(SpeedScalar),
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command '{0}' (type 'help')")]
    Unknown(String),

    #[error("invalid argument '{value}' for '{command}'")]
    InvalidArgument {
        command: &'static str,
        value: String,
    },

    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),
}

impl ConsoleCommand {
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Err(CommandError::Unknown(String::new()));
        };

        match head.to_ascii_lowercase().as_str() {
            "w" => Ok(Self::Forward),
            "s" => Ok(Self::Backward),
            "a" => Ok(Self::Left),
            "d" => Ok(Self::Right),
            "x" | "stop" => Ok(Self::Stop),
            "spin" => Ok(Self::Spin {
                angular_speed: words.next().map(|v| number("spin", v)).transpose()?,
                duration: words.next().map(|v| number("spin", v)).transpose()?,
            }),
            "speed" => {
                let value = words.next().ok_or(CommandError::MissingArgument("speed"))?;
                Ok(Self::Speed(SpeedScalar::new(number("speed", value)?)))
            }
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            _ => Err(CommandError::Unknown(head.to_string())),
        }
    }

    /// JSON frame for the bridge, if this command sends one.
    pub fn to_frame(&self, speed: SpeedScalar) -> Option<String> {
        let scale = speed.value();
        let moving = |linear_x: f64, angular_z: f64| {
            serde_json::to_string(&MoveMessage {
                r#type: MessageType::Move,
                linear_x: Some(linear_x),
                angular_z: Some(angular_z),
                speed: Some(scale),
            })
        };

        let frame = match *self {
            Self::Forward => moving(BASE_LINEAR_X * scale, 0.0),
            Self::Backward => moving(-BASE_LINEAR_X * scale, 0.0),
            Self::Left => moving(0.0, BASE_ANGULAR_Z * scale),
            Self::Right => moving(0.0, -BASE_ANGULAR_Z * scale),
            Self::Stop => serde_json::to_string(&StopMessage {
                r#type: MessageType::Stop,
            }),
            Self::Spin {
                angular_speed,
                duration,
            } => serde_json::to_string(&SpinMessage {
                r#type: MessageType::Spin,
                angular_speed,
                duration,
            }),
            Self::Speed(_) | Self::Help | Self::Quit => return None,
        };
        frame.ok()
    }
}

fn number(command: &'static str, value: &str) -> Result<f64, CommandError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| CommandError::InvalidArgument {
            command,
            value: value.to_string(),
        })
}
