//! Conversion logic between DTOs and domain types.

use thiserror::Error;

use crate::domain::{
    DEFAULT_SPIN_DURATION_SECS, DEFAULT_SPIN_SPEED, MotionCommand, Odometry, PoseSample,
    Quaternion, SpeedScalar, VelocityCommand,
};
use crate::infrastructure::dto::{robot, websocket as dto};

/// Why an inbound frame was ignored
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    #[error("message has no string 'type' field")]
    MissingType,

    #[error("unknown message type '{0}'")]
    UnknownType(String),

    #[error("invalid '{kind}' message: {reason}")]
    InvalidField { kind: &'static str, reason: String },
}

/// Decode one operator text frame into a command.
pub fn decode_command(text: &str) -> Result<MotionCommand, DecodeError> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| DecodeError::InvalidJson(e.to_string()))?;
    let kind = value
        .get("type")
        .and_then(|t| t.as_str())
        .ok_or(DecodeError::MissingType)?
        .to_owned();

    match kind.as_str() {
        "move" => serde_json::from_value::<dto::MoveMessage>(value)
            .map(MotionCommand::from)
            .map_err(|e| invalid_field("move", e)),
        "stop" => Ok(MotionCommand::Stop),
        "spin" => serde_json::from_value::<dto::SpinMessage>(value)
            .map_err(|e| invalid_field("spin", e))
            .and_then(MotionCommand::try_from),
        _ => Err(DecodeError::UnknownType(kind)),
    }
}

fn invalid_field(kind: &'static str, error: serde_json::Error) -> DecodeError {
    DecodeError::InvalidField {
        kind,
        reason: error.to_string(),
    }
}

// ========================================
// DTO → Domain
// ========================================

impl From<dto::MoveMessage> for MotionCommand {
    fn from(dto: dto::MoveMessage) -> Self {
        MotionCommand::Move {
            linear_x: dto.linear_x.unwrap_or(0.0),
            angular_z: dto.angular_z.unwrap_or(0.0),
            speed: dto.speed.map(SpeedScalar::new),
        }
    }
}

impl TryFrom<dto::SpinMessage> for MotionCommand {
    type Error = DecodeError;

    fn try_from(dto: dto::SpinMessage) -> Result<Self, Self::Error> {
        let angular_speed = dto.angular_speed.unwrap_or(DEFAULT_SPIN_SPEED);
        let duration_secs = dto.duration.unwrap_or(DEFAULT_SPIN_DURATION_SECS);
        if !duration_secs.is_finite() || duration_secs <= 0.0 {
            return Err(DecodeError::InvalidField {
                kind: "spin",
                reason: format!("duration must be positive, got {}", duration_secs),
            });
        }
        if !angular_speed.is_finite() {
            return Err(DecodeError::InvalidField {
                kind: "spin",
                reason: "angular_speed must be finite".to_string(),
            });
        }
        Ok(MotionCommand::Spin {
            angular_speed,
            duration_secs,
        })
    }
}

impl From<&robot::OdometryMessage> for Odometry {
    fn from(dto: &robot::OdometryMessage) -> Self {
        Self {
            x: dto.x,
            y: dto.y,
            orientation: Quaternion {
                x: dto.orientation.x,
                y: dto.orientation.y,
                z: dto.orientation.z,
                w: dto.orientation.w,
            },
        }
    }
}

// ========================================
// Domain → DTO
// ========================================

impl From<PoseSample> for dto::PoseUpdateMessage {
    fn from(sample: PoseSample) -> Self {
        Self {
            r#type: dto::MessageType::PoseUpdate,
            x: sample.x,
            y: sample.y,
            yaw: sample.yaw,
        }
    }
}

impl From<VelocityCommand> for robot::TwistCommandMessage {
    fn from(command: VelocityCommand) -> Self {
        Self {
            r#type: robot::RobotMessageType::TwistCommand,
            linear_x: command.linear_x,
            angular_z: command.angular_z,
        }
    }
}

impl From<&Odometry> for robot::OdometryMessage {
    fn from(odometry: &Odometry) -> Self {
        Self {
            r#type: robot::RobotMessageType::Odometry,
            x: odometry.x,
            y: odometry.y,
            orientation: robot::QuaternionDto {
                x: odometry.orientation.x,
                y: odometry.orientation.y,
                z: odometry.orientation.z,
                w: odometry.orientation.w,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_move_keeps_values() {
        // テスト項目: move の linear_x / angular_z が変換なしで取り出される
        // given (前提条件):
        let text = r#"{"type":"move","linear_x":0.42,"angular_z":-1.1}"#;

        // when (操作):
        let command = decode_command(text);

        // then (期待する結果):
        assert_eq!(
            command,
            Ok(MotionCommand::Move {
                linear_x: 0.42,
                angular_z: -1.1,
                speed: None
            })
        );
    }

    #[test]
    fn test_decode_move_missing_fields_default_to_zero() {
        // テスト項目: 数値フィールドが欠けた move は 0 として扱われる
        // given (前提条件):
        let missing = r#"{"type":"move"}"#;
        let null = r#"{"type":"move","linear_x":null,"angular_z":0.5,"speed":0.3}"#;

        // when (操作):
        let missing = decode_command(missing);
        let null = decode_command(null);

        // then (期待する結果):
        assert_eq!(
            missing,
            Ok(MotionCommand::Move {
                linear_x: 0.0,
                angular_z: 0.0,
                speed: None
            })
        );
        assert_eq!(
            null,
            Ok(MotionCommand::Move {
                linear_x: 0.0,
                angular_z: 0.5,
                speed: Some(SpeedScalar::new(0.3))
            })
        );
    }

    #[test]
    fn test_decode_stop_ignores_extra_fields() {
        // テスト項目: stop は余分なフィールドがあっても Stop になる
        // given (前提条件):
        let text = r#"{"type":"stop","linear_x":3.0}"#;

        // when (操作):
        let command = decode_command(text);

        // then (期待する結果):
        assert_eq!(command, Ok(MotionCommand::Stop));
    }

    #[test]
    fn test_decode_spin_with_and_without_fields() {
        // テスト項目: spin は指定値、欠けていればデフォルト (2.0 rad/s, 5.0 s) になる
        // given (前提条件):
        let full = r#"{"type":"spin","angular_speed":-2.5,"duration":8.0}"#;
        let empty = r#"{"type":"spin"}"#;

        // when (操作):
        let full = decode_command(full);
        let empty = decode_command(empty);

        // then (期待する結果):
        assert_eq!(
            full,
            Ok(MotionCommand::Spin {
                angular_speed: -2.5,
                duration_secs: 8.0
            })
        );
        assert_eq!(
            empty,
            Ok(MotionCommand::Spin {
                angular_speed: DEFAULT_SPIN_SPEED,
                duration_secs: DEFAULT_SPIN_DURATION_SECS
            })
        );
    }

    #[test]
    fn test_decode_spin_rejects_non_positive_duration() {
        // テスト項目: duration が 0 以下の spin はプロトコルエラー
        // given (前提条件):
        let zero = r#"{"type":"spin","angular_speed":1.0,"duration":0}"#;
        let negative = r#"{"type":"spin","duration":-3}"#;

        // when (操作):

        // then (期待する結果):
        assert!(matches!(
            decode_command(zero),
            Err(DecodeError::InvalidField { kind: "spin", .. })
        ));
        assert!(matches!(
            decode_command(negative),
            Err(DecodeError::InvalidField { kind: "spin", .. })
        ));
    }

    #[test]
    fn test_decode_errors() {
        // テスト項目: 壊れた JSON / type なし / 未知の type / 型違いをそれぞれ区別する
        // given (前提条件):

        // when (操作):
        let not_json = decode_command("forward!");
        let no_type = decode_command(r#"{"linear_x":1.0}"#);
        let not_object = decode_command("[1,2,3]");
        let unknown = decode_command(r#"{"type":"dance"}"#);
        let wrong_type = decode_command(r#"{"type":"move","linear_x":"fast"}"#);

        // then (期待する結果):
        assert!(matches!(not_json, Err(DecodeError::InvalidJson(_))));
        assert_eq!(no_type, Err(DecodeError::MissingType));
        assert_eq!(not_object, Err(DecodeError::MissingType));
        assert_eq!(unknown, Err(DecodeError::UnknownType("dance".to_string())));
        assert!(matches!(
            wrong_type,
            Err(DecodeError::InvalidField { kind: "move", .. })
        ));
    }

    #[test]
    fn test_pose_update_wire_format() {
        // テスト項目: pose_update が {"type":"pose_update","x","y","yaw"} としてシリアライズされる
        // given (前提条件):
        let sample = PoseSample {
            x: 1.0,
            y: 2.0,
            yaw: 0.5,
        };

        // when (操作):
        let json = serde_json::to_value(dto::PoseUpdateMessage::from(sample)).unwrap();

        // then (期待する結果):
        assert_eq!(
            json,
            serde_json::json!({"type": "pose_update", "x": 1.0, "y": 2.0, "yaw": 0.5})
        );
    }

    #[test]
    fn test_status_wire_format() {
        // テスト項目: status メッセージのワイヤ形式
        // given (前提条件):
        let status = dto::StatusMessage::new(true);

        // when (操作):
        let json = serde_json::to_value(status).unwrap();

        // then (期待する結果):
        assert_eq!(json, serde_json::json!({"type": "status", "connected": true}));
    }

    #[test]
    fn test_robot_messages() {
        // テスト項目: ロボット向け twist_command と odometry の変換
        // given (前提条件):
        let odometry_json = r#"{"type":"odometry","x":0.5,"y":-1.0,"orientation":{"x":0.0,"y":0.0,"z":0.0,"w":1.0}}"#;

        // when (操作):
        let twist = serde_json::to_value(robot::TwistCommandMessage::from(
            VelocityCommand::new(0.2, -0.4),
        ))
        .unwrap();
        let message: robot::OdometryMessage = serde_json::from_str(odometry_json).unwrap();
        let odometry = Odometry::from(&message);

        // then (期待する結果):
        assert_eq!(
            twist,
            serde_json::json!({"type": "twist_command", "linear_x": 0.2, "angular_z": -0.4})
        );
        assert_eq!(odometry.x, 0.5);
        assert_eq!(odometry.y, -1.0);
        assert_eq!(odometry.orientation, Quaternion::identity());
    }
}
