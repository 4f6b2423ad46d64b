//! Message formatting utilities for console display.

use teleop_bridge::domain::SpeedScalar;

/// Message formatter for console display
pub struct MessageFormatter;

impl MessageFormatter {
    pub fn format_status(connected: bool) -> String {
        let state = if connected { "connected" } else { "disconnected" };
        format!("\n[bridge] robot {}\n", state)
    }

    /// Format a pose update. Yaw arrives in radians and is shown in degrees.
    pub fn format_pose(x: f64, y: f64, yaw: f64) -> String {
        format!(
            "\n[pose] x={:.2} m  y={:.2} m  yaw={:.1}°\n",
            x,
            y,
            yaw.to_degrees()
        )
    }

    pub fn format_speed(speed: SpeedScalar) -> String {
        format!("speed set to {:.0}%\n", speed.value() * 100.0)
    }

    pub fn format_raw_message(text: &str) -> String {
        format!("\n{}\n", text)
    }

    pub fn format_help() -> String {
        [
            "commands:",
            "  w / s            forward / backward",
            "  a / d            turn left / right",
            "  x, stop          stop",
            "  spin [rad/s] [s] spin in place",
            "  speed <0..1>     scale for w/s/a/d",
            "  help             this text",
            "  quit             leave",
            "",
        ]
        .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_format_pose_in_degrees() {
        // テスト項目: yaw はラジアンから度に変換して表示される
        // given (前提条件):
        let yaw = PI / 2.0;

        // when (操作):
        let text = MessageFormatter::format_pose(1.234, -0.5, yaw);

        // then (期待する結果):
        assert_eq!(text, "\n[pose] x=1.23 m  y=-0.50 m  yaw=90.0°\n");
    }

    #[test]
    fn test_format_status() {
        // テスト項目: ロボット接続状態の表示
        // given (前提条件):

        // when (操作):
        let up = MessageFormatter::format_status(true);
        let down = MessageFormatter::format_status(false);

        // then (期待する結果):
        assert!(up.contains("robot connected"));
        assert!(down.contains("robot disconnected"));
    }

    #[test]
    fn test_format_speed() {
        // テスト項目: 速度スカラーはパーセントで表示される
        // given (前提条件):
        let speed = SpeedScalar::new(0.75);

        // when (操作):
        let text = MessageFormatter::format_speed(speed);

        // then (期待する結果):
        assert_eq!(text, "speed set to 75%\n");
    }
}
