//! Value objects for the teleop bridge domain.
//!
//! 不変で、値によって等価性が決まるオブジェクト群。

use std::{f64::consts::PI, fmt};

use uuid::Uuid;

/// Identifier of one operator session (UUID v4)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a fresh random session id
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unix timestamp in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// Operator-selected speed scalar in `[0.0, 1.0]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedScalar(f64);

impl SpeedScalar {
    pub const DEFAULT: f64 = 0.5;

    /// Clamp into `[0.0, 1.0]`; non-finite input falls back to the default.
    pub fn new(value: f64) -> Self {
        if value.is_finite() {
            Self(value.clamp(0.0, 1.0))
        } else {
            Self(Self::DEFAULT)
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for SpeedScalar {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

/// Velocity command published on the robot's control topic.
///
/// `linear_x` is forward velocity in m/s, `angular_z` is yaw rate in rad/s.
/// The topic is "latest wins", so publishing the same value twice is harmless.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VelocityCommand {
    pub linear_x: f64,
    pub angular_z: f64,
}

impl VelocityCommand {
    pub fn new(linear_x: f64, angular_z: f64) -> Self {
        Self {
            linear_x,
            angular_z,
        }
    }

    /// Zero velocity (stop)
    pub fn stop() -> Self {
        Self::default()
    }

    pub fn is_stop(&self) -> bool {
        self.linear_x == 0.0 && self.angular_z == 0.0
    }
}

/// Symmetric bounds every published velocity is clamped into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SafetyEnvelope {
    pub max_linear_x: f64,
    pub max_angular_z: f64,
}

impl SafetyEnvelope {
    pub const DEFAULT_MAX_LINEAR_X: f64 = 2.0;
    pub const DEFAULT_MAX_ANGULAR_Z: f64 = 6.0;

    pub fn new(max_linear_x: f64, max_angular_z: f64) -> Self {
        Self {
            max_linear_x: max_linear_x.abs(),
            max_angular_z: max_angular_z.abs(),
        }
    }

    pub fn clamp_linear(&self, linear_x: f64) -> f64 {
        clamp_symmetric(linear_x, self.max_linear_x)
    }

    pub fn clamp_angular(&self, angular_z: f64) -> f64 {
        clamp_symmetric(angular_z, self.max_angular_z)
    }

    pub fn clamp(&self, command: VelocityCommand) -> VelocityCommand {
        VelocityCommand::new(
            self.clamp_linear(command.linear_x),
            self.clamp_angular(command.angular_z),
        )
    }
}

impl Default for SafetyEnvelope {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_LINEAR_X, Self::DEFAULT_MAX_ANGULAR_Z)
    }
}

// NaN and infinities collapse to 0 so nothing undefined reaches the robot.
fn clamp_symmetric(value: f64, bound: f64) -> f64 {
    if value.is_finite() {
        value.clamp(-bound, bound)
    } else {
        0.0
    }
}

/// Orientation quaternion as delivered by the robot's odometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Quaternion {
    pub fn identity() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            w: 1.0,
        }
    }

    /// Pure rotation about the z axis
    pub fn from_yaw(yaw: f64) -> Self {
        let half = yaw / 2.0;
        Self {
            x: 0.0,
            y: 0.0,
            z: half.sin(),
            w: half.cos(),
        }
    }

    /// Yaw (rotation about z) in radians, in `(-PI, PI]`.
    pub fn yaw(&self) -> f64 {
        let siny_cosp = 2.0 * (self.w * self.z + self.x * self.y);
        let cosy_cosp = 1.0 - 2.0 * (self.y * self.y + self.z * self.z);
        siny_cosp.atan2(cosy_cosp)
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::identity()
    }
}

/// One odometry message from the robot runtime
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Odometry {
    pub x: f64,
    pub y: f64,
    pub orientation: Quaternion,
}

/// Operator-facing projection of the latest odometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseSample {
    pub x: f64,
    pub y: f64,
    /// Radians. Conversion to degrees is left to the operator UI.
    pub yaw: f64,
}

impl From<&Odometry> for PoseSample {
    fn from(odometry: &Odometry) -> Self {
        Self {
            x: odometry.x,
            y: odometry.y,
            yaw: odometry.orientation.yaw(),
        }
    }
}

/// Wrap an angle into `(-PI, PI]`.
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = angle.sin().atan2(angle.cos());
    if wrapped == -PI { PI } else { wrapped }
}
