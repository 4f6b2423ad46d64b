//! Bridge configuration.
//!
//! Built by the binary from its command line / environment and checked with
//! [`BridgeConfig::validate`] before anything is started.

use std::{ops::RangeInclusive, time::Duration};

use thiserror::Error;

use crate::{domain::SafetyEnvelope, usecase::SpinConfig};

/// Accepted spin tick rates in Hz
pub const SPIN_TICK_HZ_RANGE: RangeInclusive<f64> = 1.0..=100.0;
/// Accepted pose relay rates in Hz
pub const POSE_RELAY_HZ_RANGE: RangeInclusive<f64> = 1.0..=50.0;

/// Where velocity commands go and odometry comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum RobotBackend {
    /// In-process unicycle simulator
    #[default]
    Sim,
    /// WebSocket agent next to the robot runtime
    Relay,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be a positive number, got {value}")]
    NotPositive { name: &'static str, value: f64 },

    #[error("{name} must be between {min} and {max}, got {value}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("max_sessions must be at least 1")]
    NoSessions,

    #[error("the relay backend needs a robot URL")]
    MissingRobotUrl,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BridgeConfig {
    pub host: String,
    pub port: u16,
    pub robot_backend: RobotBackend,
    pub robot_url: Option<String>,
    pub max_sessions: usize,
    pub spin_tick_hz: f64,
    pub pose_relay_hz: f64,
    pub max_linear_x: f64,
    pub max_angular_z: f64,
    pub max_spin_duration_secs: f64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            robot_backend: RobotBackend::Sim,
            robot_url: None,
            max_sessions: 1,
            spin_tick_hz: 20.0,
            pose_relay_hz: 10.0,
            max_linear_x: SafetyEnvelope::DEFAULT_MAX_LINEAR_X,
            max_angular_z: SafetyEnvelope::DEFAULT_MAX_ANGULAR_Z,
            max_spin_duration_secs: 30.0,
        }
    }
}

impl BridgeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("spin_tick_hz", self.spin_tick_hz),
            ("pose_relay_hz", self.pose_relay_hz),
            ("max_linear_x", self.max_linear_x),
            ("max_angular_z", self.max_angular_z),
            ("max_spin_duration", self.max_spin_duration_secs),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::NotPositive { name, value });
            }
        }
        for (name, value, range) in [
            ("spin_tick_hz", self.spin_tick_hz, SPIN_TICK_HZ_RANGE),
            ("pose_relay_hz", self.pose_relay_hz, POSE_RELAY_HZ_RANGE),
        ] {
            if !range.contains(&value) {
                return Err(ConfigError::OutOfRange {
                    name,
                    value,
                    min: *range.start(),
                    max: *range.end(),
                });
            }
        }
        if self.max_sessions == 0 {
            return Err(ConfigError::NoSessions);
        }
        if self.robot_backend == RobotBackend::Relay && self.robot_url.is_none() {
            return Err(ConfigError::MissingRobotUrl);
        }
        Ok(())
    }

    pub fn envelope(&self) -> SafetyEnvelope {
        SafetyEnvelope::new(self.max_linear_x, self.max_angular_z)
    }

    pub fn spin_config(&self) -> SpinConfig {
        let defaults = SpinConfig::default();
        SpinConfig {
            tick_interval: period(self.spin_tick_hz).unwrap_or(defaults.tick_interval),
            max_duration: Duration::try_from_secs_f64(self.max_spin_duration_secs)
                .unwrap_or(defaults.max_duration),
            ..defaults
        }
    }

    pub fn pose_relay_interval(&self) -> Duration {
        period(self.pose_relay_hz).unwrap_or(Duration::from_millis(100))
    }
}

fn period(hz: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(1.0 / hz).ok()
}
