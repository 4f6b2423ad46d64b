//! Spin maneuver profile.
//!
//! A spin runs at full angular speed for the first `full_speed_ratio` of its
//! duration, then eases out quadratically to zero:
//!
//! ```text
//! elapsed <  r*D        angular_z = S
//! r*D <= elapsed < D    angular_z = S * (1 - p^2),  p = (elapsed - r*D) / ((1 - r) * D)
//! elapsed >= D          finished, (0, 0)
//! ```
//!
//! Everything here is pure; the tick loop lives in `usecase::spin_controller`.

use std::time::Duration;

use super::value_object::VelocityCommand;

/// Fraction of the duration spent at full speed
pub const DEFAULT_FULL_SPEED_RATIO: f64 = 0.8;

/// Fallback values for fields missing from a `spin` request
pub const DEFAULT_SPIN_SPEED: f64 = 2.0;
pub const DEFAULT_SPIN_DURATION_SECS: f64 = 5.0;

/// Where a spin is on its timeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpinPhase {
    FullSpeed,
    /// `progress` is `p` in `[0, 1)`
    Decelerating {
        progress: f64,
    },
    Finished,
}

/// Lifecycle of a spin task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinState {
    Idle,
    FullSpeed,
    Decelerating,
    Terminal,
}

impl SpinState {
    pub fn is_running(&self) -> bool {
        matches!(self, SpinState::FullSpeed | SpinState::Decelerating)
    }
}

impl From<SpinPhase> for SpinState {
    fn from(phase: SpinPhase) -> Self {
        match phase {
            SpinPhase::FullSpeed => SpinState::FullSpeed,
            SpinPhase::Decelerating { .. } => SpinState::Decelerating,
            SpinPhase::Finished => SpinState::Terminal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinProfile {
    angular_speed: f64,
    duration: Duration,
    full_speed_ratio: f64,
}

impl SpinProfile {
    pub fn new(angular_speed: f64, duration: Duration) -> Self {
        Self::with_ratio(angular_speed, duration, DEFAULT_FULL_SPEED_RATIO)
    }

    pub fn with_ratio(angular_speed: f64, duration: Duration, full_speed_ratio: f64) -> Self {
        let full_speed_ratio = if full_speed_ratio.is_finite() {
            full_speed_ratio.clamp(0.0, 1.0)
        } else {
            DEFAULT_FULL_SPEED_RATIO
        };
        Self {
            angular_speed,
            duration,
            full_speed_ratio,
        }
    }

    pub fn angular_speed(&self) -> f64 {
        self.angular_speed
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn full_speed_ratio(&self) -> f64 {
        self.full_speed_ratio
    }

    /// +1 or -1; 0 for a zero-speed spin
    pub fn direction(&self) -> f64 {
        if self.angular_speed > 0.0 {
            1.0
        } else if self.angular_speed < 0.0 {
            -1.0
        } else {
            0.0
        }
    }

    pub fn magnitude(&self) -> f64 {
        self.angular_speed.abs()
    }

    pub fn phase_at(&self, elapsed: Duration) -> SpinPhase {
        let total = self.duration.as_secs_f64();
        let t = elapsed.as_secs_f64();
        if t >= total {
            return SpinPhase::Finished;
        }

        let full_speed_until = self.full_speed_ratio * total;
        if t < full_speed_until {
            return SpinPhase::FullSpeed;
        }

        let decel_len = (1.0 - self.full_speed_ratio) * total;
        let progress = if decel_len > 0.0 {
            ((t - full_speed_until) / decel_len).clamp(0.0, 1.0)
        } else {
            1.0
        };
        if progress >= 1.0 {
            SpinPhase::Finished
        } else {
            SpinPhase::Decelerating { progress }
        }
    }

    pub fn command_for(&self, phase: SpinPhase) -> VelocityCommand {
        match phase {
            SpinPhase::FullSpeed => VelocityCommand::new(0.0, self.angular_speed),
            SpinPhase::Decelerating { progress } => {
                VelocityCommand::new(0.0, self.angular_speed * (1.0 - progress * progress))
            }
            SpinPhase::Finished => VelocityCommand::stop(),
        }
    }

    pub fn command_at(&self, elapsed: Duration) -> VelocityCommand {
        self.command_for(self.phase_at(elapsed))
    }
}
