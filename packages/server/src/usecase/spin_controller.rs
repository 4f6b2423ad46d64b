//! Spin Maneuver Controller
//!
//! Each spin runs in its own tokio task and re-emits the profile's velocity
//! every tick, because the control topic neither retains nor interpolates.
//!
//! The task's state sits behind a mutex that is also held while publishing.
//! A tick checks the state under that lock before it publishes, and `cancel`
//! flips the state and publishes the final stop under the same lock, so once
//! `cancel` returns no tick of that spin can reach the topic.

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::Mutex,
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};

use crate::domain::{DEFAULT_FULL_SPEED_RATIO, SpinPhase, SpinProfile, SpinState};

use super::velocity_encoder::VelocityEncoder;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinConfig {
    pub tick_interval: Duration,
    pub full_speed_ratio: f64,
    /// Longest spin the bridge will run; longer requests are shortened
    pub max_duration: Duration,
}

impl Default for SpinConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(50),
            full_speed_ratio: DEFAULT_FULL_SPEED_RATIO,
            max_duration: Duration::from_secs(30),
        }
    }
}

#[derive(Clone)]
pub struct SpinController {
    encoder: VelocityEncoder,
    config: SpinConfig,
}

impl SpinController {
    pub fn new(encoder: VelocityEncoder, config: SpinConfig) -> Self {
        Self { encoder, config }
    }

    /// Build a profile with the server-side bounds applied.
    ///
    /// The speed is clamped to the encoder's angular limit and the duration to
    /// `max_duration`. Callers are expected to have rejected non-positive or
    /// non-finite durations already; those collapse to an immediate stop here.
    pub fn profile(&self, angular_speed: f64, duration_secs: f64) -> SpinProfile {
        let angular_speed = self.encoder.envelope().clamp_angular(angular_speed);
        let duration = if duration_secs.is_finite() && duration_secs > 0.0 {
            Duration::from_secs_f64(duration_secs.min(self.config.max_duration.as_secs_f64()))
        } else {
            Duration::ZERO
        };
        SpinProfile::with_ratio(angular_speed, duration, self.config.full_speed_ratio)
    }

    /// Start a spin. The first command goes out immediately.
    pub fn start(&self, profile: SpinProfile) -> SpinTask {
        let state = Arc::new(Mutex::new(SpinState::FullSpeed));
        let started_at = Instant::now();
        tracing::info!(
            "Spinning robot: {} rad/s for {:?}",
            profile.angular_speed(),
            profile.duration()
        );

        let handle = tokio::spawn(run_ticks(
            profile,
            started_at,
            self.config.tick_interval,
            state.clone(),
            self.encoder.clone(),
        ));

        SpinTask {
            state,
            encoder: self.encoder.clone(),
            handle,
        }
    }
}

async fn run_ticks(
    profile: SpinProfile,
    started_at: Instant,
    tick_interval: Duration,
    state: Arc<Mutex<SpinState>>,
    encoder: VelocityEncoder,
) {
    let mut ticker = time::interval_at(started_at, tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The terminal stop lands on the deadline even when it falls between ticks
    let deadline = started_at + profile.duration();

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = time::sleep_until(deadline) => {}
        }

        let mut current = state.lock().await;
        if !current.is_running() {
            // cancelled between ticks
            return;
        }

        let phase = profile.phase_at(started_at.elapsed());
        *current = SpinState::from(phase);
        let command = profile.command_for(phase);
        if let Err(e) = encoder.publish(command.linear_x, command.angular_z).await {
            tracing::warn!("Spin tick failed to publish: {}", e);
        }

        if phase == SpinPhase::Finished {
            tracing::info!("Spin complete");
            return;
        }
    }
}

/// Handle to one in-flight spin maneuver
pub struct SpinTask {
    state: Arc<Mutex<SpinState>>,
    encoder: VelocityEncoder,
    handle: JoinHandle<()>,
}

impl SpinTask {
    pub async fn state(&self) -> SpinState {
        *self.state.lock().await
    }

    /// Stop the maneuver now.
    ///
    /// Emits the final `(0, 0)` before returning and reports whether it did.
    /// Cancelling a spin that already finished is a no-op returning `false`.
    pub async fn cancel(&self) -> bool {
        let mut state = self.state.lock().await;
        if !state.is_running() {
            return false;
        }

        *state = SpinState::Terminal;
        if let Err(e) = self.encoder.stop().await {
            tracing::warn!("Failed to publish stop while cancelling spin: {}", e);
        }
        tracing::info!("Spin cancelled");
        true
    }

    /// Wait until the tick loop has exited (finished or cancelled).
    pub async fn wait(self) {
        if let Err(e) = self.handle.await {
            tracing::error!("Spin task ended abnormally: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{SafetyEnvelope, VelocityCommand},
        test_support::RecordingLink,
    };

    const EPSILON: f64 = 1e-6;

    fn create_controller(tick_millis: u64) -> (SpinController, Arc<RecordingLink>) {
        let link = Arc::new(RecordingLink::new());
        let encoder = VelocityEncoder::new(link.clone(), SafetyEnvelope::default());
        let config = SpinConfig {
            tick_interval: Duration::from_millis(tick_millis),
            ..SpinConfig::default()
        };
        (SpinController::new(encoder, config), link)
    }

    /// (seconds since `origin`, command) pairs
    fn relative_timeline(link: &RecordingLink, origin: Instant) -> Vec<(f64, VelocityCommand)> {
        link.timeline()
            .into_iter()
            .map(|(at, command)| ((at - origin).as_secs_f64(), command))
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_spin_follows_profile_and_ends_with_single_stop() {
        // テスト項目: spin(2.0, 6.0) が前半全速・後半減速・最後に (0, 0) を 1 回だけ出す
        // given (前提条件):
        let (controller, link) = create_controller(20);
        let origin = Instant::now();

        // when (操作):
        let task = controller.start(controller.profile(2.0, 6.0));
        task.wait().await;
        time::sleep(Duration::from_secs(1)).await;

        // then (期待する結果):
        let timeline = relative_timeline(&link, origin);
        let (first_t, first) = timeline[0];
        assert_eq!(first_t, 0.0);
        assert_eq!(first, VelocityCommand::new(0.0, 2.0));

        for (t, command) in timeline.iter().filter(|(t, _)| *t < 4.79) {
            assert_eq!(command.angular_z, 2.0, "t={}", t);
        }

        let at_three = timeline.iter().find(|(t, _)| (*t - 3.0).abs() < 1e-9).unwrap();
        assert_eq!(at_three.1.angular_z, 2.0);

        let at_p09 = timeline.iter().find(|(t, _)| (*t - 5.88).abs() < 1e-9).unwrap();
        assert!((at_p09.1.angular_z - 0.38).abs() < EPSILON);

        let decel: Vec<f64> = timeline
            .iter()
            .filter(|(t, _)| *t > 4.81 && *t < 6.0)
            .map(|(_, c)| c.angular_z)
            .collect();
        assert!(!decel.is_empty());
        for pair in decel.windows(2) {
            assert!(pair[1] < pair[0]);
        }

        let (last_t, last) = *timeline.last().unwrap();
        assert!(last_t >= 6.0);
        assert!(last.is_stop());
        assert_eq!(timeline.iter().filter(|(_, c)| c.is_stop()).count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spin_reaches_terminal_state() {
        // テスト項目: 自然終了後の状態は Terminal で、cancel は何もしない
        // given (前提条件):
        let (controller, link) = create_controller(50);
        let task = controller.start(controller.profile(-1.0, 1.0));

        // when (操作):
        time::sleep(Duration::from_millis(1500)).await;
        let state = task.state().await;
        let cancelled = task.cancel().await;

        // then (期待する結果):
        assert_eq!(state, SpinState::Terminal);
        assert!(!cancelled);
        assert_eq!(
            link.commands().iter().filter(|c| c.is_stop()).count(),
            1
        );
        assert_eq!(link.commands()[0], VelocityCommand::new(0.0, -1.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_emits_stop_and_silences_ticks() {
        // テスト項目: cancel は即座に (0, 0) を出し、以後 tick は publish されない
        // given (前提条件):
        let (controller, link) = create_controller(20);
        let task = controller.start(controller.profile(2.0, 6.0));
        time::sleep(Duration::from_millis(1010)).await;

        // when (操作):
        let cancelled = task.cancel().await;
        let published_at_cancel = link.commands().len();
        time::sleep(Duration::from_secs(2)).await;
        let cancelled_again = task.cancel().await;

        // then (期待する結果):
        assert!(cancelled);
        assert!(!cancelled_again);
        assert_eq!(task.state().await, SpinState::Terminal);
        let commands = link.commands();
        assert_eq!(commands.len(), published_at_cancel);
        assert!(commands.last().unwrap().is_stop());
        assert_eq!(commands.iter().filter(|c| c.is_stop()).count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_lands_on_deadline_between_ticks() {
        // テスト項目: tick 間隔が長くても終端の (0, 0) は duration ちょうどに出る
        // given (前提条件):
        let (controller, link) = create_controller(1000);
        let origin = Instant::now();

        // when (操作):
        controller.start(controller.profile(2.0, 1.5)).wait().await;

        // then (期待する結果):
        let timeline = relative_timeline(&link, origin);
        assert_eq!(timeline.len(), 3);
        assert_eq!(timeline[0], (0.0, VelocityCommand::new(0.0, 2.0)));
        assert_eq!(timeline[1], (1.0, VelocityCommand::new(0.0, 2.0)));
        assert_eq!(timeline[2], (1.5, VelocityCommand::stop()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_profile_applies_server_side_bounds() {
        // テスト項目: 角速度は安全範囲、duration は上限に丸められる
        // given (前提条件):
        let (controller, _link) = create_controller(50);

        // when (操作):
        let profile = controller.profile(-50.0, 120.0);
        let invalid = controller.profile(1.0, f64::NAN);

        // then (期待する結果):
        assert_eq!(profile.angular_speed(), -SafetyEnvelope::DEFAULT_MAX_ANGULAR_Z);
        assert_eq!(profile.duration(), Duration::from_secs(30));
        assert_eq!(invalid.duration(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_speed_spin_only_emits_zero() {
        // テスト項目: S = 0 の spin は t = 0 でも 0 を出す (唯一の例外)
        // given (前提条件):
        let (controller, link) = create_controller(50);

        // when (操作):
        controller.start(controller.profile(0.0, 0.5)).wait().await;

        // then (期待する結果):
        assert!(link.commands().iter().all(|c| c.angular_z == 0.0));
    }
}
