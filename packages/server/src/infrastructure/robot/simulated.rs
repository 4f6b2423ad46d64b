//! Simulated robot.
//!
//! Integrates the latest velocity command with a unicycle model at a fixed
//! step and publishes odometry after every step.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};

use crate::domain::{
    Odometry, Quaternion, RobotLink, TopicError, VelocityCommand, normalize_angle,
};

/// 50 Hz
pub const DEFAULT_STEP: Duration = Duration::from_millis(20);

pub struct SimulatedRobotLink {
    command_tx: watch::Sender<VelocityCommand>,
    odometry_rx: watch::Receiver<Option<Odometry>>,
}

impl SimulatedRobotLink {
    /// Start the integration task. It stops once the returned link is dropped.
    pub fn spawn(step: Duration) -> (Arc<Self>, JoinHandle<()>) {
        let (command_tx, command_rx) = watch::channel(VelocityCommand::stop());
        let (odometry_tx, odometry_rx) = watch::channel(Some(Odometry::default()));

        let handle = tokio::spawn(integrate(command_rx, odometry_tx, step));
        tracing::info!("Simulated robot started ({:?} step)", step);

        (
            Arc::new(Self {
                command_tx,
                odometry_rx,
            }),
            handle,
        )
    }
}

#[async_trait]
impl RobotLink for SimulatedRobotLink {
    async fn publish_velocity(&self, command: VelocityCommand) -> Result<(), TopicError> {
        self.command_tx
            .send(command)
            .map_err(|_| TopicError::Unavailable)
    }

    fn subscribe_odometry(&self) -> watch::Receiver<Option<Odometry>> {
        self.odometry_rx.clone()
    }

    fn is_connected(&self) -> bool {
        !self.command_tx.is_closed()
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Pose {
    x: f64,
    y: f64,
    yaw: f64,
}

impl Pose {
    fn step(&mut self, command: VelocityCommand, dt: f64) {
        self.x += command.linear_x * self.yaw.cos() * dt;
        self.y += command.linear_x * self.yaw.sin() * dt;
        self.yaw = normalize_angle(self.yaw + command.angular_z * dt);
    }

    fn to_odometry(self) -> Odometry {
        Odometry {
            x: self.x,
            y: self.y,
            orientation: Quaternion::from_yaw(self.yaw),
        }
    }
}

async fn integrate(
    mut command_rx: watch::Receiver<VelocityCommand>,
    odometry_tx: watch::Sender<Option<Odometry>>,
    step: Duration,
) {
    let mut ticker = time::interval(step);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let dt = step.as_secs_f64();
    let mut pose = Pose::default();

    loop {
        ticker.tick().await;
        if command_rx.has_changed().is_err() {
            break;
        }
        let command = *command_rx.borrow_and_update();
        pose.step(command, dt);
        odometry_tx.send_replace(Some(pose.to_odometry()));
    }

    tracing::info!("Simulated robot stopped");
}
