//! Test doubles shared by the unit tests of this crate.

use std::sync::{
    Mutex,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use tokio::{sync::watch, time::Instant};

use crate::domain::{Odometry, RobotLink, TopicError, VelocityCommand};

/// Robot link that records every published command with the (tokio) instant it arrived.
pub struct RecordingLink {
    published: Mutex<Vec<(Instant, VelocityCommand)>>,
    odometry_tx: watch::Sender<Option<Odometry>>,
    connected: AtomicBool,
}

impl RecordingLink {
    pub fn new() -> Self {
        let (odometry_tx, _) = watch::channel(None);
        Self {
            published: Mutex::new(Vec::new()),
            odometry_tx,
            connected: AtomicBool::new(true),
        }
    }

    pub fn commands(&self) -> Vec<VelocityCommand> {
        self.timeline().into_iter().map(|(_, c)| c).collect()
    }

    pub fn timeline(&self) -> Vec<(Instant, VelocityCommand)> {
        self.published.lock().unwrap().clone()
    }

    pub fn push_odometry(&self, odometry: Odometry) {
        self.odometry_tx.send_replace(Some(odometry));
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }
}

#[async_trait]
impl RobotLink for RecordingLink {
    async fn publish_velocity(&self, command: VelocityCommand) -> Result<(), TopicError> {
        if !self.is_connected() {
            return Err(TopicError::Unavailable);
        }
        self.published
            .lock()
            .unwrap()
            .push((Instant::now(), command));
        Ok(())
    }

    fn subscribe_odometry(&self) -> watch::Receiver<Option<Odometry>> {
        self.odometry_tx.subscribe()
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}
