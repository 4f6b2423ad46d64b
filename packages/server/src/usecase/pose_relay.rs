//! Pose Relay
//!
//! Forwards the robot's pose to every open operator session at a bounded
//! rate. Telemetry arriving between flushes only overwrites the pending
//! sample, so at most one `pose_update` leaves per interval and it always
//! carries the newest pose.

use std::{sync::Arc, time::Duration};

use tokio::{
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};

use crate::{
    domain::{MessagePusher, PoseSample, RobotLink, SessionRepository},
    infrastructure::dto::websocket::PoseUpdateMessage,
};

pub struct PoseRelay {
    link: Arc<dyn RobotLink>,
    repository: Arc<dyn SessionRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    interval: Duration,
}

impl PoseRelay {
    pub fn new(
        link: Arc<dyn RobotLink>,
        repository: Arc<dyn SessionRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        interval: Duration,
    ) -> Self {
        Self {
            link,
            repository,
            message_pusher,
            interval,
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Run until the telemetry source goes away.
    pub async fn run(self) {
        let mut odometry = self.link.subscribe_odometry();
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut pending: Option<PoseSample> = None;

        tracing::info!("Pose relay started ({:?} interval)", self.interval);
        loop {
            tokio::select! {
                changed = odometry.changed() => {
                    if changed.is_err() {
                        tracing::info!("Odometry source closed, stopping pose relay");
                        break;
                    }
                    if let Some(sample) = odometry.borrow_and_update().as_ref().map(PoseSample::from) {
                        pending = Some(sample);
                    }
                }
                _ = ticker.tick() => {
                    if let Some(sample) = pending.take() {
                        self.flush(sample).await;
                    }
                }
            }
        }
    }

    /// Send one sample to every open session. Returns how many accepted it.
    async fn flush(&self, sample: PoseSample) -> usize {
        let targets = self.repository.get_open_session_ids().await;
        if targets.is_empty() {
            // nobody to tell; the sample is simply dropped
            return 0;
        }

        let json = match serde_json::to_string(&PoseUpdateMessage::from(sample)) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!("Failed to serialize pose update: {}", e);
                return 0;
            }
        };
        let delivered = self.message_pusher.broadcast(targets, &json).await;
        tracing::debug!("Relayed pose yaw={} to {} session(s)", sample.yaw, delivered);
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{Odometry, OperatorSession, Quaternion, SessionId, Timestamp},
        infrastructure::{
            dto::websocket::PoseUpdateMessage,
            message_pusher::WebSocketMessagePusher,
            repository::InMemorySessionRepository,
        },
        test_support::RecordingLink,
    };
    use tokio::sync::mpsc;

    struct Fixture {
        link: Arc<RecordingLink>,
        repository: Arc<InMemorySessionRepository>,
        pusher: Arc<WebSocketMessagePusher>,
    }

    fn create_fixture() -> Fixture {
        Fixture {
            link: Arc::new(RecordingLink::new()),
            repository: Arc::new(InMemorySessionRepository::new(4)),
            pusher: Arc::new(WebSocketMessagePusher::new()),
        }
    }

    impl Fixture {
        fn relay(&self, interval: Duration) -> PoseRelay {
            PoseRelay::new(
                self.link.clone(),
                self.repository.clone(),
                self.pusher.clone(),
                interval,
            )
        }

        async fn open_session(&self, capacity: usize) -> mpsc::Receiver<String> {
            let session_id = SessionId::generate();
            self.repository
                .add_session(OperatorSession::new(session_id.clone(), Timestamp::new(0)))
                .await
                .unwrap();
            self.repository.mark_open(&session_id).await.unwrap();
            let (tx, rx) = mpsc::channel(capacity);
            self.pusher.register_client(session_id, tx).await;
            rx
        }
    }

    fn odometry_with_yaw(yaw: f64) -> Odometry {
        Odometry {
            x: 0.0,
            y: 0.0,
            orientation: Quaternion::from_yaw(yaw),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_relay_rate_is_bounded() {
        // テスト項目: 100 Hz のテレメトリが 10 Hz 以下に間引かれて配信される
        // given (前提条件):
        let fixture = create_fixture();
        let mut rx = fixture.open_session(256).await;
        let handle = fixture.relay(Duration::from_millis(100)).spawn();

        // when (操作): 1 秒間 100 Hz でテレメトリを流す
        for i in 0..100 {
            fixture.link.push_odometry(odometry_with_yaw(i as f64 * 0.01));
            time::sleep(Duration::from_millis(10)).await;
        }
        time::sleep(Duration::from_millis(250)).await;
        handle.abort();

        // then (期待する結果):
        let mut received = Vec::new();
        while let Ok(message) = rx.try_recv() {
            received.push(serde_json::from_str::<PoseUpdateMessage>(&message).unwrap());
        }
        assert!(!received.is_empty());
        assert!(received.len() <= 11, "received {} updates", received.len());
        let last = received.last().unwrap();
        assert!((last.yaw - 0.99).abs() < 1e-9);
    }

    #[tokio::test(start_paused = true)]
    async fn test_relay_skips_flush_without_new_sample() {
        // テスト項目: 新しいサンプルがなければ何も送信しない
        // given (前提条件):
        let fixture = create_fixture();
        let mut rx = fixture.open_session(16).await;
        let handle = fixture.relay(Duration::from_millis(50)).spawn();

        // when (操作):
        time::sleep(Duration::from_millis(10)).await;
        fixture.link.push_odometry(odometry_with_yaw(0.5));
        time::sleep(Duration::from_secs(1)).await;
        handle.abort();

        // then (期待する結果):
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_relay_without_sessions_discards() {
        // テスト項目: セッションがない場合、サンプルは破棄されリレーは動き続ける
        // given (前提条件):
        let fixture = create_fixture();
        let relay = fixture.relay(Duration::from_millis(50));

        // when (操作):
        let delivered = relay
            .flush(PoseSample {
                x: 0.0,
                y: 0.0,
                yaw: 1.0,
            })
            .await;

        // then (期待する結果):
        assert_eq!(delivered, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_relay_drops_update_for_full_channel() {
        // テスト項目: 送信チャネルが満杯のセッションには更新を落とし、他は配信される
        // given (前提条件):
        let fixture = create_fixture();
        let mut slow = fixture.open_session(1).await;
        let mut fast = fixture.open_session(16).await;
        let relay = fixture.relay(Duration::from_millis(50));
        let sample = PoseSample {
            x: 1.0,
            y: 2.0,
            yaw: 0.25,
        };

        // when (操作):
        let first = relay.flush(sample).await;
        let second = relay.flush(sample).await;

        // then (期待する結果):
        assert_eq!(first, 2);
        assert_eq!(second, 1);
        assert!(slow.try_recv().is_ok());
        assert!(slow.try_recv().is_err());
        assert!(fast.try_recv().is_ok());
        assert!(fast.try_recv().is_ok());
    }
}
