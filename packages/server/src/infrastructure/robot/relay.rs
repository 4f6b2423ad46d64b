//! Relay robot link.
//!
//! Talks to an agent process that sits next to the robot runtime over a
//! WebSocket: velocity commands go out as `twist_command` frames and
//! odometry comes back as `odometry` frames. The connection is re-established
//! in the background with exponential backoff.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::{
    net::TcpStream,
    sync::{mpsc, watch},
    task::JoinHandle,
    time,
};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::protocol::Message,
};

use crate::{
    domain::{Odometry, RobotLink, TopicError, VelocityCommand},
    infrastructure::dto::robot::{OdometryMessage, TwistCommandMessage},
};

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(5);

type AgentStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub struct RelayRobotLink {
    outbound: mpsc::UnboundedSender<VelocityCommand>,
    odometry_rx: watch::Receiver<Option<Odometry>>,
    connected: Arc<AtomicBool>,
}

impl RelayRobotLink {
    /// Start the connection task for `url`. It stops once the returned link is dropped.
    pub fn spawn(url: String) -> (Arc<Self>, JoinHandle<()>) {
        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let (odometry_tx, odometry_rx) = watch::channel(None);
        let connected = Arc::new(AtomicBool::new(false));

        let handle = tokio::spawn(connection_loop(
            url,
            outbound_rx,
            odometry_tx,
            connected.clone(),
        ));

        (
            Arc::new(Self {
                outbound,
                odometry_rx,
                connected,
            }),
            handle,
        )
    }
}

#[async_trait]
impl RobotLink for RelayRobotLink {
    async fn publish_velocity(&self, command: VelocityCommand) -> Result<(), TopicError> {
        if !self.is_connected() {
            return Err(TopicError::Unavailable);
        }
        self.outbound
            .send(command)
            .map_err(|e| TopicError::PublishFailed(e.to_string()))
    }

    fn subscribe_odometry(&self) -> watch::Receiver<Option<Odometry>> {
        self.odometry_rx.clone()
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }
}

#[derive(Debug, PartialEq, Eq)]
enum ConnectionEnd {
    Lost,
    LinkDropped,
}

async fn connection_loop(
    url: String,
    mut outbound_rx: mpsc::UnboundedReceiver<VelocityCommand>,
    odometry_tx: watch::Sender<Option<Odometry>>,
    connected: Arc<AtomicBool>,
) {
    let mut backoff = INITIAL_BACKOFF;

    loop {
        tracing::info!("Connecting to robot agent at {}", url);
        match connect_async(url.as_str()).await {
            Ok((stream, _)) => {
                // Commands queued against the previous connection are stale
                while outbound_rx.try_recv().is_ok() {}

                connected.store(true, Ordering::Release);
                backoff = INITIAL_BACKOFF;
                tracing::info!("Robot agent connected");

                let end = run_connection(stream, &mut outbound_rx, &odometry_tx).await;
                connected.store(false, Ordering::Release);
                if end == ConnectionEnd::LinkDropped {
                    break;
                }
                tracing::warn!("Robot agent connection lost");
            }
            Err(e) => {
                tracing::warn!("Failed to connect to robot agent: {}", e);
            }
        }

        if !wait_for_retry(&mut outbound_rx, backoff).await {
            break;
        }
        backoff = (backoff * 2).min(MAX_BACKOFF);
    }

    tracing::info!("Robot relay link stopped");
}

/// Sleep for `backoff`. Returns false if the link was dropped meanwhile.
async fn wait_for_retry(
    outbound_rx: &mut mpsc::UnboundedReceiver<VelocityCommand>,
    backoff: Duration,
) -> bool {
    let deadline = time::sleep(backoff);
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = &mut deadline => return true,
            command = outbound_rx.recv() => {
                if command.is_none() {
                    return false;
                }
            }
        }
    }
}

async fn run_connection(
    stream: AgentStream,
    outbound_rx: &mut mpsc::UnboundedReceiver<VelocityCommand>,
    odometry_tx: &watch::Sender<Option<Odometry>>,
) -> ConnectionEnd {
    let (mut write, mut read) = stream.split();

    loop {
        tokio::select! {
            command = outbound_rx.recv() => {
                let Some(command) = command else {
                    let _ = write.send(Message::Close(None)).await;
                    return ConnectionEnd::LinkDropped;
                };
                let json = match serde_json::to_string(&TwistCommandMessage::from(command)) {
                    Ok(json) => json,
                    Err(e) => {
                        tracing::error!("Failed to serialize twist command: {}", e);
                        continue;
                    }
                };
                if let Err(e) = write.send(Message::Text(json.into())).await {
                    tracing::warn!("Failed to send twist command: {}", e);
                    return ConnectionEnd::Lost;
                }
            }
            frame = read.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    match serde_json::from_str::<OdometryMessage>(&text) {
                        Ok(message) => {
                            odometry_tx.send_replace(Some(Odometry::from(&message)));
                        }
                        Err(e) => tracing::warn!("Ignoring agent frame: {}", e),
                    }
                }
                Some(Ok(Message::Close(_))) | None => return ConnectionEnd::Lost,
                Some(Err(e)) => {
                    tracing::warn!("Robot agent read error: {}", e);
                    return ConnectionEnd::Lost;
                }
                Some(Ok(_)) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;
    use tokio_tungstenite::accept_async;

    use crate::infrastructure::dto::robot::{QuaternionDto, RobotMessageType};

    async fn wait_until_connected(link: &RelayRobotLink) {
        time::timeout(Duration::from_secs(5), async {
            while !link.is_connected() {
                time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("relay link did not connect");
    }

    #[tokio::test]
    async fn test_unavailable_while_disconnected() {
        // テスト項目: エージェントに繋がっていない間は Unavailable を返す
        // given (前提条件):
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let (link, _handle) = RelayRobotLink::spawn(format!("ws://{}", addr));

        // when (操作):
        let result = link.publish_velocity(VelocityCommand::new(0.1, 0.0)).await;

        // then (期待する結果):
        assert_eq!(result, Err(TopicError::Unavailable));
        assert!(!link.is_connected());
    }

    #[tokio::test]
    async fn test_exchanges_frames_with_agent() {
        // テスト項目: twist_command を送り、odometry を受け取る
        // given (前提条件):
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let agent = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = accept_async(stream).await.unwrap();
            let odometry = OdometryMessage {
                r#type: RobotMessageType::Odometry,
                x: 1.5,
                y: -0.5,
                orientation: QuaternionDto {
                    x: 0.0,
                    y: 0.0,
                    z: 0.0,
                    w: 1.0,
                },
            };
            ws.send(Message::Text(
                serde_json::to_string(&odometry).unwrap().into(),
            ))
            .await
            .unwrap();

            loop {
                match ws.next().await {
                    Some(Ok(Message::Text(text))) => {
                        return serde_json::from_str::<TwistCommandMessage>(&text).unwrap();
                    }
                    Some(Ok(_)) => continue,
                    other => panic!("agent stream ended: {:?}", other),
                }
            }
        });
        let (link, _handle) = RelayRobotLink::spawn(format!("ws://{}", addr));
        wait_until_connected(&link).await;
        let mut odometry = link.subscribe_odometry();

        // when (操作):
        link.publish_velocity(VelocityCommand::new(0.3, -0.2))
            .await
            .unwrap();
        let twist = agent.await.unwrap();
        time::timeout(Duration::from_secs(5), odometry.wait_for(|o| o.is_some()))
            .await
            .unwrap()
            .unwrap();

        // then (期待する結果):
        assert_eq!(twist.linear_x, 0.3);
        assert_eq!(twist.angular_z, -0.2);
        let latest = (*odometry.borrow()).unwrap();
        assert_eq!(latest.x, 1.5);
        assert_eq!(latest.y, -0.5);
    }

    #[tokio::test]
    async fn test_marks_disconnected_when_agent_goes_away() {
        // テスト項目: エージェントが切断すると is_connected が false に戻る
        // given (前提条件):
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (hang_up_tx, hang_up_rx) = tokio::sync::oneshot::channel::<()>();
        let agent = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = accept_async(stream).await.unwrap();
            hang_up_rx.await.ok();
            ws.close(None).await.ok();
        });
        let (link, _handle) = RelayRobotLink::spawn(format!("ws://{}", addr));
        wait_until_connected(&link).await;

        // when (操作):
        hang_up_tx.send(()).unwrap();
        agent.await.unwrap();
        time::timeout(Duration::from_secs(5), async {
            while link.is_connected() {
                time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();

        // then (期待する結果):
        assert_eq!(
            link.publish_velocity(VelocityCommand::stop()).await,
            Err(TopicError::Unavailable)
        );
    }
}
