//! Wiring of the bridge: robot link, repository, pusher, use cases and server.

use std::sync::Arc;

use teleop_shared::time::SystemClock;
use tokio::task::JoinHandle;

use crate::{
    config::{BridgeConfig, ConfigError, RobotBackend},
    domain::RobotLink,
    infrastructure::{
        message_pusher::WebSocketMessagePusher,
        repository::InMemorySessionRepository,
        robot::{RelayRobotLink, SimulatedRobotLink, simulated::DEFAULT_STEP},
    },
    ui::Server,
    usecase::{
        ConnectOperatorUseCase, DisconnectOperatorUseCase, DispatchCommandUseCase,
        GetBridgeStatusUseCase, PoseRelay, SpinController, VelocityEncoder,
    },
};

/// Start the robot link selected by `config`, along with its background task.
pub fn spawn_robot_link(
    config: &BridgeConfig,
) -> Result<(Arc<dyn RobotLink>, JoinHandle<()>), ConfigError> {
    match config.robot_backend {
        RobotBackend::Sim => {
            let (link, handle) = SimulatedRobotLink::spawn(DEFAULT_STEP);
            let link: Arc<dyn RobotLink> = link;
            Ok((link, handle))
        }
        RobotBackend::Relay => {
            let url = config
                .robot_url
                .clone()
                .ok_or(ConfigError::MissingRobotUrl)?;
            let (link, handle) = RelayRobotLink::spawn(url);
            let link: Arc<dyn RobotLink> = link;
            Ok((link, handle))
        }
    }
}

/// Build a server around an already running robot link.
///
/// Dependencies are created in order:
/// 1. Repository
/// 2. MessagePusher
/// 3. Encoder and spin controller
/// 4. UseCases and pose relay
/// 5. Server
pub fn build_server(config: &BridgeConfig, link: Arc<dyn RobotLink>) -> Server {
    // 1. Create Repository (in-memory session registry)
    let repository = Arc::new(InMemorySessionRepository::new(config.max_sessions));

    // 2. Create MessagePusher (WebSocket implementation)
    let message_pusher = Arc::new(WebSocketMessagePusher::new());

    // 3. Create the velocity path
    let encoder = VelocityEncoder::new(link.clone(), config.envelope());
    let spin_controller = SpinController::new(encoder.clone(), config.spin_config());

    // 4. Create UseCases
    let connect_operator_usecase = Arc::new(ConnectOperatorUseCase::new(
        repository.clone(),
        message_pusher.clone(),
        Arc::new(SystemClock),
    ));
    let disconnect_operator_usecase = Arc::new(DisconnectOperatorUseCase::new(
        repository.clone(),
        message_pusher.clone(),
    ));
    let dispatch_command_usecase = Arc::new(DispatchCommandUseCase::new(
        repository.clone(),
        encoder,
        spin_controller,
    ));
    let get_bridge_status_usecase = Arc::new(GetBridgeStatusUseCase::new(
        link.clone(),
        repository.clone(),
    ));
    let pose_relay = PoseRelay::new(
        link,
        repository,
        message_pusher,
        config.pose_relay_interval(),
    );

    // 5. Create the server
    Server::new(
        connect_operator_usecase,
        disconnect_operator_usecase,
        dispatch_command_usecase,
        get_bridge_status_usecase,
        pose_relay,
    )
}
