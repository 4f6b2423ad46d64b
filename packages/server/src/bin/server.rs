//! Teleop bridge server.
//!
//! Accepts operator WebSocket sessions on `/ws`, forwards their velocity
//! commands to the robot and relays the robot's pose back.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin teleop-bridge
//! cargo run --bin teleop-bridge -- --port 3000 --robot-backend relay --robot-url ws://robot.local:9090
//! ```

use std::time::Duration;

use clap::Parser;
use teleop_bridge::{
    app::{build_server, spawn_robot_link},
    config::{BridgeConfig, RobotBackend},
};
use teleop_shared::logger::setup_logger;

const LINK_FLUSH_TIMEOUT: Duration = Duration::from_millis(500);

#[derive(Parser, Debug)]
#[command(name = "teleop-bridge")]
#[command(about = "WebSocket teleoperation bridge for a mobile robot", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "PORT", default_value = "8080")]
    port: u16,

    /// Robot link implementation
    #[arg(long, env = "ROBOT_BACKEND", value_enum, default_value = "sim")]
    robot_backend: RobotBackend,

    /// WebSocket URL of the robot agent (relay backend)
    #[arg(long, env = "ROBOT_URL")]
    robot_url: Option<String>,

    /// Maximum number of concurrent operator sessions
    #[arg(long, env = "MAX_SESSIONS", default_value = "1")]
    max_sessions: usize,

    /// Spin re-publish rate (Hz)
    #[arg(long, env = "SPIN_TICK_HZ", default_value = "20")]
    spin_tick_hz: f64,

    /// Pose relay rate (Hz)
    #[arg(long, env = "POSE_RELAY_HZ", default_value = "10")]
    pose_relay_hz: f64,

    /// Linear speed limit (m/s)
    #[arg(long, env = "MAX_LINEAR_X", default_value = "2.0")]
    max_linear_x: f64,

    /// Angular speed limit (rad/s)
    #[arg(long, env = "MAX_ANGULAR_Z", default_value = "6.0")]
    max_angular_z: f64,

    /// Longest spin the bridge will run (s)
    #[arg(long, env = "MAX_SPIN_DURATION", default_value = "30.0")]
    max_spin_duration: f64,
}

impl From<Args> for BridgeConfig {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            robot_backend: args.robot_backend,
            robot_url: args.robot_url,
            max_sessions: args.max_sessions,
            spin_tick_hz: args.spin_tick_hz,
            pose_relay_hz: args.pose_relay_hz,
            max_linear_x: args.max_linear_x,
            max_angular_z: args.max_angular_z,
            max_spin_duration_secs: args.max_spin_duration,
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let config = BridgeConfig::from(Args::parse());
    if let Err(e) = config.validate() {
        tracing::error!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    let (link, link_task) = match spawn_robot_link(&config) {
        Ok(started) => started,
        Err(e) => {
            tracing::error!("Failed to start robot link: {}", e);
            std::process::exit(1);
        }
    };
    tracing::info!("Robot backend: {:?}", config.robot_backend);

    let server = build_server(&config, link);
    if let Err(e) = server.run(config.host.clone(), config.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
    // let the link flush the final stop before the runtime goes away
    let _ = tokio::time::timeout(LINK_FLUSH_TIMEOUT, link_task).await;
}
