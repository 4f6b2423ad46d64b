//! Operator console for teleop-bridge.
//!
//! Connects to the bridge, sends driving commands typed at the prompt and
//! prints pose updates. Automatically reconnects on disconnection (max 5
//! attempts with 5 second interval).
//!
//! Run with:
//! ```not_rust
//! cargo run --bin teleop-console
//! cargo run --bin teleop-console -- --url ws://robot-bridge.local:8080/ws
//! ```

use clap::Parser;
use teleop_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "teleop-console")]
#[command(about = "Drive a robot through teleop-bridge from the terminal", long_about = None)]
struct Args {
    /// Bridge WebSocket URL
    #[arg(short = 'u', long, env = "BRIDGE_URL", default_value = "ws://127.0.0.1:8080/ws")]
    url: String,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    if let Err(e) = teleop_console::run_client(args.url).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
