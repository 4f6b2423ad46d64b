//! Client execution logic with reconnection support.

use std::time::Duration;

use super::{error::ClientError, session::run_client_session, ui::spawn_input_thread};

const MAX_RECONNECT_ATTEMPTS: u32 = 5;
const RECONNECT_INTERVAL_SECS: u64 = 5;

/// Consecutive failed connection attempts.
///
/// A session that got connected and later dropped starts a fresh budget.
#[derive(Debug, Default)]
struct ReconnectBudget {
    failures: u32,
}

impl ReconnectBudget {
    /// 1-based number of the next attempt
    fn next_attempt(&self) -> u32 {
        self.failures + 1
    }

    /// Record a failed session and decide whether to try again.
    fn should_retry(&mut self, error: &ClientError) -> bool {
        match error {
            ClientError::Rejected(_) => false,
            ClientError::ConnectionLost(_) => {
                self.failures = 0;
                true
            }
            ClientError::ConnectionError(_) => {
                self.failures += 1;
                self.failures < MAX_RECONNECT_ATTEMPTS
            }
        }
    }
}

/// Run the console with reconnection logic
pub async fn run_client(url: String) -> Result<(), ClientError> {
    let mut input = spawn_input_thread();
    let mut budget = ReconnectBudget::default();

    loop {
        tracing::info!(
            "Attempting to connect to {} (attempt {}/{})",
            url,
            budget.next_attempt(),
            MAX_RECONNECT_ATTEMPTS
        );

        match run_client_session(&url, &mut input).await {
            Ok(()) => {
                tracing::info!("Client session ended normally");
                return Ok(());
            }
            Err(e @ ClientError::Rejected(_)) => {
                tracing::error!("{}. Another operator is probably driving.", e);
                return Err(e);
            }
            Err(e) => {
                tracing::warn!("{}", e);

                if !budget.should_retry(&e) {
                    tracing::error!(
                        "Failed to reconnect after {} attempts. Exiting.",
                        MAX_RECONNECT_ATTEMPTS
                    );
                    return Err(e);
                }

                tracing::info!(
                    "Reconnecting in {} seconds... (attempt {}/{})",
                    RECONNECT_INTERVAL_SECS,
                    budget.next_attempt(),
                    MAX_RECONNECT_ATTEMPTS
                );
                tokio::time::sleep(Duration::from_secs(RECONNECT_INTERVAL_SECS)).await;
            }
        }
    }
}
