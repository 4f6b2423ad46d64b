//! Client error types.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClientError {
    #[error("connection error: {0}")]
    ConnectionError(String),

    /// An established session dropped
    #[error("connection lost: {0}")]
    ConnectionLost(String),

    /// The bridge refused the handshake (all operator slots taken)
    #[error("bridge rejected the connection: {0}")]
    Rejected(String),
}
