//! Errors raised at the domain ports.

use thiserror::Error;

/// Failure to hand a velocity command to the robot's control topic
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TopicError {
    #[error("control topic is unavailable")]
    Unavailable,

    #[error("failed to publish on control topic: {0}")]
    PublishFailed(String),
}

/// Failure to deliver an outbound message to an operator session
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MessagePushError {
    #[error("session '{0}' is not registered")]
    SessionNotFound(String),

    #[error("failed to push message: {0}")]
    PushFailed(String),
}

/// Session registry errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("session '{0}' not found")]
    SessionNotFound(String),

    #[error("session capacity of {0} reached")]
    CapacityExceeded(usize),
}
