//! UseCase 層のエラー型

use thiserror::Error;

use crate::domain::TopicError;

/// Velocity publish failure
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    #[error(transparent)]
    Topic(#[from] TopicError),
}

/// Operator connection failure
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConnectError {
    #[error("session capacity of {0} reached")]
    CapacityExceeded(usize),

    #[error("session '{0}' not found")]
    SessionNotFound(String),
}

/// Operator disconnection failure
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DisconnectError {
    #[error("session '{0}' not found")]
    SessionNotFound(String),
}
