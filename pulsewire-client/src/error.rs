//! Client error types.

use pulsewire_protocol::ErrorCode;
use thiserror::Error;

/// Client errors.
///
/// Any error ends the current request; no partially decoded record is ever
/// returned with it.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("protocol error: {0}")]
    Protocol(#[from] pulsewire_protocol::ProtocolError),

    #[error("server error: {0}")]
    Server(ErrorCode),

    #[error("connection closed")]
    ConnectionClosed,

    #[error("request timeout")]
    Timeout,

    #[error("receive called without a request in flight")]
    NoPendingRequest,
}

impl ClientError {
    /// Returns whether this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Io(_) => true,
            ClientError::Timeout => true,
            ClientError::ConnectionClosed => true,
            ClientError::Server(code) => code.is_retryable(),
            _ => false,
        }
    }

    /// Returns the server's error code, if the server rejected the request.
    pub fn server_code(&self) -> Option<ErrorCode> {
        match self {
            ClientError::Server(code) => Some(*code),
            _ => None,
        }
    }
}
