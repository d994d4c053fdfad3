//! Protocol error types and server error codes.

use crate::tag::Tag;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that can occur while framing, encoding or decoding tagstructs.
///
/// Every variant is terminal for the value being decoded: no partially
/// populated record is ever returned alongside an error.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("protocol mismatch: expected {expected}, got tag byte {actual:#04x}")]
    ProtocolMismatch { expected: Tag, actual: u8 },

    #[error("truncated input: need {needed} bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    #[error("unknown tag byte: {0:#04x}")]
    UnknownTag(u8),

    #[error("unknown command: {0}")]
    UnknownCommand(u32),

    #[error("invalid UTF-8 in string")]
    InvalidUtf8,

    #[error("string contains an interior NUL byte")]
    InteriorNul,

    #[error("too many channels: {0} (max {max})", max = crate::CHANNELS_MAX)]
    TooManyChannels(usize),

    #[error("length mismatch: declared {declared} bytes, arbitrary carries {actual}")]
    LengthMismatch { declared: u32, actual: u32 },

    #[error("too many formats: {0} (max 255)")]
    TooManyFormats(usize),

    #[error("port list marked present but holds no ports")]
    EmptyPortList,

    #[error("{0} trailing bytes after record")]
    TrailingBytes(usize),

    #[error("frame too large: {size} bytes (max {max})")]
    FrameTooLarge { size: u32, max: u32 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProtocolError {
    /// Returns whether a tag byte did not match the expected tag.
    pub fn is_mismatch(&self) -> bool {
        matches!(self, ProtocolError::ProtocolMismatch { .. })
    }

    /// Returns whether the input ended before a complete value was read.
    pub fn is_truncated(&self) -> bool {
        matches!(self, ProtocolError::Truncated { .. })
    }
}

/// Error codes carried by a server error reply.
///
/// The numeric values are fixed by the native protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u32)]
pub enum ErrorCode {
    Access = 1,
    Command = 2,
    Invalid = 3,
    Exist = 4,
    NoEntity = 5,
    ConnectionRefused = 6,
    Protocol = 7,
    Timeout = 8,
    AuthKey = 9,
    Internal = 10,
    ConnectionTerminated = 11,
    Killed = 12,
    InvalidServer = 13,
    ModInitFailed = 14,
    BadState = 15,
    NoData = 16,
    Version = 17,
    TooLarge = 18,
    NotSupported = 19,
    Unknown = 20,
    NoExtension = 21,
    Obsolete = 22,
    NotImplemented = 23,
    Forked = 24,
    Io = 25,
    Busy = 26,
}

impl ErrorCode {
    /// Maps a wire error code; codes this codec does not know become `Unknown`.
    pub fn from_code(code: u32) -> Self {
        match code {
            1 => ErrorCode::Access,
            2 => ErrorCode::Command,
            3 => ErrorCode::Invalid,
            4 => ErrorCode::Exist,
            5 => ErrorCode::NoEntity,
            6 => ErrorCode::ConnectionRefused,
            7 => ErrorCode::Protocol,
            8 => ErrorCode::Timeout,
            9 => ErrorCode::AuthKey,
            10 => ErrorCode::Internal,
            11 => ErrorCode::ConnectionTerminated,
            12 => ErrorCode::Killed,
            13 => ErrorCode::InvalidServer,
            14 => ErrorCode::ModInitFailed,
            15 => ErrorCode::BadState,
            16 => ErrorCode::NoData,
            17 => ErrorCode::Version,
            18 => ErrorCode::TooLarge,
            19 => ErrorCode::NotSupported,
            21 => ErrorCode::NoExtension,
            22 => ErrorCode::Obsolete,
            23 => ErrorCode::NotImplemented,
            24 => ErrorCode::Forked,
            25 => ErrorCode::Io,
            26 => ErrorCode::Busy,
            _ => ErrorCode::Unknown,
        }
    }

    /// Returns the wire value of this code.
    pub fn code(&self) -> u32 {
        *self as u32
    }

    /// Returns whether this error is potentially retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorCode::Timeout | ErrorCode::Busy | ErrorCode::Internal
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::Access => write!(f, "ACCESS"),
            ErrorCode::Command => write!(f, "COMMAND"),
            ErrorCode::Invalid => write!(f, "INVALID"),
            ErrorCode::Exist => write!(f, "EXIST"),
            ErrorCode::NoEntity => write!(f, "NO_ENTITY"),
            ErrorCode::ConnectionRefused => write!(f, "CONNECTION_REFUSED"),
            ErrorCode::Protocol => write!(f, "PROTOCOL"),
            ErrorCode::Timeout => write!(f, "TIMEOUT"),
            ErrorCode::AuthKey => write!(f, "AUTH_KEY"),
            ErrorCode::Internal => write!(f, "INTERNAL"),
            ErrorCode::ConnectionTerminated => write!(f, "CONNECTION_TERMINATED"),
            ErrorCode::Killed => write!(f, "KILLED"),
            ErrorCode::InvalidServer => write!(f, "INVALID_SERVER"),
            ErrorCode::ModInitFailed => write!(f, "MOD_INIT_FAILED"),
            ErrorCode::BadState => write!(f, "BAD_STATE"),
            ErrorCode::NoData => write!(f, "NO_DATA"),
            ErrorCode::Version => write!(f, "VERSION"),
            ErrorCode::TooLarge => write!(f, "TOO_LARGE"),
            ErrorCode::NotSupported => write!(f, "NOT_SUPPORTED"),
            ErrorCode::Unknown => write!(f, "UNKNOWN"),
            ErrorCode::NoExtension => write!(f, "NO_EXTENSION"),
            ErrorCode::Obsolete => write!(f, "OBSOLETE"),
            ErrorCode::NotImplemented => write!(f, "NOT_IMPLEMENTED"),
            ErrorCode::Forked => write!(f, "FORKED"),
            ErrorCode::Io => write!(f, "IO"),
            ErrorCode::Busy => write!(f, "BUSY"),
        }
    }
}
