//! # pulsewire-client
//!
//! Transaction client for the PulseAudio native protocol.
//!
//! This crate provides:
//! - A [`Transport`] trait: send an opcode with its arguments, receive the reply
//! - [`Connection`], a transport over any connected tokio byte stream
//! - [`Client`], typed queries and mutations for sinks and sink inputs
//! - Connection configuration loaded from YAML and the environment
//!
//! Connecting and authenticating are left to the caller; a `Connection`
//! starts from a stream that is ready for commands.

pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod transport;

pub use client::Client;
pub use config::{ConfigError, ConnectionConfig};
pub use connection::Connection;
pub use error::ClientError;
pub use transport::Transport;
