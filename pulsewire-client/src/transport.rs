//! The byte-level collaborator of [`Client`](crate::Client).

use crate::error::ClientError;
use bytes::Bytes;
use pulsewire_protocol::CommandTag;
use std::future::Future;

/// Sends one command and hands back the body of its reply.
///
/// Calls alternate strictly: every `send` is followed by exactly one
/// `receive` before the next `send`. Implementations own any framing,
/// sequence numbering and authentication they need.
pub trait Transport: Send {
    /// Sends `command` with its already-encoded argument tagstruct.
    fn send(
        &mut self,
        command: CommandTag,
        args: Bytes,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// Waits for the complete reply body of the last request.
    fn receive(&mut self) -> impl Future<Output = Result<Bytes, ClientError>> + Send;
}
