//! Packet connection over an established stream.

use crate::config::ConnectionConfig;
use crate::error::ClientError;
use crate::transport::Transport;
use bytes::Bytes;
use pulsewire_protocol::{CommandTag, Decoder, Encoder, Request, Response};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Sequence number the server uses for unsolicited packets.
const EVENT_SEQUENCE: u32 = u32::MAX;

/// A [`Transport`] over any byte stream that is already connected and
/// authenticated, such as a `UnixStream` after the auth handshake.
pub struct Connection<S> {
    stream: S,
    config: ConnectionConfig,
    decoder: Decoder,
    read_buf: Vec<u8>,
    next_sequence: u32,
    /// Sequence of the request awaiting its reply.
    pending: Option<u32>,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn new(stream: S) -> Self {
        Self::with_config(stream, ConnectionConfig::default())
    }

    pub fn with_config(stream: S, config: ConnectionConfig) -> Self {
        let config = config.normalized();
        Self {
            stream,
            decoder: Decoder::with_capacity(config.read_buffer_size)
                .with_max_payload(config.max_payload_size),
            read_buf: vec![0u8; config.read_buffer_size],
            config,
            next_sequence: 0,
            pending: None,
        }
    }

    /// Starts numbering requests at `sequence`, e.g. after a handshake that
    /// already used the first sequence numbers.
    pub fn with_first_sequence(mut self, sequence: u32) -> Self {
        self.next_sequence = if sequence == EVENT_SEQUENCE {
            0
        } else {
            sequence
        };
        self
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    /// Returns the underlying stream, dropping any buffered input.
    pub fn into_inner(self) -> S {
        self.stream
    }

    fn allocate_sequence(&mut self) -> u32 {
        let sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.wrapping_add(1);
        if self.next_sequence == EVENT_SEQUENCE {
            self.next_sequence = 0;
        }
        sequence
    }

    async fn write_request(&mut self, request: &Request) -> Result<(), ClientError> {
        let encoded = Encoder::encode_request(request)?;
        tracing::debug!(
            "Sending request seq={} command={} ({} bytes)",
            request.sequence,
            request.command,
            encoded.len()
        );
        self.stream.write_all(&encoded).await?;
        self.stream.flush().await?;
        Ok(())
    }

    /// Reads packets until the reply to `sequence` arrives.
    async fn read_reply(&mut self, sequence: u32) -> Result<Bytes, ClientError> {
        loop {
            while let Some(frame) = self.decoder.decode_frame()? {
                if !frame.is_control() {
                    tracing::trace!(
                        "Skipping stream packet on channel {} ({} bytes)",
                        frame.channel,
                        frame.payload.len()
                    );
                    continue;
                }

                match Response::decode(frame.payload)? {
                    Response::Reply { sequence: seq, body } if seq == sequence => {
                        tracing::debug!("Reply seq={} ({} bytes)", seq, body.len());
                        return Ok(body);
                    }
                    Response::Error { sequence: seq, code } if seq == sequence => {
                        tracing::warn!("Request seq={} rejected: {}", seq, code);
                        return Err(ClientError::Server(code));
                    }
                    Response::Event { command, .. } => {
                        tracing::debug!("Skipping server event command={}", command);
                    }
                    other => {
                        tracing::warn!(
                            "Skipping reply for seq={} while waiting for seq={}",
                            other.sequence(),
                            sequence
                        );
                    }
                }
            }

            let n = self.stream.read(&mut self.read_buf).await?;
            tracing::trace!("Read {} bytes from stream", n);
            if n == 0 {
                tracing::debug!("Connection closed (0 bytes)");
                return Err(ClientError::ConnectionClosed);
            }
            self.decoder.extend(&self.read_buf[..n]);
        }
    }
}

impl<S> Transport for Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn send(&mut self, command: CommandTag, args: Bytes) -> Result<(), ClientError> {
        let request = Request::new(command, self.allocate_sequence(), args);
        self.write_request(&request).await?;
        self.pending = Some(request.sequence);
        Ok(())
    }

    async fn receive(&mut self) -> Result<Bytes, ClientError> {
        let sequence = self.pending.take().ok_or(ClientError::NoPendingRequest)?;
        let timeout = self.config.request_timeout();
        match timeout {
            Some(timeout) => tokio::time::timeout(timeout, self.read_reply(sequence))
                .await
                .map_err(|_| {
                    tracing::debug!("Request seq={} timed out", sequence);
                    ClientError::Timeout
                })?,
            None => self.read_reply(sequence).await,
        }
    }
}
