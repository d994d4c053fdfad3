//! Encoder and decoder for control packets.

use crate::error::ProtocolError;
use crate::frame::Frame;
use crate::message::{Request, Response};
use crate::MAX_PAYLOAD_SIZE;
use bytes::{Bytes, BytesMut};

/// Encodes requests and responses into framed control packets.
pub struct Encoder;

impl Encoder {
    /// Encodes a request into a packet.
    pub fn encode_request(request: &Request) -> Result<BytesMut, ProtocolError> {
        Frame::control(request.encode()).encode()
    }

    /// Encodes a response into a packet.
    pub fn encode_response(response: &Response) -> Result<BytesMut, ProtocolError> {
        Frame::control(response.encode()).encode()
    }
}

/// Buffers incoming bytes and splits them into packets.
pub struct Decoder {
    buffer: BytesMut,
    max_payload: u32,
}

impl Decoder {
    pub fn new() -> Self {
        Self::with_capacity(8192)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(capacity),
            max_payload: MAX_PAYLOAD_SIZE,
        }
    }

    /// Lowers the payload limit; values above [`MAX_PAYLOAD_SIZE`] are clamped.
    pub fn with_max_payload(mut self, max: u32) -> Self {
        self.max_payload = max.min(MAX_PAYLOAD_SIZE);
        self
    }

    /// Appends data to the internal buffer.
    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Appends bytes to the internal buffer.
    pub fn extend_bytes(&mut self, data: Bytes) {
        self.buffer.extend_from_slice(&data);
    }

    /// Attempts to decode the next packet from the buffer.
    pub fn decode_frame(&mut self) -> Result<Option<Frame>, ProtocolError> {
        Frame::decode_with_limit(&mut self.buffer, self.max_payload)
    }

    /// Attempts to decode the next control packet as a response.
    ///
    /// Packets on stream channels are consumed and skipped.
    pub fn decode_response(&mut self) -> Result<Option<Response>, ProtocolError> {
        while let Some(frame) = self.decode_frame()? {
            if frame.is_control() {
                return Response::decode(frame.payload).map(Some);
            }
        }
        Ok(None)
    }

    /// Attempts to decode the next control packet as a request.
    pub fn decode_request(&mut self) -> Result<Option<Request>, ProtocolError> {
        while let Some(frame) = self.decode_frame()? {
            if frame.is_control() {
                return Request::decode(frame.payload).map(Some);
            }
        }
        Ok(None)
    }

    /// Returns the number of bytes currently buffered.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Clears the internal buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}
