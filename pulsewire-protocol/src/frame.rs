//! Packet framing for the native protocol.
//!
//! Every packet starts with a 20-byte descriptor, all fields big-endian:
//!
//! ```text
//! +---------+---------+-----------+-----------+---------+
//! | length  | channel | offset_hi | offset_lo |  flags  |
//! | 4 bytes | 4 bytes |  4 bytes  |  4 bytes  | 4 bytes |
//! +---------+---------+-----------+-----------+---------+
//! | payload                                             |
//! | length bytes                                        |
//! +-----------------------------------------------------+
//! ```
//!
//! Control packets (commands and replies) travel on [`CONTROL_CHANNEL`] and
//! carry a tagstruct payload. Other channels carry stream audio data.

use crate::error::ProtocolError;
use crate::MAX_PAYLOAD_SIZE;
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Size of the packet descriptor in bytes (5 x u32).
pub const DESCRIPTOR_SIZE: usize = 20;

/// Channel used by control packets.
pub const CONTROL_CHANNEL: u32 = u32::MAX;

/// A parsed packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub channel: u32,
    /// Seek offset for stream data; zero on control packets.
    pub offset: u64,
    pub flags: u32,
    pub payload: Bytes,
}

impl Frame {
    /// Creates a control packet carrying `payload`.
    pub fn control(payload: Bytes) -> Self {
        Self {
            channel: CONTROL_CHANNEL,
            offset: 0,
            flags: 0,
            payload,
        }
    }

    pub fn is_control(&self) -> bool {
        self.channel == CONTROL_CHANNEL
    }

    /// Encodes the packet into bytes.
    pub fn encode(&self) -> Result<BytesMut, ProtocolError> {
        let max = MAX_PAYLOAD_SIZE as usize;
        if self.payload.len() > max {
            return Err(ProtocolError::FrameTooLarge {
                size: u32::try_from(self.payload.len()).unwrap_or(u32::MAX),
                max: MAX_PAYLOAD_SIZE,
            });
        }

        let mut buf = BytesMut::with_capacity(DESCRIPTOR_SIZE + self.payload.len());
        buf.put_u32(self.payload.len() as u32);
        buf.put_u32(self.channel);
        buf.put_u32((self.offset >> 32) as u32);
        buf.put_u32(self.offset as u32);
        buf.put_u32(self.flags);
        buf.put_slice(&self.payload);
        Ok(buf)
    }

    /// Decodes a packet from bytes.
    ///
    /// Returns `Ok(Some(frame))` if a complete packet was decoded,
    /// `Ok(None)` if more data is needed, or `Err` if the descriptor
    /// announces a payload above [`MAX_PAYLOAD_SIZE`].
    pub fn decode(buf: &mut BytesMut) -> Result<Option<Self>, ProtocolError> {
        Self::decode_with_limit(buf, MAX_PAYLOAD_SIZE)
    }

    /// Like [`Frame::decode`], with a caller-chosen payload limit.
    pub fn decode_with_limit(buf: &mut BytesMut, max: u32) -> Result<Option<Self>, ProtocolError> {
        if buf.len() < DESCRIPTOR_SIZE {
            return Ok(None);
        }

        let length = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]);
        if length > max {
            return Err(ProtocolError::FrameTooLarge { size: length, max });
        }

        if buf.len() < DESCRIPTOR_SIZE + length as usize {
            return Ok(None);
        }

        buf.advance(4);
        let channel = buf.get_u32();
        let offset_hi = buf.get_u32() as u64;
        let offset_lo = buf.get_u32() as u64;
        let flags = buf.get_u32();
        let payload = buf.split_to(length as usize).freeze();

        Ok(Some(Self {
            channel,
            offset: (offset_hi << 32) | offset_lo,
            flags,
            payload,
        }))
    }
}
