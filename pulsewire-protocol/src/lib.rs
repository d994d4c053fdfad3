//! # pulsewire-protocol
//!
//! Wire codec for the PulseAudio native protocol.
//!
//! This crate provides:
//! - The tagstruct encoding: a tag byte before every value, checked on read
//! - Typed records for sinks, sink inputs and their nested values
//! - Command opcodes and their argument encodings
//! - Packet framing with the 20-byte descriptor
//! - Error types and the server's error codes
//!
//! Decoding is synchronous over an in-memory buffer and never returns a
//! partially decoded record.

pub mod codec;
pub mod command;
pub mod error;
pub mod format;
pub mod frame;
pub mod message;
pub mod props;
pub mod sample;
pub mod sink;
pub mod sink_input;
pub mod tag;
pub mod tagstruct;
pub mod volume;

pub use codec::{Decoder, Encoder};
pub use command::{Command, CommandTag, SinkSelector};
pub use error::{ErrorCode, ProtocolError};
pub use format::FormatInfo;
pub use frame::{Frame, CONTROL_CHANNEL, DESCRIPTOR_SIZE};
pub use message::{Request, Response};
pub use props::Props;
pub use sample::{ChannelMap, SampleSpec};
pub use sink::{Sink, SinkPort, SinkPorts};
pub use sink_input::SinkInput;
pub use tag::Tag;
pub use tagstruct::{
    decode_all, decode_one, encode, TagStructRead, TagStructReader, TagStructWrite,
    TagStructWriter,
};
pub use volume::{CVolume, Volume};

/// Maximum packet payload size (16 MiB).
pub const MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;

/// Maximum number of channels in a sample spec, channel map or volume.
pub const CHANNELS_MAX: usize = 32;

/// Index sentinel meaning "select by name".
pub const INVALID_INDEX: u32 = u32::MAX;
