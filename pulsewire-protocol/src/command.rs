//! Command opcodes and argument encodings.

use crate::error::ProtocolError;
use crate::tagstruct::{encode, TagStructWrite, TagStructWriter};
use crate::volume::CVolume;
use crate::INVALID_INDEX;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Native protocol opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u32)]
pub enum CommandTag {
    // Replies
    Error = 0,
    Timeout = 1,
    Reply = 2,

    // Introspection
    GetSinkInfo = 21,
    GetSinkInfoList = 22,
    GetSinkInputInfo = 29,
    GetSinkInputInfoList = 30,

    // Volume and mute
    SetSinkVolume = 36,
    SetSinkInputVolume = 37,
    SetSinkMute = 39,
    SetSinkInputMute = 69,

    // Routing
    SetDefaultSink = 44,
    KillSinkInput = 49,
    MoveSinkInput = 67,
    SetSinkPort = 96,

    // Server-initiated
    SubscribeEvent = 66,
}

impl CommandTag {
    pub fn code(self) -> u32 {
        self as u32
    }

    /// Maps a wire opcode, rejecting opcodes this crate does not speak.
    pub fn from_code(code: u32) -> Result<Self, ProtocolError> {
        let tag = match code {
            0 => CommandTag::Error,
            1 => CommandTag::Timeout,
            2 => CommandTag::Reply,
            21 => CommandTag::GetSinkInfo,
            22 => CommandTag::GetSinkInfoList,
            29 => CommandTag::GetSinkInputInfo,
            30 => CommandTag::GetSinkInputInfoList,
            36 => CommandTag::SetSinkVolume,
            37 => CommandTag::SetSinkInputVolume,
            39 => CommandTag::SetSinkMute,
            44 => CommandTag::SetDefaultSink,
            49 => CommandTag::KillSinkInput,
            66 => CommandTag::SubscribeEvent,
            67 => CommandTag::MoveSinkInput,
            69 => CommandTag::SetSinkInputMute,
            96 => CommandTag::SetSinkPort,
            other => return Err(ProtocolError::UnknownCommand(other)),
        };
        Ok(tag)
    }
}

impl fmt::Display for CommandTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self, self.code())
    }
}

/// Selects a sink by index or by name.
///
/// Encoded as `L index, N` or `L 0xFFFFFFFF, t name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkSelector {
    Index(u32),
    Name(String),
}

impl From<u32> for SinkSelector {
    fn from(index: u32) -> Self {
        SinkSelector::Index(index)
    }
}

impl From<&str> for SinkSelector {
    fn from(name: &str) -> Self {
        SinkSelector::Name(name.to_string())
    }
}

impl From<String> for SinkSelector {
    fn from(name: String) -> Self {
        SinkSelector::Name(name)
    }
}

impl fmt::Display for SinkSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkSelector::Index(index) => write!(f, "#{}", index),
            SinkSelector::Name(name) => f.write_str(name),
        }
    }
}

impl TagStructWrite for SinkSelector {
    fn write(&self, w: &mut TagStructWriter) -> Result<(), ProtocolError> {
        match self {
            SinkSelector::Index(index) => {
                w.write_u32(*index);
                w.write_null_string();
            }
            SinkSelector::Name(name) => {
                w.write_u32(INVALID_INDEX);
                w.write_string(name)?;
            }
        }
        Ok(())
    }
}

/// A request with its typed arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    GetSinkInfoList,
    GetSinkInputInfoList,
    GetSinkInfo { sink: SinkSelector },
    GetSinkInputInfo { index: u32 },
    SetDefaultSink { name: String },
    SetSinkPort { sink: String, port: String },
    MoveSinkInput { index: u32, sink: String },
    SetSinkMute { sink: SinkSelector, mute: bool },
    SetSinkInputMute { index: u32, mute: bool },
    SetSinkVolume { sink: SinkSelector, volume: CVolume },
    SetSinkInputVolume { index: u32, volume: CVolume },
    KillSinkInput { index: u32 },
}

impl Command {
    pub fn tag(&self) -> CommandTag {
        match self {
            Command::GetSinkInfoList => CommandTag::GetSinkInfoList,
            Command::GetSinkInputInfoList => CommandTag::GetSinkInputInfoList,
            Command::GetSinkInfo { .. } => CommandTag::GetSinkInfo,
            Command::GetSinkInputInfo { .. } => CommandTag::GetSinkInputInfo,
            Command::SetDefaultSink { .. } => CommandTag::SetDefaultSink,
            Command::SetSinkPort { .. } => CommandTag::SetSinkPort,
            Command::MoveSinkInput { .. } => CommandTag::MoveSinkInput,
            Command::SetSinkMute { .. } => CommandTag::SetSinkMute,
            Command::SetSinkInputMute { .. } => CommandTag::SetSinkInputMute,
            Command::SetSinkVolume { .. } => CommandTag::SetSinkVolume,
            Command::SetSinkInputVolume { .. } => CommandTag::SetSinkInputVolume,
            Command::KillSinkInput { .. } => CommandTag::KillSinkInput,
        }
    }

    /// Encodes the argument bytes, without the opcode.
    pub fn encode_args(&self) -> Result<Bytes, ProtocolError> {
        encode(self)
    }
}

impl TagStructWrite for Command {
    fn write(&self, w: &mut TagStructWriter) -> Result<(), ProtocolError> {
        match self {
            Command::GetSinkInfoList | Command::GetSinkInputInfoList => {}
            Command::GetSinkInfo { sink } => w.write(sink)?,
            Command::GetSinkInputInfo { index } | Command::KillSinkInput { index } => {
                w.write_u32(*index)
            }
            Command::SetDefaultSink { name } => w.write_string(name)?,
            Command::SetSinkPort { sink, port } => {
                w.write_u32(INVALID_INDEX);
                w.write_string(sink)?;
                w.write_string(port)?;
            }
            Command::MoveSinkInput { index, sink } => {
                w.write_u32(*index);
                w.write_u32(INVALID_INDEX);
                w.write_string(sink)?;
            }
            Command::SetSinkMute { sink, mute } => {
                w.write(sink)?;
                w.write_bool(*mute);
            }
            Command::SetSinkInputMute { index, mute } => {
                w.write_u32(*index);
                w.write_bool(*mute);
            }
            Command::SetSinkVolume { sink, volume } => {
                w.write(sink)?;
                w.write(volume)?;
            }
            Command::SetSinkInputVolume { index, volume } => {
                w.write_u32(*index);
                w.write(volume)?;
            }
        }
        Ok(())
    }
}
