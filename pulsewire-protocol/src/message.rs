//! Control packet payloads: requests and the server's answers.
//!
//! Every control payload starts with two tagged u32 values, the opcode and
//! the sequence number, followed by opcode-specific tagstruct data.

use crate::command::{Command, CommandTag};
use crate::error::{ErrorCode, ProtocolError};
use crate::tagstruct::{TagStructReader, TagStructWriter};
use bytes::Bytes;

/// A request envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub command: CommandTag,
    /// Echoed by the server in its reply.
    pub sequence: u32,
    /// Encoded argument tagstruct.
    pub args: Bytes,
}

impl Request {
    pub fn new(command: CommandTag, sequence: u32, args: Bytes) -> Self {
        Self {
            command,
            sequence,
            args,
        }
    }

    /// Builds a request from a typed command.
    pub fn from_command(command: &Command, sequence: u32) -> Result<Self, ProtocolError> {
        Ok(Self::new(command.tag(), sequence, command.encode_args()?))
    }

    /// Encodes the control payload: `L command, L sequence, args`.
    pub fn encode(&self) -> Bytes {
        let mut w = TagStructWriter::with_capacity(10 + self.args.len());
        w.write_u32(self.command.code());
        w.write_u32(self.sequence);
        w.write_raw_bytes(&self.args);
        w.freeze()
    }

    /// Decodes a control payload sent by a client.
    pub fn decode(payload: Bytes) -> Result<Self, ProtocolError> {
        let mut r = TagStructReader::new(payload);
        let command = CommandTag::from_code(r.read_u32()?)?;
        let sequence = r.read_u32()?;
        Ok(Self::new(command, sequence, r.into_inner()))
    }
}

/// A control packet received from the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Successful reply; `body` holds the reply tagstruct, possibly empty.
    Reply { sequence: u32, body: Bytes },
    /// The server rejected the request.
    Error { sequence: u32, code: ErrorCode },
    /// Any other control packet, e.g. a subscription event.
    Event {
        command: u32,
        sequence: u32,
        body: Bytes,
    },
}

impl Response {
    pub fn reply(sequence: u32, body: Bytes) -> Self {
        Response::Reply { sequence, body }
    }

    pub fn error(sequence: u32, code: ErrorCode) -> Self {
        Response::Error { sequence, code }
    }

    pub fn sequence(&self) -> u32 {
        match self {
            Response::Reply { sequence, .. }
            | Response::Error { sequence, .. }
            | Response::Event { sequence, .. } => *sequence,
        }
    }

    /// Returns whether this answers the request with `sequence`.
    pub fn answers(&self, sequence: u32) -> bool {
        !matches!(self, Response::Event { .. }) && self.sequence() == sequence
    }

    pub fn decode(payload: Bytes) -> Result<Self, ProtocolError> {
        let mut r = TagStructReader::new(payload);
        let command = r.read_u32()?;
        let sequence = r.read_u32()?;

        let response = if command == CommandTag::Reply.code() {
            Response::Reply {
                sequence,
                body: r.into_inner(),
            }
        } else if command == CommandTag::Error.code() {
            Response::Error {
                sequence,
                code: ErrorCode::from_code(r.read_u32()?),
            }
        } else {
            Response::Event {
                command,
                sequence,
                body: r.into_inner(),
            }
        };
        Ok(response)
    }

    pub fn encode(&self) -> Bytes {
        let mut w = TagStructWriter::new();
        match self {
            Response::Reply { sequence, body } => {
                w.write_u32(CommandTag::Reply.code());
                w.write_u32(*sequence);
                w.write_raw_bytes(body);
                w.freeze()
            }
            Response::Error { sequence, code } => {
                w.write_u32(CommandTag::Error.code());
                w.write_u32(*sequence);
                w.write_u32(code.code());
                w.freeze()
            }
            Response::Event {
                command,
                sequence,
                body,
            } => {
                w.write_u32(*command);
                w.write_u32(*sequence);
                w.write_raw_bytes(body);
                w.freeze()
            }
        }
    }
}
