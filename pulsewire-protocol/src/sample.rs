//! Sample specifications and channel maps.

use crate::error::ProtocolError;
use crate::tag::Tag;
use crate::tagstruct::{TagStructRead, TagStructReader, TagStructWrite, TagStructWriter};
use crate::CHANNELS_MAX;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sample format identifiers, as sent in [`SampleSpec::format`].
pub mod format {
    pub const U8: u8 = 0;
    pub const ALAW: u8 = 1;
    pub const ULAW: u8 = 2;
    pub const S16LE: u8 = 3;
    pub const S16BE: u8 = 4;
    pub const FLOAT32LE: u8 = 5;
    pub const FLOAT32BE: u8 = 6;
    pub const S32LE: u8 = 7;
    pub const S32BE: u8 = 8;
    pub const S24LE: u8 = 9;
    pub const S24BE: u8 = 10;
    pub const S24_32LE: u8 = 11;
    pub const S24_32BE: u8 = 12;
}

/// Audio sample format, channel count and rate.
///
/// ```text
/// a <u8 format> <u8 channels> <u32 rate>
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleSpec {
    pub format: u8,
    pub channels: u8,
    pub rate: u32,
}

impl SampleSpec {
    /// Returns the short name of the sample format, if known.
    pub fn format_name(&self) -> Option<&'static str> {
        let name = match self.format {
            format::U8 => "u8",
            format::ALAW => "aLaw",
            format::ULAW => "uLaw",
            format::S16LE => "s16le",
            format::S16BE => "s16be",
            format::FLOAT32LE => "float32le",
            format::FLOAT32BE => "float32be",
            format::S32LE => "s32le",
            format::S32BE => "s32be",
            format::S24LE => "s24le",
            format::S24BE => "s24be",
            format::S24_32LE => "s24-32le",
            format::S24_32BE => "s24-32be",
            _ => return None,
        };
        Some(name)
    }

    /// Returns the size of one sample in bytes, if the format is known.
    pub fn sample_size(&self) -> Option<usize> {
        match self.format {
            format::U8 | format::ALAW | format::ULAW => Some(1),
            format::S16LE | format::S16BE => Some(2),
            format::S24LE | format::S24BE => Some(3),
            format::FLOAT32LE
            | format::FLOAT32BE
            | format::S32LE
            | format::S32BE
            | format::S24_32LE
            | format::S24_32BE => Some(4),
            _ => None,
        }
    }

    /// Returns the size of one frame (a sample for every channel) in bytes.
    pub fn frame_size(&self) -> Option<usize> {
        self.sample_size().map(|size| size * self.channels as usize)
    }
}

impl fmt::Display for SampleSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.format_name() {
            Some(name) => write!(f, "{} {}ch {}Hz", name, self.channels, self.rate),
            None => write!(f, "format#{} {}ch {}Hz", self.format, self.channels, self.rate),
        }
    }
}

impl TagStructRead for SampleSpec {
    fn read(r: &mut TagStructReader) -> Result<Self, ProtocolError> {
        r.expect_tag(Tag::SampleSpec)?;
        let format = r.read_raw_u8()?;
        let channels = r.read_raw_u8()?;
        if channels as usize > CHANNELS_MAX {
            return Err(ProtocolError::TooManyChannels(channels as usize));
        }
        let rate = r.read_raw_u32()?;
        Ok(Self {
            format,
            channels,
            rate,
        })
    }
}

impl TagStructWrite for SampleSpec {
    fn write(&self, w: &mut TagStructWriter) -> Result<(), ProtocolError> {
        if self.channels as usize > CHANNELS_MAX {
            return Err(ProtocolError::TooManyChannels(self.channels as usize));
        }
        w.write_tag(Tag::SampleSpec);
        w.write_raw_u8(self.format);
        w.write_raw_u8(self.channels);
        w.write_raw_u32(self.rate);
        Ok(())
    }
}

/// Channel positions, one per channel.
///
/// ```text
/// m <u8 channels> <u8 position> * channels
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelMap {
    pub positions: Vec<u8>,
}

impl ChannelMap {
    /// Front-left, front-right.
    pub fn stereo() -> Self {
        Self {
            positions: vec![1, 2],
        }
    }

    pub fn channels(&self) -> usize {
        self.positions.len()
    }
}

impl TagStructRead for ChannelMap {
    fn read(r: &mut TagStructReader) -> Result<Self, ProtocolError> {
        r.expect_tag(Tag::ChannelMap)?;
        let channels = r.read_raw_u8()? as usize;
        if channels > CHANNELS_MAX {
            return Err(ProtocolError::TooManyChannels(channels));
        }
        let positions = (0..channels)
            .map(|_| r.read_raw_u8())
            .collect::<Result<_, _>>()?;
        Ok(Self { positions })
    }
}

impl TagStructWrite for ChannelMap {
    fn write(&self, w: &mut TagStructWriter) -> Result<(), ProtocolError> {
        if self.positions.len() > CHANNELS_MAX {
            return Err(ProtocolError::TooManyChannels(self.positions.len()));
        }
        w.write_tag(Tag::ChannelMap);
        w.write_raw_u8(self.positions.len() as u8);
        for position in &self.positions {
            w.write_raw_u8(*position);
        }
        Ok(())
    }
}
