//! Tag bytes of the tagstruct encoding.
//!
//! Every value in a tagstruct is preceded by a one-byte tag naming its type:
//!
//! ```text
//! +-----+-----------------+
//! | tag | payload         |
//! | 1 B | depends on tag  |
//! +-----+-----------------+
//! ```
//!
//! Booleans and the null string carry no payload at all; the tag byte is the
//! value.

use crate::error::ProtocolError;
use std::fmt;

/// Tag bytes understood by this codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Tag {
    /// Zero-terminated string.
    String = b't',
    /// Absent string, no payload.
    StringNull = b'N',
    /// Unsigned 32-bit integer, big-endian.
    U32 = b'L',
    /// Unsigned 8-bit integer.
    U8 = b'B',
    /// Unsigned 64-bit integer, big-endian.
    U64 = b'R',
    /// Signed 64-bit integer, big-endian.
    S64 = b'r',
    /// Sample format, channel count and rate.
    SampleSpec = b'a',
    /// Length-prefixed raw bytes.
    Arbitrary = b'x',
    BooleanTrue = b'1',
    BooleanFalse = b'0',
    /// Seconds and microseconds, two u32 values.
    Timeval = b'T',
    /// Microsecond count, unsigned 64-bit.
    Usec = b'U',
    /// Channel positions.
    ChannelMap = b'm',
    /// Per-channel volume levels.
    CVolume = b'v',
    /// Property list, terminated by a null string.
    PropList = b'P',
    /// Single volume level, unsigned 32-bit.
    Volume = b'V',
    /// Encoding byte plus property list.
    FormatInfo = b'f',
}

impl Tag {
    /// Returns the raw tag byte.
    pub fn byte(self) -> u8 {
        self as u8
    }

    /// Returns the boolean tag for `value`.
    pub fn boolean(value: bool) -> Self {
        if value {
            Tag::BooleanTrue
        } else {
            Tag::BooleanFalse
        }
    }

    fn name(self) -> &'static str {
        match self {
            Tag::String => "string",
            Tag::StringNull => "null string",
            Tag::U32 => "u32",
            Tag::U8 => "u8",
            Tag::U64 => "u64",
            Tag::S64 => "s64",
            Tag::SampleSpec => "sample spec",
            Tag::Arbitrary => "arbitrary",
            Tag::BooleanTrue => "boolean",
            Tag::BooleanFalse => "boolean",
            Tag::Timeval => "timeval",
            Tag::Usec => "usec",
            Tag::ChannelMap => "channel map",
            Tag::CVolume => "cvolume",
            Tag::PropList => "proplist",
            Tag::Volume => "volume",
            Tag::FormatInfo => "format info",
        }
    }
}

impl TryFrom<u8> for Tag {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            b't' => Ok(Tag::String),
            b'N' => Ok(Tag::StringNull),
            b'L' => Ok(Tag::U32),
            b'B' => Ok(Tag::U8),
            b'R' => Ok(Tag::U64),
            b'r' => Ok(Tag::S64),
            b'a' => Ok(Tag::SampleSpec),
            b'x' => Ok(Tag::Arbitrary),
            b'1' => Ok(Tag::BooleanTrue),
            b'0' => Ok(Tag::BooleanFalse),
            b'T' => Ok(Tag::Timeval),
            b'U' => Ok(Tag::Usec),
            b'm' => Ok(Tag::ChannelMap),
            b'v' => Ok(Tag::CVolume),
            b'P' => Ok(Tag::PropList),
            b'V' => Ok(Tag::Volume),
            b'f' => Ok(Tag::FormatInfo),
            _ => Err(ProtocolError::UnknownTag(value)),
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ('{}')", self.name(), self.byte() as char)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_byte_conversion() {
        let all = [
            Tag::String,
            Tag::StringNull,
            Tag::U32,
            Tag::U8,
            Tag::U64,
            Tag::S64,
            Tag::SampleSpec,
            Tag::Arbitrary,
            Tag::BooleanTrue,
            Tag::BooleanFalse,
            Tag::Timeval,
            Tag::Usec,
            Tag::ChannelMap,
            Tag::CVolume,
            Tag::PropList,
            Tag::Volume,
            Tag::FormatInfo,
        ];
        for tag in all {
            assert_eq!(Tag::try_from(tag.byte()).unwrap(), tag);
        }
    }

    #[test]
    fn test_unknown_tag() {
        assert!(matches!(
            Tag::try_from(b'z'),
            Err(ProtocolError::UnknownTag(b'z'))
        ));
        assert!(Tag::try_from(0u8).is_err());
    }

    #[test]
    fn test_boolean_tag() {
        assert_eq!(Tag::boolean(true), Tag::BooleanTrue);
        assert_eq!(Tag::boolean(false), Tag::BooleanFalse);
    }

    #[test]
    fn test_tag_display() {
        assert_eq!(Tag::U32.to_string(), "u32 ('L')");
        assert_eq!(Tag::StringNull.to_string(), "null string ('N')");
    }
}
