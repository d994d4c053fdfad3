//! Stream format descriptions.

use crate::error::ProtocolError;
use crate::props::Props;
use crate::tag::Tag;
use crate::tagstruct::{TagStructRead, TagStructReader, TagStructWrite, TagStructWriter};
use serde::{Deserialize, Serialize};

/// Encoding identifiers, as sent in [`FormatInfo::encoding`].
pub mod encoding {
    pub const ANY: u8 = 0;
    pub const PCM: u8 = 1;
    pub const AC3_IEC61937: u8 = 2;
    pub const EAC3_IEC61937: u8 = 3;
    pub const MPEG_IEC61937: u8 = 4;
    pub const DTS_IEC61937: u8 = 5;
    pub const MPEG2_AAC_IEC61937: u8 = 6;
    pub const TRUEHD_IEC61937: u8 = 7;
    pub const DTSHD_IEC61937: u8 = 8;
}

/// An encoding plus its format properties (rate, channels, ...).
///
/// ```text
/// f  B <u8 encoding>  P <proplist>
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatInfo {
    pub encoding: u8,
    pub props: Props,
}

impl FormatInfo {
    pub fn pcm() -> Self {
        Self {
            encoding: encoding::PCM,
            props: Props::new(),
        }
    }

    pub fn is_pcm(&self) -> bool {
        self.encoding == encoding::PCM
    }

    /// Returns whether this is a compressed passthrough encoding.
    pub fn is_passthrough(&self) -> bool {
        (encoding::AC3_IEC61937..=encoding::DTSHD_IEC61937).contains(&self.encoding)
    }
}

impl TagStructRead for FormatInfo {
    fn read(r: &mut TagStructReader) -> Result<Self, ProtocolError> {
        r.expect_tag(Tag::FormatInfo)?;
        let encoding = r.read_u8()?;
        let props = r.read()?;
        Ok(Self { encoding, props })
    }
}

impl TagStructWrite for FormatInfo {
    fn write(&self, w: &mut TagStructWriter) -> Result<(), ProtocolError> {
        w.write_tag(Tag::FormatInfo);
        w.write_u8(self.encoding);
        w.write(&self.props)
    }
}
