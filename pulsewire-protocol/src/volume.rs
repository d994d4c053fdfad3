//! Volume levels.

use crate::error::ProtocolError;
use crate::tag::Tag;
use crate::tagstruct::{TagStructRead, TagStructReader, TagStructWrite, TagStructWriter};
use crate::CHANNELS_MAX;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A software volume level.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Volume(pub u32);

impl Volume {
    /// Silence.
    pub const MUTED: Volume = Volume(0);
    /// 100%, no attenuation.
    pub const NORM: Volume = Volume(0x10000);
    /// Largest level the server accepts.
    pub const MAX: Volume = Volume(u32::MAX / 2);

    pub fn is_muted(&self) -> bool {
        self.0 == 0
    }

    /// Returns the level as a rounded percentage of [`Volume::NORM`].
    pub fn percent(&self) -> u32 {
        let norm = Self::NORM.0 as u64;
        ((self.0 as u64 * 100 + norm / 2) / norm) as u32
    }
}

impl fmt::Display for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percent())
    }
}

/// Per-channel volume levels.
///
/// ```text
/// v <u8 channels> <u32 level> * channels
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CVolume {
    pub volumes: Vec<Volume>,
}

impl CVolume {
    /// Sets every one of `channels` channels to `volume`.
    pub fn uniform(channels: u8, volume: Volume) -> Self {
        Self {
            volumes: vec![volume; channels as usize],
        }
    }

    pub fn channels(&self) -> usize {
        self.volumes.len()
    }

    /// Returns the average level across channels.
    pub fn avg(&self) -> Volume {
        if self.volumes.is_empty() {
            return Volume::MUTED;
        }
        let sum: u64 = self.volumes.iter().map(|v| v.0 as u64).sum();
        Volume((sum / self.volumes.len() as u64) as u32)
    }

    pub fn max(&self) -> Volume {
        self.volumes.iter().copied().max().unwrap_or(Volume::MUTED)
    }

    pub fn is_muted(&self) -> bool {
        self.volumes.iter().all(Volume::is_muted)
    }
}

impl TagStructRead for CVolume {
    fn read(r: &mut TagStructReader) -> Result<Self, ProtocolError> {
        r.expect_tag(Tag::CVolume)?;
        let channels = r.read_raw_u8()? as usize;
        if channels > CHANNELS_MAX {
            return Err(ProtocolError::TooManyChannels(channels));
        }
        let volumes = (0..channels)
            .map(|_| r.read_raw_u32().map(Volume))
            .collect::<Result<_, _>>()?;
        Ok(Self { volumes })
    }
}

impl TagStructWrite for CVolume {
    fn write(&self, w: &mut TagStructWriter) -> Result<(), ProtocolError> {
        if self.volumes.len() > CHANNELS_MAX {
            return Err(ProtocolError::TooManyChannels(self.volumes.len()));
        }
        w.write_tag(Tag::CVolume);
        w.write_raw_u8(self.volumes.len() as u8);
        for volume in &self.volumes {
            w.write_raw_u32(volume.0);
        }
        Ok(())
    }
}
