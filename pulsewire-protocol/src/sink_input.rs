//! Sink input records.

use crate::error::ProtocolError;
use crate::format::FormatInfo;
use crate::props::{keys, Props};
use crate::sample::{ChannelMap, SampleSpec};
use crate::tagstruct::{TagStructRead, TagStructReader, TagStructWrite, TagStructWriter};
use crate::volume::CVolume;
use serde::{Deserialize, Serialize};

/// A playback stream attached to a sink.
///
/// ```text
/// L index  t|N name  L owner_module  L client  L sink  a sample_spec
/// m channel_map  v volume  U buffer_latency  U sink_latency
/// t|N resample_method  t|N driver  1|0 muted  P props  1|0 corked
/// 1|0 has_volume  1|0 volume_writable  f format
/// ```
///
/// `name` mirrors the stream's `media.name` property and, like the resample
/// method and driver, arrives as a null string when the server has none.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkInput {
    pub index: u32,
    pub name: Option<String>,
    pub owner_module: u32,
    pub client: u32,
    pub sink: u32,
    pub sample_spec: SampleSpec,
    pub channel_map: ChannelMap,
    pub volume: CVolume,
    pub buffer_latency: u64,
    pub sink_latency: u64,
    pub resample_method: Option<String>,
    pub driver: Option<String>,
    pub muted: bool,
    pub props: Props,
    pub corked: bool,
    pub has_volume: bool,
    pub volume_writable: bool,
    pub format: FormatInfo,
}

impl SinkInput {
    pub fn application_name(&self) -> Option<&str> {
        self.props.get(keys::APPLICATION_NAME)
    }

    pub fn media_name(&self) -> Option<&str> {
        self.props.get(keys::MEDIA_NAME)
    }

    /// Returns the application name, falling back to the stream name.
    pub fn display_name(&self) -> &str {
        self.application_name()
            .or(self.name.as_deref())
            .unwrap_or_default()
    }

    /// Total latency in microseconds.
    pub fn total_latency(&self) -> u64 {
        self.buffer_latency.saturating_add(self.sink_latency)
    }
}

impl TagStructRead for SinkInput {
    fn read(r: &mut TagStructReader) -> Result<Self, ProtocolError> {
        Ok(Self {
            index: r.read_u32()?,
            name: r.read_optional_string()?,
            owner_module: r.read_u32()?,
            client: r.read_u32()?,
            sink: r.read_u32()?,
            sample_spec: r.read()?,
            channel_map: r.read()?,
            volume: r.read()?,
            buffer_latency: r.read_usec()?,
            sink_latency: r.read_usec()?,
            resample_method: r.read_optional_string()?,
            driver: r.read_optional_string()?,
            muted: r.read_bool()?,
            props: r.read()?,
            corked: r.read_bool()?,
            has_volume: r.read_bool()?,
            volume_writable: r.read_bool()?,
            format: r.read()?,
        })
    }
}

impl TagStructWrite for SinkInput {
    fn write(&self, w: &mut TagStructWriter) -> Result<(), ProtocolError> {
        w.write_u32(self.index);
        w.write_optional_string(self.name.as_deref())?;
        w.write_u32(self.owner_module);
        w.write_u32(self.client);
        w.write_u32(self.sink);
        w.write(&self.sample_spec)?;
        w.write(&self.channel_map)?;
        w.write(&self.volume)?;
        w.write_usec(self.buffer_latency);
        w.write_usec(self.sink_latency);
        w.write_optional_string(self.resample_method.as_deref())?;
        w.write_optional_string(self.driver.as_deref())?;
        w.write_bool(self.muted);
        w.write(&self.props)?;
        w.write_bool(self.corked);
        w.write_bool(self.has_volume);
        w.write_bool(self.volume_writable);
        w.write(&self.format)
    }
}
