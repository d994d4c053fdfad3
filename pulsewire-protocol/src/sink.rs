//! Sink records.
//!
//! Wire layout of a sink, in order:
//!
//! ```text
//! L index  t name  t|N description  a sample_spec  m channel_map
//! L owner_module  v volume  1|0 muted  L monitor_source  t|N monitor_source_name
//! U latency  t|N driver  L flags  P props  U requested_latency  V base_volume
//! L state  L n_volume_steps  L card
//! L n_ports  <port> * n_ports  ( t active_port | N )
//! B n_formats  <format info> * n_formats
//! ```
//!
//! Fields marked `t|N` are optional strings: the server sends a null string
//! when it has no value for them.

use crate::error::ProtocolError;
use crate::format::FormatInfo;
use crate::props::{keys, Props};
use crate::sample::{ChannelMap, SampleSpec};
use crate::tagstruct::{TagStructRead, TagStructReader, TagStructWrite, TagStructWriter};
use crate::volume::{CVolume, Volume};
use serde::{Deserialize, Serialize};

/// Sink flag bits, as sent in [`Sink::flags`].
pub mod flags {
    pub const HW_VOLUME_CTRL: u32 = 0x0001;
    pub const LATENCY: u32 = 0x0002;
    pub const HARDWARE: u32 = 0x0004;
    pub const NETWORK: u32 = 0x0008;
    pub const HW_MUTE_CTRL: u32 = 0x0010;
    pub const DECIBEL_VOLUME: u32 = 0x0020;
    pub const FLAT_VOLUME: u32 = 0x0040;
    pub const DYNAMIC_LATENCY: u32 = 0x0080;
    pub const SET_FORMATS: u32 = 0x0100;
}

/// Sink states, as sent in [`Sink::state`].
pub mod state {
    pub const RUNNING: u32 = 0;
    pub const IDLE: u32 = 1;
    pub const SUSPENDED: u32 = 2;
}

/// Port availability, as sent in [`SinkPort::available`].
pub mod available {
    pub const UNKNOWN: u32 = 0;
    pub const NO: u32 = 1;
    pub const YES: u32 = 2;
}

/// An output port of a sink (speakers, headphones, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkPort {
    pub name: String,
    pub description: String,
    pub priority: u32,
    pub available: u32,
}

impl SinkPort {
    /// Returns false only when the server knows the port is unplugged.
    pub fn is_available(&self) -> bool {
        self.available != available::NO
    }
}

impl TagStructRead for SinkPort {
    fn read(r: &mut TagStructReader) -> Result<Self, ProtocolError> {
        Ok(Self {
            name: r.read_string()?,
            description: r.read_string()?,
            priority: r.read_u32()?,
            available: r.read_u32()?,
        })
    }
}

impl TagStructWrite for SinkPort {
    fn write(&self, w: &mut TagStructWriter) -> Result<(), ProtocolError> {
        w.write_string(&self.name)?;
        w.write_string(&self.description)?;
        w.write_u32(self.priority);
        w.write_u32(self.available);
        Ok(())
    }
}

/// The port list of a sink together with its active port.
///
/// A sink without ports sends a null string where the active port name
/// would be; that marker is consumed here and never surfaces as an empty
/// port name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SinkPorts {
    #[default]
    Absent,
    Present { ports: Vec<SinkPort>, active: String },
}

impl SinkPorts {
    pub fn ports(&self) -> &[SinkPort] {
        match self {
            SinkPorts::Absent => &[],
            SinkPorts::Present { ports, .. } => ports,
        }
    }

    pub fn active_port(&self) -> Option<&str> {
        match self {
            SinkPorts::Absent => None,
            SinkPorts::Present { active, .. } => Some(active),
        }
    }

    /// Returns the active port's full description, if it is in the list.
    pub fn active(&self) -> Option<&SinkPort> {
        let active = self.active_port()?;
        self.ports().iter().find(|port| port.name == active)
    }
}

impl TagStructRead for SinkPorts {
    fn read(r: &mut TagStructReader) -> Result<Self, ProtocolError> {
        let count = r.read_u32()?;
        if count == 0 {
            r.read_null_string()?;
            return Ok(SinkPorts::Absent);
        }
        let ports = (0..count)
            .map(|_| r.read())
            .collect::<Result<Vec<SinkPort>, _>>()?;
        let active = r.read_string()?;
        Ok(SinkPorts::Present { ports, active })
    }
}

impl TagStructWrite for SinkPorts {
    fn write(&self, w: &mut TagStructWriter) -> Result<(), ProtocolError> {
        match self {
            SinkPorts::Absent => {
                w.write_u32(0);
                w.write_null_string();
            }
            SinkPorts::Present { ports, active } => {
                if ports.is_empty() {
                    return Err(ProtocolError::EmptyPortList);
                }
                w.write_u32(ports.len() as u32);
                for port in ports {
                    w.write(port)?;
                }
                w.write_string(active)?;
            }
        }
        Ok(())
    }
}

/// A playback device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sink {
    pub index: u32,
    pub name: String,
    pub description: Option<String>,
    pub sample_spec: SampleSpec,
    pub channel_map: ChannelMap,
    pub owner_module: u32,
    pub volume: CVolume,
    pub muted: bool,
    pub monitor_source: u32,
    pub monitor_source_name: Option<String>,
    /// Current latency in microseconds.
    pub latency: u64,
    pub driver: Option<String>,
    pub flags: u32,
    pub props: Props,
    /// Configured latency in microseconds.
    pub requested_latency: u64,
    pub base_volume: Volume,
    pub state: u32,
    pub n_volume_steps: u32,
    pub card: u32,
    pub ports: SinkPorts,
    pub formats: Vec<FormatInfo>,
}

impl Sink {
    pub fn active_port(&self) -> Option<&str> {
        self.ports.active_port()
    }

    pub fn is_hardware(&self) -> bool {
        self.flags & flags::HARDWARE != 0
    }

    pub fn is_suspended(&self) -> bool {
        self.state == state::SUSPENDED
    }

    /// Returns the device description property, falling back to
    /// `description` and then to the sink name.
    pub fn device_description(&self) -> &str {
        self.props
            .get(keys::DEVICE_DESCRIPTION)
            .or(self.description.as_deref())
            .unwrap_or(&self.name)
    }
}

impl TagStructRead for Sink {
    fn read(r: &mut TagStructReader) -> Result<Self, ProtocolError> {
        let index = r.read_u32()?;
        let name = r.read_string()?;
        let description = r.read_optional_string()?;
        let sample_spec = r.read()?;
        let channel_map = r.read()?;
        let owner_module = r.read_u32()?;
        let volume = r.read()?;
        let muted = r.read_bool()?;
        let monitor_source = r.read_u32()?;
        let monitor_source_name = r.read_optional_string()?;
        let latency = r.read_usec()?;
        let driver = r.read_optional_string()?;
        let flags = r.read_u32()?;
        let props = r.read()?;
        let requested_latency = r.read_usec()?;
        let base_volume = r.read_volume()?;
        let state = r.read_u32()?;
        let n_volume_steps = r.read_u32()?;
        let card = r.read_u32()?;
        let ports = r.read()?;

        let n_formats = r.read_u8()?;
        let formats = (0..n_formats)
            .map(|_| r.read())
            .collect::<Result<Vec<FormatInfo>, _>>()?;

        Ok(Self {
            index,
            name,
            description,
            sample_spec,
            channel_map,
            owner_module,
            volume,
            muted,
            monitor_source,
            monitor_source_name,
            latency,
            driver,
            flags,
            props,
            requested_latency,
            base_volume,
            state,
            n_volume_steps,
            card,
            ports,
            formats,
        })
    }
}

impl TagStructWrite for Sink {
    fn write(&self, w: &mut TagStructWriter) -> Result<(), ProtocolError> {
        w.write_u32(self.index);
        w.write_string(&self.name)?;
        w.write_optional_string(self.description.as_deref())?;
        w.write(&self.sample_spec)?;
        w.write(&self.channel_map)?;
        w.write_u32(self.owner_module);
        w.write(&self.volume)?;
        w.write_bool(self.muted);
        w.write_u32(self.monitor_source);
        w.write_optional_string(self.monitor_source_name.as_deref())?;
        w.write_usec(self.latency);
        w.write_optional_string(self.driver.as_deref())?;
        w.write_u32(self.flags);
        w.write(&self.props)?;
        w.write_usec(self.requested_latency);
        w.write_volume(self.base_volume);
        w.write_u32(self.state);
        w.write_u32(self.n_volume_steps);
        w.write_u32(self.card);
        w.write(&self.ports)?;

        let n_formats = u8::try_from(self.formats.len())
            .map_err(|_| ProtocolError::TooManyFormats(self.formats.len()))?;
        w.write_u8(n_formats);
        for format in &self.formats {
            w.write(format)?;
        }
        Ok(())
    }
}
