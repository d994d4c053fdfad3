//! Property lists.
//!
//! ```text
//! P ( t <key> 0x00  L <len>  x <len> <value bytes> )*  N
//! ```
//!
//! Values are sent as arbitrary bytes; textual values carry a trailing NUL,
//! which is stripped on decode and appended on encode.

use crate::error::ProtocolError;
use crate::tag::Tag;
use crate::tagstruct::{TagStructRead, TagStructReader, TagStructWrite, TagStructWriter};
use serde::{Deserialize, Serialize};
use std::collections::btree_map::{self, BTreeMap};

/// Well-known property keys.
pub mod keys {
    pub const APPLICATION_NAME: &str = "application.name";
    pub const APPLICATION_PROCESS_BINARY: &str = "application.process.binary";
    pub const APPLICATION_ICON_NAME: &str = "application.icon_name";
    pub const MEDIA_NAME: &str = "media.name";
    pub const DEVICE_DESCRIPTION: &str = "device.description";
    pub const DEVICE_CLASS: &str = "device.class";
}

/// String-to-string metadata attached to sinks, sink inputs and formats.
///
/// Entries carry no order on the wire; they are kept sorted by key so that
/// encoding is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Props(BTreeMap<String, String>);

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Inserts a property, returning the previous value for `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Props {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a Props {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl TagStructRead for Props {
    fn read(r: &mut TagStructReader) -> Result<Self, ProtocolError> {
        r.expect_tag(Tag::PropList)?;
        let mut props = BTreeMap::new();
        while let Some(key) = r.read_optional_string()? {
            let declared = r.read_u32()?;
            let data = r.read_arbitrary()?;
            if data.len() != declared as usize {
                return Err(ProtocolError::LengthMismatch {
                    declared,
                    actual: data.len() as u32,
                });
            }
            let value = data.strip_suffix(b"\0").unwrap_or(&data[..]);
            props.insert(key, String::from_utf8_lossy(value).into_owned());
        }
        Ok(Self(props))
    }
}

impl TagStructWrite for Props {
    fn write(&self, w: &mut TagStructWriter) -> Result<(), ProtocolError> {
        w.write_tag(Tag::PropList);
        for (key, value) in &self.0 {
            w.write_string(key)?;
            let mut data = Vec::with_capacity(value.len() + 1);
            data.extend_from_slice(value.as_bytes());
            data.push(0);
            w.write_u32(data.len() as u32);
            w.write_arbitrary(&data);
        }
        w.write_null_string();
        Ok(())
    }
}
