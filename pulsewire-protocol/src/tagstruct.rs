//! Tagstruct reader and writer.
//!
//! A tagstruct is a flat sequence of tagged values. Records are decoded by
//! reading their fields in wire order; nested records delegate to their own
//! [`TagStructRead`] implementation through [`TagStructReader::read`].
//!
//! Scalar layouts (all integers big-endian):
//!
//! ```text
//! L <u32>            U <u64 usec>        V <u32 volume>
//! B <u8>             R <u64>             1 / 0   (boolean, no payload)
//! t <bytes> 0x00     N                   x <u32 len> <bytes>
//! ```

use crate::error::ProtocolError;
use crate::tag::Tag;
use crate::volume::Volume;
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// A value that can be decoded from a tagstruct.
pub trait TagStructRead: Sized {
    fn read(r: &mut TagStructReader) -> Result<Self, ProtocolError>;
}

/// A value that can be encoded into a tagstruct.
pub trait TagStructWrite {
    fn write(&self, w: &mut TagStructWriter) -> Result<(), ProtocolError>;
}

/// Reads tagged values from a complete reply body.
#[derive(Debug, Clone)]
pub struct TagStructReader {
    buf: Bytes,
}

impl TagStructReader {
    pub fn new(buf: Bytes) -> Self {
        Self { buf }
    }

    /// Returns the number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.buf.len()
    }

    pub fn has_remaining(&self) -> bool {
        !self.buf.is_empty()
    }

    /// Returns the unread bytes.
    pub fn into_inner(self) -> Bytes {
        self.buf
    }

    fn ensure(&self, needed: usize) -> Result<(), ProtocolError> {
        if self.buf.len() < needed {
            return Err(ProtocolError::Truncated {
                needed,
                remaining: self.buf.len(),
            });
        }
        Ok(())
    }

    /// Reads one byte without a tag check.
    pub fn read_raw_u8(&mut self) -> Result<u8, ProtocolError> {
        self.ensure(1)?;
        Ok(self.buf.get_u8())
    }

    /// Reads a big-endian u32 without a tag check.
    pub fn read_raw_u32(&mut self) -> Result<u32, ProtocolError> {
        self.ensure(4)?;
        Ok(self.buf.get_u32())
    }

    /// Consumes one tag byte and checks it against `tag`.
    pub fn expect_tag(&mut self, tag: Tag) -> Result<(), ProtocolError> {
        let actual = self.read_raw_u8()?;
        if actual != tag.byte() {
            return Err(ProtocolError::ProtocolMismatch {
                expected: tag,
                actual,
            });
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8, ProtocolError> {
        self.expect_tag(Tag::U8)?;
        self.read_raw_u8()
    }

    pub fn read_u32(&mut self) -> Result<u32, ProtocolError> {
        self.expect_tag(Tag::U32)?;
        self.read_raw_u32()
    }

    pub fn read_u64(&mut self) -> Result<u64, ProtocolError> {
        self.expect_tag(Tag::U64)?;
        self.ensure(8)?;
        Ok(self.buf.get_u64())
    }

    /// Reads a microsecond count.
    pub fn read_usec(&mut self) -> Result<u64, ProtocolError> {
        self.expect_tag(Tag::Usec)?;
        self.ensure(8)?;
        Ok(self.buf.get_u64())
    }

    pub fn read_volume(&mut self) -> Result<Volume, ProtocolError> {
        self.expect_tag(Tag::Volume)?;
        Ok(Volume(self.read_raw_u32()?))
    }

    /// Reads a boolean; the tag byte itself is the value.
    pub fn read_bool(&mut self) -> Result<bool, ProtocolError> {
        match self.read_raw_u8()? {
            b'1' => Ok(true),
            b'0' => Ok(false),
            actual => Err(ProtocolError::ProtocolMismatch {
                expected: Tag::BooleanTrue,
                actual,
            }),
        }
    }

    /// Reads a non-null string.
    pub fn read_string(&mut self) -> Result<String, ProtocolError> {
        self.expect_tag(Tag::String)?;
        self.read_string_body()
    }

    /// Reads a string that may be sent as a null string.
    pub fn read_optional_string(&mut self) -> Result<Option<String>, ProtocolError> {
        match self.read_raw_u8()? {
            b't' => self.read_string_body().map(Some),
            b'N' => Ok(None),
            actual => Err(ProtocolError::ProtocolMismatch {
                expected: Tag::String,
                actual,
            }),
        }
    }

    /// Consumes a null-string marker.
    pub fn read_null_string(&mut self) -> Result<(), ProtocolError> {
        self.expect_tag(Tag::StringNull)
    }

    fn read_string_body(&mut self) -> Result<String, ProtocolError> {
        let Some(end) = self.buf.iter().position(|&b| b == 0) else {
            return Err(ProtocolError::Truncated {
                needed: self.buf.len() + 1,
                remaining: self.buf.len(),
            });
        };
        let raw = self.buf.split_to(end);
        self.buf.advance(1);
        String::from_utf8(raw.to_vec()).map_err(|_| ProtocolError::InvalidUtf8)
    }

    /// Reads length-prefixed raw bytes.
    pub fn read_arbitrary(&mut self) -> Result<Bytes, ProtocolError> {
        self.expect_tag(Tag::Arbitrary)?;
        let len = self.read_raw_u32()? as usize;
        self.ensure(len)?;
        Ok(self.buf.split_to(len))
    }

    /// Decodes a nested record.
    pub fn read<T: TagStructRead>(&mut self) -> Result<T, ProtocolError> {
        T::read(self)
    }
}

/// Encodes tagged values into a buffer.
#[derive(Debug, Default)]
pub struct TagStructWriter {
    buf: BytesMut,
}

impl TagStructWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn write_tag(&mut self, tag: Tag) {
        self.buf.put_u8(tag.byte());
    }

    pub fn write_raw_u8(&mut self, value: u8) {
        self.buf.put_u8(value);
    }

    pub fn write_raw_u32(&mut self, value: u32) {
        self.buf.put_u32(value);
    }

    /// Appends already-encoded tagstruct bytes.
    pub fn write_raw_bytes(&mut self, data: &[u8]) {
        self.buf.put_slice(data);
    }

    pub fn write_u8(&mut self, value: u8) {
        self.write_tag(Tag::U8);
        self.buf.put_u8(value);
    }

    pub fn write_u32(&mut self, value: u32) {
        self.write_tag(Tag::U32);
        self.buf.put_u32(value);
    }

    pub fn write_u64(&mut self, value: u64) {
        self.write_tag(Tag::U64);
        self.buf.put_u64(value);
    }

    pub fn write_usec(&mut self, value: u64) {
        self.write_tag(Tag::Usec);
        self.buf.put_u64(value);
    }

    pub fn write_volume(&mut self, volume: Volume) {
        self.write_tag(Tag::Volume);
        self.buf.put_u32(volume.0);
    }

    pub fn write_bool(&mut self, value: bool) {
        self.write_tag(Tag::boolean(value));
    }

    pub fn write_string(&mut self, value: &str) -> Result<(), ProtocolError> {
        if value.as_bytes().contains(&0) {
            return Err(ProtocolError::InteriorNul);
        }
        self.write_tag(Tag::String);
        self.buf.put_slice(value.as_bytes());
        self.buf.put_u8(0);
        Ok(())
    }

    /// Writes `value`, or a null string when absent.
    pub fn write_optional_string(&mut self, value: Option<&str>) -> Result<(), ProtocolError> {
        match value {
            Some(value) => self.write_string(value),
            None => {
                self.write_null_string();
                Ok(())
            }
        }
    }

    pub fn write_null_string(&mut self) {
        self.write_tag(Tag::StringNull);
    }

    pub fn write_arbitrary(&mut self, data: &[u8]) {
        self.write_tag(Tag::Arbitrary);
        self.buf.put_u32(data.len() as u32);
        self.buf.put_slice(data);
    }

    /// Encodes a nested record.
    pub fn write<T: TagStructWrite + ?Sized>(&mut self, value: &T) -> Result<(), ProtocolError> {
        value.write(self)
    }

    pub fn freeze(self) -> Bytes {
        self.buf.freeze()
    }
}

/// Decodes records back to back until `buf` is exhausted.
///
/// List replies carry no element count; the end of the body ends the list.
pub fn decode_all<T: TagStructRead>(buf: Bytes) -> Result<Vec<T>, ProtocolError> {
    let mut reader = TagStructReader::new(buf);
    let mut items = Vec::new();
    while reader.has_remaining() {
        items.push(reader.read()?);
    }
    Ok(items)
}

/// Decodes exactly one record, rejecting trailing bytes.
pub fn decode_one<T: TagStructRead>(buf: Bytes) -> Result<T, ProtocolError> {
    let mut reader = TagStructReader::new(buf);
    let item = reader.read()?;
    if reader.has_remaining() {
        return Err(ProtocolError::TrailingBytes(reader.remaining()));
    }
    Ok(item)
}

/// Encodes a single value into a fresh buffer.
pub fn encode<T: TagStructWrite + ?Sized>(value: &T) -> Result<Bytes, ProtocolError> {
    let mut writer = TagStructWriter::new();
    writer.write(value)?;
    Ok(writer.freeze())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::FormatInfo;
    use crate::props::Props;
    use crate::sample::{ChannelMap, SampleSpec};
    use crate::volume::CVolume;
    use proptest::prelude::*;

    fn reader(bytes: &[u8]) -> TagStructReader {
        TagStructReader::new(Bytes::copy_from_slice(bytes))
    }

    #[derive(Debug)]
    struct Pair(u32, String);

    impl TagStructRead for Pair {
        fn read(r: &mut TagStructReader) -> Result<Self, ProtocolError> {
            Ok(Pair(r.read_u32()?, r.read_string()?))
        }
    }

    impl TagStructWrite for Pair {
        fn write(&self, w: &mut TagStructWriter) -> Result<(), ProtocolError> {
            w.write_u32(self.0);
            w.write_string(&self.1)
        }
    }

    type ReadFn = fn(&mut TagStructReader) -> Result<(), ProtocolError>;

    /// Every tag-checked reader with the tag it expects first.
    fn tagged_readers() -> [(Tag, &'static [u8], ReadFn); 15] {
        [
            (Tag::U8, b"B", |r| r.read_u8().map(drop)),
            (Tag::U32, b"L", |r| r.read_u32().map(drop)),
            (Tag::U64, b"R", |r| r.read_u64().map(drop)),
            (Tag::Usec, b"U", |r| r.read_usec().map(drop)),
            (Tag::Volume, b"V", |r| r.read_volume().map(drop)),
            (Tag::String, b"t", |r| r.read_string().map(drop)),
            (Tag::String, b"tN", |r| r.read_optional_string().map(drop)),
            (Tag::StringNull, b"N", |r| r.read_null_string()),
            (Tag::Arbitrary, b"x", |r| r.read_arbitrary().map(drop)),
            (Tag::BooleanTrue, b"10", |r| r.read_bool().map(drop)),
            (Tag::SampleSpec, b"a", |r| r.read::<SampleSpec>().map(drop)),
            (Tag::ChannelMap, b"m", |r| r.read::<ChannelMap>().map(drop)),
            (Tag::CVolume, b"v", |r| r.read::<CVolume>().map(drop)),
            (Tag::PropList, b"P", |r| r.read::<Props>().map(drop)),
            (Tag::FormatInfo, b"f", |r| r.read::<FormatInfo>().map(drop)),
        ]
    }

    #[test]
    fn test_u32_layout() {
        let mut w = TagStructWriter::new();
        w.write_u32(0x0102_0304);
        assert_eq!(w.freeze().as_ref(), b"L\x01\x02\x03\x04");
    }

    #[test]
    fn test_u32_boundaries() {
        for value in [0, 1, 0xFFFF, u32::MAX] {
            let mut w = TagStructWriter::new();
            w.write_u32(value);
            let mut r = TagStructReader::new(w.freeze());
            assert_eq!(r.read_u32().unwrap(), value);
            assert!(!r.has_remaining());
        }
    }

    #[test]
    fn test_string_layout() {
        let mut w = TagStructWriter::new();
        w.write_string("hi").unwrap();
        w.write_null_string();
        assert_eq!(w.freeze().as_ref(), b"thi\0N");
    }

    #[test]
    fn test_string_boundaries() {
        let long = "a".repeat(255);
        for value in ["", "x", "alsa_output.pci-0000_00_1f.3.analog-stereo", &long] {
            let mut w = TagStructWriter::new();
            w.write_string(value).unwrap();
            let mut r = TagStructReader::new(w.freeze());
            assert_eq!(r.read_string().unwrap(), value);
            assert!(!r.has_remaining());
        }
    }

    #[test]
    fn test_null_string() {
        let mut r = reader(b"N");
        r.read_null_string().unwrap();
        assert!(!r.has_remaining());

        let mut r = reader(b"N");
        assert_eq!(r.read_optional_string().unwrap(), None);

        let mut r = reader(b"tabc\0");
        assert_eq!(r.read_optional_string().unwrap().as_deref(), Some("abc"));
    }

    #[test]
    fn test_null_string_is_not_a_string() {
        let err = reader(b"N").read_string().unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::ProtocolMismatch {
                expected: Tag::String,
                actual: b'N'
            }
        ));

        let err = reader(b"t\0").read_null_string().unwrap_err();
        assert!(err.is_mismatch());
    }

    #[test]
    fn test_usec_boundaries() {
        for value in [0, 1_000_000, u64::MAX] {
            let mut w = TagStructWriter::new();
            w.write_usec(value);
            let encoded = w.freeze();
            assert_eq!(encoded.len(), 9);
            assert_eq!(encoded[0], b'U');
            assert_eq!(TagStructReader::new(encoded).read_usec().unwrap(), value);
        }
    }

    #[test]
    fn test_volume_boundaries() {
        for value in [Volume::MUTED, Volume::NORM, Volume(u32::MAX)] {
            let mut w = TagStructWriter::new();
            w.write_volume(value);
            assert_eq!(TagStructReader::new(w.freeze()).read_volume().unwrap(), value);
        }
    }

    #[test]
    fn test_bool() {
        let mut w = TagStructWriter::new();
        w.write_bool(true);
        w.write_bool(false);
        let encoded = w.freeze();
        assert_eq!(encoded.as_ref(), b"10");

        let mut r = TagStructReader::new(encoded);
        assert!(r.read_bool().unwrap());
        assert!(!r.read_bool().unwrap());

        assert!(reader(b"L").read_bool().unwrap_err().is_mismatch());
    }

    #[test]
    fn test_raw_u8_has_no_tag() {
        let mut r = reader(&[0x00, 0xFF]);
        assert_eq!(r.read_raw_u8().unwrap(), 0);
        assert_eq!(r.read_raw_u8().unwrap(), 0xFF);
    }

    #[test]
    fn test_arbitrary() {
        let mut w = TagStructWriter::new();
        w.write_arbitrary(b"abc\0");
        let encoded = w.freeze();
        assert_eq!(encoded.as_ref(), b"x\x00\x00\x00\x04abc\0");
        assert_eq!(
            TagStructReader::new(encoded).read_arbitrary().unwrap().as_ref(),
            b"abc\0"
        );
    }

    #[test]
    fn test_truncated_string() {
        let err = reader(b"tanalog-out").read_string().unwrap_err();
        assert!(err.is_truncated());
    }

    #[test]
    fn test_truncated_scalars() {
        assert!(reader(b"L\x00\x01").read_u32().unwrap_err().is_truncated());
        assert!(reader(b"U\x00").read_usec().unwrap_err().is_truncated());
        assert!(reader(b"").read_u32().unwrap_err().is_truncated());
        assert!(reader(b"x\x00\x00\x00\x09ab")
            .read_arbitrary()
            .unwrap_err()
            .is_truncated());
    }

    #[test]
    fn test_invalid_utf8() {
        let err = reader(b"t\xFF\xFE\0").read_string().unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidUtf8));
    }

    #[test]
    fn test_interior_nul_rejected() {
        let mut w = TagStructWriter::new();
        assert!(matches!(
            w.write_string("a\0b"),
            Err(ProtocolError::InteriorNul)
        ));
        assert!(w.is_empty());
    }

    #[test]
    fn test_decode_all_until_empty() {
        let mut w = TagStructWriter::new();
        w.write(&Pair(1, "one".into())).unwrap();
        w.write(&Pair(2, "two".into())).unwrap();
        let items: Vec<Pair> = decode_all(w.freeze()).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].0, 2);
        assert_eq!(items[1].1, "two");

        let empty: Vec<Pair> = decode_all(Bytes::new()).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_decode_all_fails_on_partial_record() {
        let mut w = TagStructWriter::new();
        w.write(&Pair(1, "one".into())).unwrap();
        w.write_u32(2);
        let result: Result<Vec<Pair>, _> = decode_all(w.freeze());
        assert!(result.unwrap_err().is_truncated());
    }

    #[test]
    fn test_decode_one_rejects_trailing_bytes() {
        let mut w = TagStructWriter::new();
        w.write(&Pair(7, "seven".into())).unwrap();
        w.write_bool(true);
        let result: Result<Pair, _> = decode_one(w.freeze());
        assert!(matches!(result, Err(ProtocolError::TrailingBytes(1))));

        let pair: Pair = decode_one(encode(&Pair(7, "seven".into())).unwrap()).unwrap();
        assert_eq!(pair.0, 7);
    }

    proptest! {
        #[test]
        fn prop_u32_roundtrip(value: u32) {
            let mut w = TagStructWriter::new();
            w.write_u32(value);
            prop_assert_eq!(TagStructReader::new(w.freeze()).read_u32().unwrap(), value);
        }

        #[test]
        fn prop_string_roundtrip(value in "[a-zA-Z0-9 ._:-]{0,64}") {
            let mut w = TagStructWriter::new();
            w.write_string(&value).unwrap();
            prop_assert_eq!(TagStructReader::new(w.freeze()).read_string().unwrap(), value);
        }

        #[test]
        fn prop_wrong_tag_is_mismatch(
            first in any::<u8>(),
            rest in proptest::collection::vec(any::<u8>(), 0..16),
        ) {
            let mut bytes = vec![first];
            bytes.extend(rest);
            for (tag, accepted, read) in tagged_readers() {
                if accepted.contains(&first) {
                    continue;
                }
                let err = read(&mut reader(&bytes)).unwrap_err();
                let is_mismatch = matches!(
                    err,
                    ProtocolError::ProtocolMismatch { expected, actual }
                        if expected == tag && actual == first
                );
                prop_assert!(is_mismatch, "{:?} accepted tag byte {:#04x}", tag, first);
            }
        }

        #[test]
        fn prop_usec_and_volume_roundtrip(usec: u64, volume: u32) {
            let mut w = TagStructWriter::new();
            w.write_usec(usec);
            w.write_volume(Volume(volume));
            let mut r = TagStructReader::new(w.freeze());
            prop_assert_eq!(r.read_usec().unwrap(), usec);
            prop_assert_eq!(r.read_volume().unwrap(), Volume(volume));
            prop_assert!(!r.has_remaining());
        }

        #[test]
        fn prop_optional_string_roundtrip(
            value in proptest::option::of("[a-zA-Z0-9 ._:-]{0,32}"),
        ) {
            let mut w = TagStructWriter::new();
            w.write_optional_string(value.as_deref()).unwrap();
            let mut r = TagStructReader::new(w.freeze());
            prop_assert_eq!(r.read_optional_string().unwrap(), value);
            prop_assert!(!r.has_remaining());
        }

        #[test]
        fn prop_counted_list_consumes_exact_bytes(
            values in proptest::collection::vec(any::<u32>(), 0..32),
        ) {
            let mut w = TagStructWriter::new();
            w.write_u32(values.len() as u32);
            for value in &values {
                w.write_u32(*value);
            }
            w.write_bool(true);

            let mut r = TagStructReader::new(w.freeze());
            let count = r.read_u32().unwrap();
            let decoded = (0..count)
                .map(|_| r.read_u32())
                .collect::<Result<Vec<_>, _>>()
                .unwrap();
            prop_assert_eq!(decoded, values);
            prop_assert!(r.read_bool().unwrap());
            prop_assert!(!r.has_remaining());
        }
    }
}
