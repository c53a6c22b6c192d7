//! Offset translation between the caller's text encoding and the engine's
//! native byte accounting.
//!
//! The engine always counts bytes of the buffer it was handed. When the caller
//! works in UTF-16 code units, the buffer is UTF-16LE and every caller offset
//! is worth two native bytes. Rows are never scaled; only columns and byte
//! offsets go through the codec.

use crate::point::Point;
use serde::Deserialize;
use std::borrow::Cow;
use std::ops::Range;

/// Text encoding the caller uses to express offsets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
pub enum Encoding {
    #[default]
    #[serde(rename = "utf-8", alias = "utf8")]
    Utf8,
    #[serde(rename = "utf-16", alias = "utf16")]
    Utf16,
}

impl Encoding {
    /// Native bytes per caller offset unit.
    pub const fn code_unit_ratio(self) -> usize {
        match self {
            Encoding::Utf8 => 1,
            Encoding::Utf16 => 2,
        }
    }

    pub const fn codec(self) -> PositionCodec {
        PositionCodec::new(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionCodec {
    ratio: usize,
}

impl PositionCodec {
    pub const fn new(encoding: Encoding) -> Self {
        Self {
            ratio: encoding.code_unit_ratio(),
        }
    }

    pub const fn ratio(self) -> usize {
        self.ratio
    }

    /// Caller offset to native offset. Saturates so that an oversized caller
    /// offset can never alias a valid native one.
    pub const fn to_native(self, offset: usize) -> usize {
        offset.saturating_mul(self.ratio)
    }

    pub const fn from_native(self, offset: usize) -> usize {
        offset / self.ratio
    }

    pub fn point_to_native(self, point: Point) -> tree_sitter::Point {
        tree_sitter::Point {
            row: point.row,
            column: self.to_native(point.column),
        }
    }

    pub fn point_from_native(self, point: tree_sitter::Point) -> Point {
        Point {
            row: point.row,
            column: self.from_native(point.column),
        }
    }

    pub fn range_from_native(self, range: tree_sitter::Range) -> crate::point::Range {
        crate::point::Range {
            start_byte: self.from_native(range.start_byte),
            end_byte: self.from_native(range.end_byte),
            start_point: self.point_from_native(range.start_point),
            end_point: self.point_from_native(range.end_point),
        }
    }
}

/// Source text in the layout handed to the engine.
#[derive(Debug, Clone)]
pub enum SourceBuffer {
    Utf8(String),
    Utf16(Vec<u16>),
}

impl SourceBuffer {
    pub fn encode(text: &str, encoding: Encoding) -> Self {
        match encoding {
            Encoding::Utf8 => SourceBuffer::Utf8(text.to_string()),
            Encoding::Utf16 => SourceBuffer::Utf16(text.encode_utf16().collect()),
        }
    }

    pub fn encoding(&self) -> Encoding {
        match self {
            SourceBuffer::Utf8(_) => Encoding::Utf8,
            SourceBuffer::Utf16(_) => Encoding::Utf16,
        }
    }

    /// Length in native bytes.
    pub fn native_len(&self) -> usize {
        match self {
            SourceBuffer::Utf8(text) => text.len(),
            SourceBuffer::Utf16(units) => units.len() * 2,
        }
    }

    /// Decoded text covering a native byte range. Out-of-bounds ends are
    /// clamped to the buffer.
    pub fn text(&self, range: Range<usize>) -> Cow<'_, str> {
        match self {
            SourceBuffer::Utf8(text) => {
                let bytes = clamp(text.as_bytes(), range);
                String::from_utf8_lossy(bytes)
            }
            SourceBuffer::Utf16(units) => {
                let units = clamp(units, range.start / 2..range.end / 2);
                Cow::Owned(String::from_utf16_lossy(units))
            }
        }
    }

    /// UTF-8 bytes for a native byte range, as consumed by text predicates.
    pub fn utf8_bytes(&self, range: Range<usize>) -> Cow<'_, [u8]> {
        match self {
            SourceBuffer::Utf8(text) => Cow::Borrowed(clamp(text.as_bytes(), range)),
            SourceBuffer::Utf16(_) => Cow::Owned(self.text(range).into_owned().into_bytes()),
        }
    }
}

fn clamp<T>(items: &[T], range: Range<usize>) -> &[T] {
    let end = range.end.min(items.len());
    let start = range.start.min(end);
    &items[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn ratio_follows_encoding() {
        assert_eq!(Encoding::Utf8.codec().ratio(), 1);
        assert_eq!(Encoding::Utf16.codec().ratio(), 2);
        assert_eq!(Encoding::default(), Encoding::Utf8);
    }

    #[test]
    fn columns_scale_rows_do_not() {
        let codec = Encoding::Utf16.codec();
        let native = codec.point_to_native(Point::new(4, 7));
        assert_eq!(native.row, 4);
        assert_eq!(native.column, 14);
        assert_eq!(codec.point_from_native(native), Point::new(4, 7));
    }

    #[test]
    fn oversized_offsets_saturate() {
        let codec = Encoding::Utf16.codec();
        assert_eq!(codec.to_native(usize::MAX), usize::MAX);
    }

    #[test]
    fn utf16_text_is_sliced_by_native_bytes() {
        let source = SourceBuffer::encode("héllo wörld", Encoding::Utf16);
        assert_eq!(source.native_len(), 22);
        assert_eq!(source.text(12..22), "wörld");
        assert_eq!(&*source.utf8_bytes(0..10), "héllo".as_bytes());
    }

    #[test]
    fn text_clamps_out_of_bounds_ranges() {
        let source = SourceBuffer::encode("abc", Encoding::Utf8);
        assert_eq!(source.text(1..99), "bc");
        assert_eq!(source.text(7..9), "");
    }

    proptest! {
        #[test]
        fn caller_offsets_round_trip(x in 0usize..(usize::MAX / 2)) {
            for encoding in [Encoding::Utf8, Encoding::Utf16] {
                let codec = encoding.codec();
                prop_assert_eq!(codec.from_native(codec.to_native(x)), x);
            }
        }

        #[test]
        fn aligned_native_offsets_round_trip(units in 0usize..(usize::MAX / 2)) {
            for encoding in [Encoding::Utf8, Encoding::Utf16] {
                let codec = encoding.codec();
                let native = units * codec.ratio();
                prop_assert_eq!(codec.to_native(codec.from_native(native)), native);
            }
        }
    }
}
