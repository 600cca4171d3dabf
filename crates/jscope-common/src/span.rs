//! Source spans and their compact single-word encoding.
//!
//! A `Span` is a `(start, len)` pair of byte offsets into the original source
//! text. Spans are stored on every AST node and every diagnostic, so the
//! common case is packed into one `u32`: 16 bits of start offset and 15 bits
//! of length. Spans that do not fit (large files, very long functions) are
//! appended to an out-of-band `SpanTable` and referenced by index, with the
//! high bit of the encoded word acting as the tag.
//!
//! Decoding never mutates anything; encoding may append to the table.

use serde::Serialize;

/// A half-open byte range `[start, start + len)` in the source text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    pub start: u32,
    pub len: u32,
}

impl Span {
    pub const EMPTY: Span = Span { start: 0, len: 0 };

    #[inline]
    pub fn new(start: u32, len: u32) -> Span {
        Span { start, len }
    }

    /// Span covering `[start, end)`.
    #[inline]
    pub fn from_bounds(start: u32, end: u32) -> Span {
        debug_assert!(end >= start);
        Span {
            start,
            len: end.saturating_sub(start),
        }
    }

    #[inline]
    pub fn end(&self) -> u32 {
        self.start + self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn contains(&self, offset: u32) -> bool {
        offset >= self.start && offset < self.end()
    }

    /// The smallest span covering both `self` and `other`.
    pub fn combine(&self, other: Span) -> Span {
        let start = self.start.min(other.start);
        let end = self.end().max(other.end());
        Span::from_bounds(start, end)
    }
}

// Packing limits for the inline encoding. A span routes to the side table as
// soon as either field reaches its limit; values exactly at the boundary must
// not be truncated.
const MAX_INLINE_START: u32 = 1 << 16;
const MAX_INLINE_LEN: u32 = 1 << 15;
const TABLE_TAG: u32 = 1 << 31;
const LEN_SHIFT: u32 = 16;

/// A span packed into a single `u32`.
///
/// Bit layout for the inline form (tag bit clear):
/// - bits 0..16: start offset
/// - bits 16..31: length
///
/// When the tag bit (bit 31) is set, the low 31 bits are an index into a
/// [`SpanTable`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct EncodedSpan(u32);

impl EncodedSpan {
    #[inline]
    pub fn is_inline(self) -> bool {
        self.0 & TABLE_TAG == 0
    }

    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// Out-of-band storage for spans too large for the inline encoding.
#[derive(Clone, Debug, Default)]
pub struct SpanTable {
    slots: Vec<Span>,
}

impl SpanTable {
    pub fn new() -> SpanTable {
        SpanTable { slots: Vec::new() }
    }

    /// Encode a span, appending to the table only when it cannot be packed
    /// inline.
    pub fn encode(&mut self, span: Span) -> EncodedSpan {
        if span.start < MAX_INLINE_START && span.len < MAX_INLINE_LEN {
            return EncodedSpan(span.start | (span.len << LEN_SHIFT));
        }
        let index = self.slots.len() as u32;
        debug_assert!(index < TABLE_TAG, "span table overflow");
        self.slots.push(span);
        EncodedSpan(index | TABLE_TAG)
    }

    /// Decode an encoded span. Never mutates.
    pub fn decode(&self, encoded: EncodedSpan) -> Span {
        if encoded.is_inline() {
            Span {
                start: encoded.0 & (MAX_INLINE_START - 1),
                len: encoded.0 >> LEN_SHIFT,
            }
        } else {
            let index = (encoded.0 & !TABLE_TAG) as usize;
            self.slots.get(index).copied().unwrap_or(Span::EMPTY)
        }
    }

    /// Number of out-of-band slots in use.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combine() {
        let a = Span::new(4, 6);
        let b = Span::new(8, 12);
        assert_eq!(a.combine(b), Span::from_bounds(4, 20));
        assert_eq!(b.combine(a), Span::from_bounds(4, 20));
    }

    #[test]
    fn test_inline_round_trip() {
        let mut table = SpanTable::new();
        for &(start, len) in &[(0, 0), (1, 1), (1234, 567), (65535, 32767)] {
            let span = Span::new(start, len);
            let encoded = table.encode(span);
            assert!(encoded.is_inline());
            assert_eq!(table.decode(encoded), span);
        }
        // The inline path never allocates a table slot.
        assert!(table.is_empty());
    }

    #[test]
    fn test_boundary_routes_to_table() {
        let mut table = SpanTable::new();

        // Exactly at the bit-width boundary: must take the table path rather
        // than silently truncate.
        let big_start = Span::new(65536, 10);
        let big_len = Span::new(10, 32768);

        let e1 = table.encode(big_start);
        let e2 = table.encode(big_len);
        assert!(!e1.is_inline());
        assert!(!e2.is_inline());
        assert_eq!(table.len(), 2);
        assert_eq!(table.decode(e1), big_start);
        assert_eq!(table.decode(e2), big_len);
    }

    #[test]
    fn test_large_round_trip() {
        let mut table = SpanTable::new();
        let span = Span::new(10_000_000, 4_000_000);
        let encoded = table.encode(span);
        assert_eq!(table.decode(encoded), span);
    }
}
