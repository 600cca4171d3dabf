//! Offset-to-line/column resolution.
//!
//! The parser and resolver work exclusively in byte offsets; an embedding IDE
//! wants 1-based line/column pairs. `LineMap` records the start offset of
//! every line once (a single memchr scan) and resolves offsets on demand with
//! a binary search.

use memchr::memchr_iter;
use serde::Serialize;

/// A 1-based line/column pair, the form surfaced to human-facing consumers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

/// A 0-based line/character pair, the form LSP-style consumers expect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

/// Table of line start offsets for one source text.
#[derive(Clone, Debug)]
pub struct LineMap {
    /// Byte offset of the first character of each line. Always starts with 0.
    line_starts: Vec<u32>,
    /// Total length of the source, used to clamp out-of-range offsets.
    text_len: u32,
}

impl LineMap {
    /// Build the line table for `text`. Recognizes `\n`, `\r\n`, and lone
    /// `\r` line terminators.
    pub fn new(text: &str) -> LineMap {
        let bytes = text.as_bytes();
        let mut line_starts = vec![0u32];

        // `\n` handles both `\n` and `\r\n`; lone `\r` needs a second scan.
        for pos in memchr_iter(b'\n', bytes) {
            line_starts.push(pos as u32 + 1);
        }
        for pos in memchr_iter(b'\r', bytes) {
            if bytes.get(pos + 1) != Some(&b'\n') {
                line_starts.push(pos as u32 + 1);
            }
        }
        line_starts.sort_unstable();
        line_starts.dedup();

        LineMap {
            line_starts,
            text_len: bytes.len() as u32,
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Byte offset where the given 0-based line begins.
    pub fn line_start(&self, line: usize) -> Option<u32> {
        self.line_starts.get(line).copied()
    }

    /// Resolve a byte offset to a 1-based line/column pair.
    pub fn location(&self, offset: u32) -> Location {
        let offset = offset.min(self.text_len);
        let line = self.line_index(offset);
        Location {
            line: line as u32 + 1,
            column: offset - self.line_starts[line] + 1,
        }
    }

    /// Resolve a byte offset to a 0-based line/character pair.
    pub fn position(&self, offset: u32) -> Position {
        let offset = offset.min(self.text_len);
        let line = self.line_index(offset);
        Position {
            line: line as u32,
            character: offset - self.line_starts[line],
        }
    }

    fn line_index(&self, offset: u32) -> usize {
        // partition_point returns the first line starting after `offset`.
        self.line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line() {
        let map = LineMap::new("var x = 1;");
        assert_eq!(map.line_count(), 1);
        assert_eq!(map.location(0), Location { line: 1, column: 1 });
        assert_eq!(map.location(4), Location { line: 1, column: 5 });
    }

    #[test]
    fn test_multi_line() {
        let map = LineMap::new("a\nbb\nccc\n");
        assert_eq!(map.line_count(), 4);
        assert_eq!(map.location(0), Location { line: 1, column: 1 });
        assert_eq!(map.location(2), Location { line: 2, column: 1 });
        assert_eq!(map.location(3), Location { line: 2, column: 2 });
        assert_eq!(map.location(5), Location { line: 3, column: 1 });
    }

    #[test]
    fn test_crlf_and_lone_cr() {
        let map = LineMap::new("a\r\nb\rc");
        assert_eq!(map.line_count(), 3);
        assert_eq!(map.location(3), Location { line: 2, column: 1 });
        assert_eq!(map.location(5), Location { line: 3, column: 1 });
    }

    #[test]
    fn test_offset_past_end_clamps() {
        let map = LineMap::new("ab");
        assert_eq!(map.location(100), Location { line: 1, column: 3 });
    }

    #[test]
    fn test_zero_based_position() {
        let map = LineMap::new("a\nb");
        assert_eq!(
            map.position(2),
            Position {
                line: 1,
                character: 0
            }
        );
    }
}
