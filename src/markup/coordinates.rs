//! Line/column positions and the mapping of nested positions back to the document.
//!
//! Every diagnostic the engine produces is expressed in 1-based line and column
//! numbers of the outermost document. Code that is minified out of line (script
//! bodies, inline styles, template islands) reports positions relative to its
//! own start, so those positions are composed with the position of the
//! enclosing node before they leave the engine.

use std::fmt;

/// A 1-based `(line, column)` pair. Columns count characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NodeCoordinates {
    pub line: usize,
    pub column: usize,
}

impl NodeCoordinates {
    /// Sentinel for "no enclosing node".
    pub const EMPTY: Self = Self { line: 0, column: 0 };

    /// Start of a document.
    pub const START: Self = Self { line: 1, column: 1 };

    #[inline]
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.line == 0 && self.column == 0
    }

    /// Translate `inner` (relative to the content start of a node located at
    /// `outer`) into absolute coordinates.
    ///
    /// Positions on the first inner line are shifted by the outer column;
    /// positions on later lines keep their own column.
    pub fn compose(outer: Self, inner: Self) -> Self {
        if outer.is_empty() {
            return inner;
        }
        if inner.is_empty() {
            return outer;
        }

        if inner.line == 1 {
            Self::new(outer.line, outer.column + inner.column - 1)
        } else {
            Self::new(outer.line + inner.line - 1, inner.column)
        }
    }

    /// Coordinates reached after consuming `text` starting from `self`.
    pub fn advance(self, text: &str) -> Self {
        let mut line = self.line.max(1);
        let mut column = self.column.max(1);
        let mut chars = text.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '\n' => {
                    line += 1;
                    column = 1;
                }
                '\r' => {
                    // `\r\n` counts once
                    if chars.peek() != Some(&'\n') {
                        line += 1;
                        column = 1;
                    }
                }
                _ => column += 1,
            }
        }

        Self::new(line, column)
    }

    /// Coordinates of byte `offset` within `source`.
    #[inline]
    pub fn at_offset(source: &str, offset: usize) -> Self {
        let offset = floor_char_boundary(source, offset);
        Self::START.advance(&source[..offset])
    }
}

impl fmt::Display for NodeCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Precomputed line starts for repeated offset → coordinates lookups.
#[derive(Debug, Clone)]
pub struct LineIndex<'a> {
    source: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    pub fn new(source: &'a str) -> Self {
        let bytes = source.as_bytes();
        let mut line_starts = vec![0];
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\n' => line_starts.push(i + 1),
                b'\r' if bytes.get(i + 1) != Some(&b'\n') => line_starts.push(i + 1),
                _ => {}
            }
            i += 1;
        }
        Self {
            source,
            line_starts,
        }
    }

    /// Coordinates of byte `offset`.
    pub fn coordinates(&self, offset: usize) -> NodeCoordinates {
        let offset = floor_char_boundary(self.source, offset);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(next) => next - 1,
        };
        let line_start = self.line_starts[line];
        let column = self.source[line_start..offset].chars().count() + 1;
        NodeCoordinates::new(line + 1, column)
    }
}

/// Largest char boundary `<= offset`.
fn floor_char_boundary(source: &str, offset: usize) -> usize {
    let mut offset = offset.min(source.len());
    while offset > 0 && !source.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_same_line() {
        let outer = NodeCoordinates::new(10, 5);
        let inner = NodeCoordinates::new(1, 3);
        assert_eq!(NodeCoordinates::compose(outer, inner), NodeCoordinates::new(10, 7));
    }

    #[test]
    fn test_compose_later_line_keeps_inner_column() {
        let outer = NodeCoordinates::new(10, 5);
        let inner = NodeCoordinates::new(3, 2);
        assert_eq!(NodeCoordinates::compose(outer, inner), NodeCoordinates::new(12, 2));
    }

    #[test]
    fn test_compose_with_empty_sides() {
        let c = NodeCoordinates::new(4, 4);
        assert_eq!(NodeCoordinates::compose(NodeCoordinates::EMPTY, c), c);
        assert_eq!(NodeCoordinates::compose(c, NodeCoordinates::EMPTY), c);
    }

    #[test]
    fn test_compose_twice_matches_flat_offset() {
        // document -> script body -> error inside body
        let source = "<p>\n  <script>\nvar a;\n  x(</script>";
        let body_start = source.find("\nvar").unwrap();
        let body = &source[body_start..source.find("</script>").unwrap()];
        let error_in_body = NodeCoordinates::at_offset(body, body.find("x(").unwrap());

        let body_coords = NodeCoordinates::at_offset(source, body_start);
        let composed = NodeCoordinates::compose(body_coords, error_in_body);

        assert_eq!(composed, NodeCoordinates::at_offset(source, source.find("x(").unwrap()));
    }

    #[test]
    fn test_advance_counts_crlf_once() {
        let c = NodeCoordinates::START.advance("ab\r\ncd\ne");
        assert_eq!(c, NodeCoordinates::new(3, 2));
    }

    #[test]
    fn test_columns_count_chars() {
        let c = NodeCoordinates::at_offset("héllo", "héllo".find('l').unwrap());
        assert_eq!(c, NodeCoordinates::new(1, 3));
    }

    #[test]
    fn test_line_index_matches_at_offset() {
        let source = "one\ntwo\r\nthree\rfour";
        let index = LineIndex::new(source);
        for offset in 0..=source.len() {
            // between `\r` and `\n` is not a position anything reports
            if source[..offset].ends_with('\r') && source[offset..].starts_with('\n') {
                continue;
            }
            assert_eq!(
                index.coordinates(offset),
                NodeCoordinates::at_offset(source, offset),
                "offset {offset}"
            );
        }
    }
}
