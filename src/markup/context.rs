use super::NodeCoordinates;

/// Where the token source currently is: the whole source text, and the
/// position of the node being reported.
#[derive(Debug, Clone, Copy)]
pub struct MarkupParsingContext<'a> {
    source: &'a str,
    coordinates: NodeCoordinates,
    position: usize,
    length: usize,
}

impl<'a> MarkupParsingContext<'a> {
    pub const fn new(
        source: &'a str,
        coordinates: NodeCoordinates,
        position: usize,
        length: usize,
    ) -> Self {
        Self {
            source,
            coordinates,
            position,
            length,
        }
    }

    /// Full source text of the document being parsed.
    #[inline]
    pub const fn source(&self) -> &'a str {
        self.source
    }

    /// Absolute coordinates of the current node.
    #[inline]
    pub const fn coordinates(&self) -> NodeCoordinates {
        self.coordinates
    }

    /// Byte offset of the current node.
    #[inline]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Byte length of the current node.
    #[inline]
    pub const fn length(&self) -> usize {
        self.length
    }

    /// Raw source text of the current node.
    pub fn node_source(&self) -> &'a str {
        let end = (self.position + self.length).min(self.source.len());
        self.source.get(self.position..end).unwrap_or_default()
    }

    #[inline]
    pub const fn is_at_document_start(&self) -> bool {
        self.position == 0
    }

    #[inline]
    pub const fn is_at_document_end(&self) -> bool {
        self.position + self.length >= self.source.len()
    }
}
