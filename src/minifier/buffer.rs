//! Backtrackable output buffer.
//!
//! Output is collected as a list of fragments so that a tag emitted a few
//! tokens ago can still be retracted once later input shows it is
//! redundant. `flush` moves the fragments into the final string; nothing
//! before the last flush is ever touched again.

use super::text::is_html_whitespace;

#[derive(Debug, Default)]
pub(crate) struct OutputBuffer {
    fragments: Vec<String>,
    result: String,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fragment. Empty fragments are ignored.
    pub fn push(&mut self, fragment: impl Into<String>) {
        let fragment = fragment.into();
        if !fragment.is_empty() {
            self.fragments.push(fragment);
        }
    }

    /// Fragments not yet flushed.
    #[inline]
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    #[inline]
    pub fn last(&self) -> Option<&str> {
        self.fragments.last().map(String::as_str)
    }

    pub fn last_mut(&mut self) -> Option<&mut String> {
        self.fragments.last_mut()
    }

    /// Drop `count` fragments starting at `start`.
    pub fn remove_range(&mut self, start: usize, count: usize) {
        let end = (start + count).min(self.fragments.len());
        if start < end {
            self.fragments.drain(start..end);
        }
    }

    /// Remove whitespace at the end of the unflushed fragments.
    pub fn truncate_trailing_whitespace(&mut self) {
        while let Some(last) = self.fragments.last_mut() {
            let trimmed = last.trim_end_matches(is_html_whitespace).len();
            if trimmed > 0 {
                last.truncate(trimmed);
                return;
            }
            self.fragments.pop();
        }
    }

    /// Last character written, flushed or not.
    pub fn last_char(&self) -> Option<char> {
        self.fragments
            .iter()
            .rev()
            .find_map(|f| f.chars().last())
            .or_else(|| self.result.chars().last())
    }

    pub fn ends_with_whitespace(&self) -> bool {
        self.last_char().is_some_and(is_html_whitespace)
    }

    /// Whether anything at all has been written.
    pub fn has_output(&self) -> bool {
        !self.fragments.is_empty() || !self.result.is_empty()
    }

    /// Commit pending fragments to the result.
    pub fn flush(&mut self) {
        for fragment in self.fragments.drain(..) {
            self.result.push_str(&fragment);
        }
    }

    /// Flush and hand out the result.
    pub fn finish(mut self) -> String {
        self.flush();
        self.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_ignores_empty() {
        let mut buffer = OutputBuffer::new();
        buffer.push("");
        buffer.push("<p");
        buffer.push(">");
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.last(), Some(">"));
    }

    #[test]
    fn test_remove_range() {
        let mut buffer = OutputBuffer::new();
        for f in ["<div", ">", "a", "</p>", "<p", " class=x", ">"] {
            buffer.push(f);
        }
        buffer.remove_range(4, 3);
        buffer.remove_range(3, 1);
        buffer.remove_range(9, 2);
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.finish(), "<div>a");
    }

    #[test]
    fn test_remove_range_ignores_flushed() {
        let mut buffer = OutputBuffer::new();
        buffer.push("</li>");
        buffer.flush();
        buffer.push("<li");
        buffer.remove_range(0, 1);
        assert_eq!(buffer.finish(), "</li>");
    }

    #[test]
    fn test_truncate_trailing_whitespace() {
        let mut buffer = OutputBuffer::new();
        buffer.push("a");
        buffer.push("b \n");
        buffer.push("  ");
        buffer.truncate_trailing_whitespace();
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.finish(), "ab");
    }

    #[test]
    fn test_trailing_whitespace_stops_at_flush_point() {
        let mut buffer = OutputBuffer::new();
        buffer.push("a ");
        buffer.flush();
        buffer.push(" ");
        buffer.truncate_trailing_whitespace();
        assert!(buffer.ends_with_whitespace());
        assert_eq!(buffer.finish(), "a ");
    }

    #[test]
    fn test_last_char_falls_back_to_result() {
        let mut buffer = OutputBuffer::new();
        assert_eq!(buffer.last_char(), None);
        buffer.push("ab");
        buffer.flush();
        assert_eq!(buffer.last_char(), Some('b'));
        assert!(buffer.has_output());
    }
}
