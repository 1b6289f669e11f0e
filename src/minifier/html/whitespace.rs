//! Whitespace policy.
//!
//! Text is collapsed when it arrives, but trailing whitespace is only settled
//! once the following node is known: the run stays *pending* in the buffer and
//! the next event decides whether it survives.

use super::engine::{HtmlRun, NodeType};
use crate::config::WhitespaceMinificationMode;
use crate::markup::{Tag, TagFlags};
use crate::minifier::text::{collapse_whitespace, is_html_whitespace, is_whitespace_only};

/// Name and flags of a tag bordering a whitespace run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct TagInfo {
    pub name: String,
    pub flags: TagFlags,
    pub is_start: bool,
}

impl TagInfo {
    pub fn start(tag: &Tag) -> Self {
        Self {
            name: tag.name_in_lowercase.clone(),
            flags: tag.flags,
            is_start: true,
        }
    }

    pub fn end(tag: &Tag) -> Self {
        Self {
            is_start: false,
            ..Self::start(tag)
        }
    }
}

/// What follows a pending whitespace run.
#[derive(Debug, Clone, Copy)]
pub(super) enum Next<'a> {
    Tag(&'a TagInfo),
    /// Text or a template tag.
    Content,
    /// Comment, doctype or similar.
    Other,
    EndOfDocument,
}

/// Sibling pairs whose separating whitespace renders.
pub(super) fn is_preserved_pair(previous: &str, next: &str) -> bool {
    const RUBY: [&str; 4] = ["rb", "rt", "rtc", "rp"];
    match (previous, next) {
        ("li", "li") => true,
        ("dt" | "dd", "dt" | "dd") => true,
        ("img", "figcaption") => true,
        _ => RUBY.contains(&previous) && RUBY.contains(&next),
    }
}

/// Whether whitespace next to the tag may be dropped in `mode`.
pub(super) fn can_trim_adjacent(mode: WhitespaceMinificationMode, tag: &TagInfo) -> bool {
    let flags = tag.flags;
    match mode {
        WhitespaceMinificationMode::None | WhitespaceMinificationMode::Safe => false,
        WhitespaceMinificationMode::Medium => {
            flags.intersects(TagFlags::BLOCK | TagFlags::INVISIBLE | TagFlags::NON_INDEPENDENT)
        }
        WhitespaceMinificationMode::Aggressive => {
            flags.intersects(TagFlags::BLOCK | TagFlags::INVISIBLE | TagFlags::NON_INDEPENDENT)
                || (flags.intersects(TagFlags::INLINE | TagFlags::INLINE_BLOCK)
                    && !flags.contains(TagFlags::EMPTY))
        }
    }
}

impl HtmlRun<'_> {
    #[inline]
    fn whitespace_mode(&self) -> WhitespaceMinificationMode {
        self.settings.whitespace_minification_mode
    }

    fn follows_tag(&self) -> bool {
        matches!(self.last, NodeType::StartTag | NodeType::EndTag)
    }

    fn previous_tag_trims(&self) -> bool {
        self.follows_tag()
            && self
                .prev_tag
                .as_ref()
                .is_some_and(|tag| can_trim_adjacent(self.whitespace_mode(), tag))
    }

    /// Settle the pending whitespace run against the node that follows it.
    pub(super) fn resolve_pending(&mut self, next: Next<'_>) {
        let Some(whitespace_only) = self.pending.take() else {
            return;
        };
        let mode = self.whitespace_mode();

        let trim = match next {
            Next::EndOfDocument => true,
            Next::Tag(tag) => {
                let paired = tag.is_start
                    && self
                        .prev_tag
                        .as_ref()
                        .is_some_and(|prev| is_preserved_pair(&prev.name, &tag.name));
                !paired
                    && (can_trim_adjacent(mode, tag)
                        || (whitespace_only && self.previous_tag_trims()))
            }
            Next::Content | Next::Other => whitespace_only && self.previous_tag_trims(),
        };

        if trim {
            self.buffer.truncate_trailing_whitespace();
        } else if whitespace_only {
            self.last = NodeType::Text;
            self.abandon_start_candidates();
        }
    }

    /// Plain text outside raw-text elements.
    pub(super) fn process_text(&mut self, text: &str) {
        if self.whitespace_mode() == WhitespaceMinificationMode::None || self.preserving() {
            self.write_content(text);
            return;
        }

        let collapsed = collapse_whitespace(text, self.settings.preserve_new_lines);
        if is_whitespace_only(&collapsed) {
            // A run already pending or at the document start adds nothing.
            if self.buffer.has_output() && !self.buffer.ends_with_whitespace() {
                self.buffer.push(collapsed.into_owned());
                self.pending = Some(true);
            }
            return;
        }

        self.resolve_pending(Next::Content);
        let mut content: &str = &collapsed;
        if content.starts_with(is_html_whitespace)
            && (!self.buffer.has_output()
                || self.buffer.ends_with_whitespace()
                || self.previous_tag_trims())
        {
            content = content.trim_start_matches(is_html_whitespace);
        }

        let trailing = content.ends_with(is_html_whitespace);
        self.write_content(content);
        if trailing {
            self.pending = Some(false);
        }
    }

    /// Append text that counts as element content.
    pub(super) fn write_content(&mut self, content: &str) {
        if content.is_empty() {
            return;
        }
        self.abandon_start_candidates();
        self.buffer.push(content);
        self.last = NodeType::Text;
        self.end_candidate = None;
    }
}
