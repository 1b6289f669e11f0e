//! Per-call state machine of the HTML minifier.
//!
//! One `HtmlRun` lives for exactly one `minify` call. It receives the parser
//! events, writes into an `OutputBuffer` and keeps just enough history
//! (the last start tag, the last end tag, a pending whitespace run) to take
//! back output that a later event proves redundant.
//!
//! Retraction only ever targets fragments written after the last flush.
//! The buffer is flushed right before a start tag that follows a non-start
//! node, unless that start tag may still vanish as an empty element; then
//! the end tag in front of it stays undecided until the element either
//! gets content or is removed.

use super::HtmlMinifier;
use super::whitespace::{Next, TagInfo};
use crate::config::{HtmlSettings, WhitespaceMinificationMode};
use crate::markup::{MarkupParsingContext, NodeCoordinates, Tag, TagFlags, metadata, optional};
use crate::minifier::text::normalize_whitespace;
use crate::minifier::{Diagnostic, ErrorCategory, OutputBuffer, Outcome};
use crate::parser::{ConditionalCommentType, HtmlConditionalComment, HtmlParser, MarkupHandler};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum NodeType {
    Unknown,
    XmlDeclaration,
    Doctype,
    Comment,
    IfConditionalComment,
    EndIfConditionalComment,
    StartTag,
    EndTag,
    Text,
    TemplateTag,
}

/// A removable start tag that may still turn out to enclose nothing.
#[derive(Debug)]
pub(super) struct StartCandidate {
    name: String,
    index: usize,
    count: usize,
    last_before: NodeType,
    prev_tag_before: Option<TagInfo>,
    /// End tag right in front of this one, neither kept nor retracted yet.
    end_before: Option<EndCandidate>,
}

/// An end tag with nothing but whitespace after it.
#[derive(Debug)]
pub(super) struct EndCandidate {
    name: String,
    index: usize,
}

pub(super) struct HtmlRun<'m> {
    pub minifier: &'m HtmlMinifier,
    pub settings: &'m HtmlSettings,
    pub buffer: OutputBuffer,
    pub last: NodeType,
    /// Last start or end tag written.
    pub prev_tag: Option<TagInfo>,
    /// A whitespace run at the end of the buffer awaits the next node;
    /// `true` when the run is a text node of its own.
    pub pending: Option<bool>,
    /// Nested start tags with nothing written after them, outermost first.
    start_candidates: Vec<StartCandidate>,
    pub end_candidate: Option<EndCandidate>,
    /// Lowercase names of open elements.
    open: Vec<String>,
    /// Raw-text element whose body comes next.
    raw_body: Option<Tag>,
    /// `<svg/>` style tag whose end event was already rendered.
    closed_by_slash: Option<String>,
    pub warnings: Vec<Diagnostic>,
}

impl<'m> HtmlRun<'m> {
    pub fn new(minifier: &'m HtmlMinifier, settings: &'m HtmlSettings) -> Self {
        Self {
            minifier,
            settings,
            buffer: OutputBuffer::new(),
            last: NodeType::Unknown,
            prev_tag: None,
            pending: None,
            start_candidates: Vec::new(),
            end_candidate: None,
            open: Vec::new(),
            raw_body: None,
            closed_by_slash: None,
            warnings: Vec::new(),
        }
    }

    /// Parse and minify `content`. Diagnostics are relative to `content`.
    pub fn execute(mut self, content: &str) -> Outcome {
        let parser = HtmlParser::new().with_template_tags(self.settings.process_template_tags);
        if let Err(error) = parser.parse(content, &mut self) {
            return Outcome::failed(
                Diagnostic::from_parse_error(ErrorCategory::HtmlParsingError, &error),
                self.warnings,
            );
        }
        self.finish()
    }

    fn finish(mut self) -> Outcome {
        self.resolve_pending(Next::EndOfDocument);
        self.abandon_start_candidates();
        if let Some(end) = self.end_candidate.take() {
            if self.can_remove_end_tag_at_document_end(&end.name) {
                self.buffer.remove_range(end.index, 1);
            }
        }

        let minify_whitespace =
            self.settings.whitespace_minification_mode != WhitespaceMinificationMode::None;
        if minify_whitespace {
            self.buffer.truncate_trailing_whitespace();
        }
        let mut content = self.buffer.finish();
        if minify_whitespace {
            let trimmed = content.trim_end().len();
            content.truncate(trimmed);
        }

        Outcome {
            content,
            errors: Vec::new(),
            warnings: self.warnings,
        }
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    #[inline]
    pub fn is_xhtml(&self) -> bool {
        self.minifier.xhtml
    }

    /// Inside `pre`, `textarea` or `listing`.
    pub fn preserving(&self) -> bool {
        self.open.iter().any(|name| metadata::preserves_whitespace(name))
    }

    /// Tag name as it should be written.
    pub fn rendered_name<'t>(&self, tag: &'t Tag) -> &'t str {
        if self.settings.preserve_case || self.is_xhtml() || tag.has_flags(TagFlags::XML) {
            &tag.name
        } else {
            &tag.name_in_lowercase
        }
    }

    /// Output that is not element content but still separates tags.
    fn write_other(&mut self, fragment: String, node: NodeType) {
        self.resolve_pending(Next::Other);
        self.abandon_start_candidates();
        self.buffer.push(fragment);
        self.last = node;
        self.end_candidate = None;
    }

    /// The open candidates got content: keep them, and settle the end tag
    /// in front of the outermost one.
    pub fn abandon_start_candidates(&mut self) {
        let Some(outer) = std::mem::take(&mut self.start_candidates).into_iter().next() else {
            return;
        };
        if let Some(end) = outer.end_before {
            if self.can_remove_end_tag_before(&end.name, &outer.name) {
                self.buffer.remove_range(end.index, 1);
            }
        }
    }

    pub fn warn(&mut self, category: ErrorCategory, message: impl Into<String>, at: NodeCoordinates) {
        self.warnings.push(Diagnostic::new(category, message, at));
    }

    /// Pop the elements `next` closes implicitly. True if there were any.
    fn close_implied(&mut self, next: &str) -> bool {
        let depth = self.open.len();
        while self
            .open
            .last()
            .is_some_and(|open| optional::implicitly_closed_by(open, next))
        {
            self.open.pop();
        }
        self.open.len() < depth
    }

    fn close_element(&mut self, name: &str) {
        if let Some(index) = self.open.iter().rposition(|open| open == name) {
            self.open.truncate(index);
        }
    }
}

impl MarkupHandler for HtmlRun<'_> {
    fn xml_declaration(&mut self, ctx: &MarkupParsingContext<'_>, text: &str) {
        if !self.is_xhtml() {
            self.warn(
                ErrorCategory::HtmlMinificationWarning,
                "XML declaration is not allowed in HTML and was removed",
                ctx.coordinates(),
            );
            return;
        }
        let declaration = text
            .strip_prefix("<?")
            .and_then(|s| s.strip_suffix("?>"))
            .map_or_else(|| normalize_whitespace(text), |body| format!("<?{}?>", normalize_whitespace(body)));
        self.write_other(declaration, NodeType::XmlDeclaration);
    }

    fn doctype(&mut self, _ctx: &MarkupParsingContext<'_>, text: &str) {
        let doctype = if self.settings.use_short_doctype {
            self.settings.custom_short_doctype.trim().to_owned()
        } else {
            normalize_whitespace(text)
        };
        self.write_other(doctype, NodeType::Doctype);
    }

    fn comment(&mut self, ctx: &MarkupParsingContext<'_>, text: &str) {
        if let Some(comment) = self.process_comment(text, ctx.coordinates().advance("<!--")) {
            self.write_other(format!("<!--{comment}-->"), NodeType::Comment);
        }
    }

    fn if_conditional_comment(
        &mut self,
        _ctx: &MarkupParsingContext<'_>,
        comment: &HtmlConditionalComment,
    ) {
        let (start, end) = comment.comment_type.start_delimiters();
        let expression = normalize_whitespace(&comment.expression);
        self.write_other(format!("{start}{expression}{end}"), NodeType::IfConditionalComment);
    }

    fn end_if_conditional_comment(
        &mut self,
        _ctx: &MarkupParsingContext<'_>,
        comment_type: ConditionalCommentType,
    ) {
        self.write_other(
            comment_type.end_delimiter().to_owned(),
            NodeType::EndIfConditionalComment,
        );
    }

    fn start_tag(&mut self, _ctx: &MarkupParsingContext<'_>, tag: Tag) {
        let tag = if self.settings.use_meta_charset_tag && !self.is_xhtml() {
            super::attributes::upgrade_meta_charset(tag)
        } else {
            tag
        };
        let info = TagInfo::start(&tag);
        let name = tag.name_in_lowercase.clone();

        self.resolve_pending(Next::Tag(&info));
        let closes_open = self.close_implied(&name);
        let closed_by_slash = tag.self_closing
            && !tag.has_flags(TagFlags::EMPTY)
            && (tag.has_flags(TagFlags::XML) || self.is_xhtml());
        // An element that ends another one implicitly is never removed.
        let removable = self.settings.remove_tags_without_content
            && !closed_by_slash
            && !closes_open
            && super::optional_tags::can_remove_without_content(&tag);

        let mut end_before = None;
        if self.last == NodeType::StartTag {
            if !removable {
                self.abandon_start_candidates();
            }
        } else {
            self.abandon_start_candidates();
            let end = self.end_candidate.take();
            if removable && end.is_some() {
                end_before = end;
            } else {
                if let Some(end) = end {
                    if self.can_remove_end_tag_before(&end.name, &name) {
                        self.buffer.remove_range(end.index, 1);
                    }
                }
                self.buffer.flush();
            }
        }
        self.end_candidate = None;

        let last_before = self.last;
        let prev_tag_before = self.prev_tag.take();
        let fragments = self.render_start_tag(&tag);
        let index = self.buffer.len();
        let count = fragments.len();
        for fragment in fragments {
            self.buffer.push(fragment);
        }

        if closed_by_slash {
            if tag.has_flags(TagFlags::XML) {
                self.closed_by_slash = Some(name.clone());
            }
        } else if !tag.has_flags(TagFlags::EMPTY) {
            if removable {
                self.start_candidates.push(StartCandidate {
                    name: name.clone(),
                    index,
                    count,
                    last_before,
                    prev_tag_before,
                    end_before,
                });
            }
            self.open.push(name.clone());
            if metadata::is_raw_text(&name) {
                self.raw_body = Some(tag);
            }
        }

        self.last = NodeType::StartTag;
        self.prev_tag = Some(info);
    }

    fn end_tag(&mut self, _ctx: &MarkupParsingContext<'_>, tag: Tag) {
        let name = tag.name_in_lowercase.clone();
        if self.closed_by_slash.as_deref() == Some(name.as_str()) {
            self.closed_by_slash = None;
            self.last = NodeType::EndTag;
            self.prev_tag = Some(TagInfo::end(&tag));
            return;
        }
        self.raw_body = None;

        let info = TagInfo::end(&tag);
        self.resolve_pending(Next::Tag(&info));
        self.close_element(&name);

        let empty = self.last == NodeType::StartTag
            && self.start_candidates.last().is_some_and(|start| start.name == name);
        if empty {
            if let Some(start) = self.start_candidates.pop() {
                self.buffer.remove_range(start.index, start.count);
                self.last = start.last_before;
                self.prev_tag = start.prev_tag_before;
                self.end_candidate = start.end_before;
                return;
            }
        }
        self.abandon_start_candidates();

        if let Some(end) = self.end_candidate.take() {
            if self.can_remove_end_tag_in(&end.name, &name) {
                self.buffer.remove_range(end.index, 1);
            }
        }

        let index = self.buffer.len();
        self.buffer.push(format!("</{}>", self.rendered_name(&tag)));
        self.end_candidate = Some(EndCandidate { name, index });
        self.last = NodeType::EndTag;
        self.prev_tag = Some(info);
    }

    fn text(&mut self, ctx: &MarkupParsingContext<'_>, text: &str) {
        match self.raw_body.take() {
            Some(tag) => self.process_raw_body(ctx, &tag, text),
            None => self.process_text(text),
        }
    }

    fn template_tag(
        &mut self,
        ctx: &MarkupParsingContext<'_>,
        expression: &str,
        start_delimiter: &str,
        end_delimiter: &str,
    ) {
        self.resolve_pending(Next::Content);
        let expression = if self.settings.minify_angular_binding_expressions {
            let offset = ctx.coordinates().advance(start_delimiter);
            self.minify_binding_expression(expression, offset)
        } else {
            expression.to_owned()
        };
        self.write_content(&format!("{start_delimiter}{expression}{end_delimiter}"));
        self.last = NodeType::TemplateTag;
    }

    fn cdata(&mut self, _ctx: &MarkupParsingContext<'_>, text: &str) {
        self.resolve_pending(Next::Content);
        self.write_content(&format!("<![CDATA[{text}]]>"));
    }

    fn processing_instruction(&mut self, _ctx: &MarkupParsingContext<'_>, text: &str) {
        self.write_other(text.to_owned(), NodeType::Comment);
    }
}
