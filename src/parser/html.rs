//! Hand-written HTML tokenizer.
//!
//! Scans the source once, byte-wise, with `memchr` for the hot searches. It
//! keeps just enough of an open-element stack to validate end tags and to
//! know which optional elements were implicitly closed; it never builds a tree.

use memchr::{memchr, memchr2, memmem};

use super::{ConditionalCommentType, HtmlConditionalComment, MarkupHandler, ParseError};
use crate::markup::{
    Attribute, Attributes, LineIndex, MarkupParsingContext, NodeCoordinates, Tag, TagFlags,
    metadata, optional,
};

/// HTML token source.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlParser {
    process_template_tags: bool,
}

impl HtmlParser {
    pub const fn new() -> Self {
        Self {
            process_template_tags: false,
        }
    }

    /// Recognise `{{ … }}` and `{{{ … }}}` in text.
    pub const fn with_template_tags(mut self, enabled: bool) -> Self {
        self.process_template_tags = enabled;
        self
    }

    pub fn parse<H: MarkupHandler + ?Sized>(
        &self,
        source: &str,
        handler: &mut H,
    ) -> Result<(), ParseError> {
        Tokenizer {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            lines: LineIndex::new(source),
            templates: self.process_template_tags,
            open: Vec::new(),
            conditionals: Vec::new(),
            handler,
        }
        .run()
    }
}

struct Tokenizer<'a, 'h, H: ?Sized> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
    lines: LineIndex<'a>,
    templates: bool,
    /// Lowercase names of open non-void elements.
    open: Vec<String>,
    /// Open conditional comments and where they started.
    conditionals: Vec<(ConditionalCommentType, usize)>,
    handler: &'h mut H,
}

impl<'a, H: MarkupHandler + ?Sized> Tokenizer<'a, '_, H> {
    fn run(mut self) -> Result<(), ParseError> {
        while self.pos < self.bytes.len() {
            if self.starts_markup(self.pos) {
                self.markup()?;
            } else {
                let end = self.next_markup(self.pos + 1);
                self.emit_text(self.pos, end);
                self.pos = end;
            }
        }

        if let Some(&(_, start)) = self.conditionals.last() {
            return Err(self.error("Unclosed conditional comment", start));
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    fn context(&self, start: usize, end: usize) -> MarkupParsingContext<'a> {
        MarkupParsingContext::new(self.source, self.lines.coordinates(start), start, end - start)
    }

    fn coordinates(&self, offset: usize) -> NodeCoordinates {
        self.lines.coordinates(offset)
    }

    fn error(&self, message: impl Into<String>, at: usize) -> ParseError {
        ParseError::new(message, self.coordinates(at), at)
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn skip_whitespace(&self, mut i: usize) -> usize {
        while self.bytes.get(i).is_some_and(u8::is_ascii_whitespace) {
            i += 1;
        }
        i
    }

    /// First index `>= i` holding whitespace or one of `stops`.
    fn scan_until(&self, mut i: usize, stops: &[u8]) -> usize {
        while let Some(b) = self.bytes.get(i) {
            if b.is_ascii_whitespace() || stops.contains(b) {
                break;
            }
            i += 1;
        }
        i
    }

    fn find(&self, from: usize, needle: &str) -> Option<usize> {
        memmem::find(&self.bytes[from..], needle.as_bytes()).map(|rel| from + rel)
    }

    fn starts_markup(&self, at: usize) -> bool {
        match self.bytes[at] {
            b'<' => match self.bytes.get(at + 1) {
                Some(b) if b.is_ascii_alphabetic() => true,
                Some(b'!' | b'?') => true,
                Some(b'/') => self.bytes.get(at + 2).is_some_and(u8::is_ascii_alphabetic),
                _ => false,
            },
            b'{' => self.templates && self.bytes.get(at + 1) == Some(&b'{'),
            _ => false,
        }
    }

    fn next_markup(&self, mut i: usize) -> usize {
        loop {
            let rest = self.bytes.get(i..).unwrap_or_default();
            let found = if self.templates {
                memchr2(b'<', b'{', rest)
            } else {
                memchr(b'<', rest)
            };
            let Some(rel) = found else {
                return self.bytes.len();
            };
            if self.starts_markup(i + rel) {
                return i + rel;
            }
            i += rel + 1;
        }
    }

    fn emit_text(&mut self, start: usize, end: usize) {
        if end > start {
            let ctx = self.context(start, end);
            self.handler.text(&ctx, &self.source[start..end]);
        }
    }

    // ------------------------------------------------------------------------
    // Markup constructs
    // ------------------------------------------------------------------------

    fn markup(&mut self) -> Result<(), ParseError> {
        let rest = self.rest();
        if rest.starts_with('{') {
            self.template_tag()
        } else if rest.starts_with("<!--") {
            self.comment()
        } else if rest.starts_with("<![") {
            self.bracketed()
        } else if rest.len() >= 9 && rest[..9].eq_ignore_ascii_case("<!doctype") {
            self.doctype()
        } else if rest.starts_with("<!") {
            self.bogus_comment(2)
        } else if rest.starts_with("<?") {
            self.processing_instruction()
        } else if rest.starts_with("</") {
            self.end_tag()
        } else {
            self.start_tag()
        }
    }

    fn template_tag(&mut self) -> Result<(), ParseError> {
        let start = self.pos;
        let (open, close) = if self.rest().starts_with("{{{") {
            ("{{{", "}}}")
        } else {
            ("{{", "}}")
        };
        let expr_start = start + open.len();
        let expr_end = self
            .find(expr_start, close)
            .ok_or_else(|| self.error("Unterminated template tag", start))?;
        let end = expr_end + close.len();

        let ctx = self.context(start, end);
        self.handler
            .template_tag(&ctx, &self.source[expr_start..expr_end], open, close);
        self.pos = end;
        Ok(())
    }

    fn comment(&mut self) -> Result<(), ParseError> {
        let start = self.pos;
        if self.rest().starts_with("<!--[if") {
            return self.if_conditional_comment(start + "<!--[if".len(), false);
        }
        if self.rest().starts_with("<!--<![endif]-->") {
            return self.end_if_conditional_comment("<!--<![endif]-->", |t| {
                matches!(
                    t,
                    ConditionalCommentType::RevealedValidating
                        | ConditionalCommentType::RevealedValidatingSimplified
                )
            });
        }

        let body_start = start + 4;
        let body_end = self
            .find(body_start, "-->")
            .ok_or_else(|| self.error("Unterminated comment", start))?;
        let end = body_end + 3;

        let ctx = self.context(start, end);
        self.handler.comment(&ctx, &self.source[body_start..body_end]);
        self.pos = end;
        Ok(())
    }

    fn if_conditional_comment(&mut self, expr_start: usize, revealed: bool) -> Result<(), ParseError> {
        let start = self.pos;
        let expr_end = self
            .find(expr_start, "]>")
            .ok_or_else(|| self.error("Unterminated conditional comment", start))?;
        let mut end = expr_end + 2;

        let after = &self.source[end..];
        let comment_type = if revealed {
            ConditionalCommentType::Revealed
        } else if after.starts_with("<!-->") {
            end += 5;
            ConditionalCommentType::RevealedValidating
        } else if after.starts_with("-->") {
            end += 3;
            ConditionalCommentType::RevealedValidatingSimplified
        } else {
            ConditionalCommentType::Hidden
        };

        let comment = HtmlConditionalComment {
            comment_type,
            expression: self.source[expr_start..expr_end].trim().to_owned(),
        };
        let ctx = self.context(start, end);
        self.handler.if_conditional_comment(&ctx, &comment);
        self.conditionals.push((comment_type, start));
        self.pos = end;
        Ok(())
    }

    fn end_if_conditional_comment(
        &mut self,
        delimiter: &str,
        accepts: impl Fn(ConditionalCommentType) -> bool,
    ) -> Result<(), ParseError> {
        let start = self.pos;
        let comment_type = match self.conditionals.last() {
            Some(&(t, _)) if accepts(t) => t,
            _ => return Err(self.error("Unexpected end of conditional comment", start)),
        };
        self.conditionals.pop();

        let end = start + delimiter.len();
        let ctx = self.context(start, end);
        self.handler.end_if_conditional_comment(&ctx, comment_type);
        self.pos = end;
        Ok(())
    }

    /// `<![if …]>`, `<![endif]…>` and `<![CDATA[…]]>`.
    fn bracketed(&mut self) -> Result<(), ParseError> {
        let start = self.pos;
        let rest = self.rest();

        if rest.starts_with("<![endif]-->") {
            self.end_if_conditional_comment("<![endif]-->", |t| {
                t == ConditionalCommentType::Hidden
            })
        } else if rest.starts_with("<![endif]>") {
            self.end_if_conditional_comment("<![endif]>", |t| {
                t == ConditionalCommentType::Revealed
            })
        } else if rest.starts_with("<![if") {
            self.if_conditional_comment(start + "<![if".len(), true)
        } else if rest.starts_with("<![CDATA[") {
            let body_start = start + "<![CDATA[".len();
            let body_end = self
                .find(body_start, "]]>")
                .ok_or_else(|| self.error("Unterminated CDATA section", start))?;
            let end = body_end + 3;
            let ctx = self.context(start, end);
            self.handler.cdata(&ctx, &self.source[body_start..body_end]);
            self.pos = end;
            Ok(())
        } else {
            self.bogus_comment(2)
        }
    }

    fn doctype(&mut self) -> Result<(), ParseError> {
        let start = self.pos;
        let end = self
            .find(start, ">")
            .ok_or_else(|| self.error("Unterminated doctype", start))?
            + 1;
        let ctx = self.context(start, end);
        self.handler.doctype(&ctx, &self.source[start..end]);
        self.pos = end;
        Ok(())
    }

    /// `<!…>` that is not a real comment.
    fn bogus_comment(&mut self, skip: usize) -> Result<(), ParseError> {
        let start = self.pos;
        let body_end = self
            .find(start, ">")
            .ok_or_else(|| self.error("Unterminated comment", start))?;
        let end = body_end + 1;
        let ctx = self.context(start, end);
        self.handler
            .comment(&ctx, &self.source[(start + skip).min(body_end)..body_end]);
        self.pos = end;
        Ok(())
    }

    fn processing_instruction(&mut self) -> Result<(), ParseError> {
        let start = self.pos;
        let rest = self.rest();
        let is_declaration = rest.starts_with("<?xml")
            && rest[5..]
                .bytes()
                .next()
                .is_some_and(|b| b.is_ascii_whitespace() || b == b'?');

        let end = if is_declaration {
            self.find(start, "?>").map(|i| i + 2)
        } else {
            self.find(start, ">").map(|i| i + 1)
        }
        .ok_or_else(|| self.error("Unterminated processing instruction", start))?;

        let ctx = self.context(start, end);
        let text = &self.source[start..end];
        if is_declaration {
            self.handler.xml_declaration(&ctx, text);
        } else {
            self.handler.processing_instruction(&ctx, text);
        }
        self.pos = end;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Tags
    // ------------------------------------------------------------------------

    fn end_tag(&mut self) -> Result<(), ParseError> {
        let start = self.pos;
        let name_end = self.scan_until(start + 2, b"/>");
        let end = self
            .find(name_end, ">")
            .ok_or_else(|| self.error("Unterminated end tag", start))?
            + 1;
        self.pos = end;

        let name = &self.source[start + 2..name_end];
        let lower = name.to_ascii_lowercase();
        if metadata::is_empty(&lower) {
            return Ok(());
        }

        if let Some(index) = self.open.iter().rposition(|open| *open == lower) {
            self.open.truncate(index);
        } else if !matches!(lower.as_str(), "html" | "head" | "body") {
            return Err(self.error(format!("Unexpected end tag </{name}>"), start));
        }

        let ctx = self.context(start, end);
        self.handler.end_tag(&ctx, Tag::end(name));
        Ok(())
    }

    fn start_tag(&mut self) -> Result<(), ParseError> {
        let start = self.pos;
        let name_end = self.scan_until(start + 1, b"/>");
        let name = &self.source[start + 1..name_end];
        let lower = name.to_ascii_lowercase();

        let (attributes, self_closing, end) = self.attributes(&lower, name_end, start)?;
        self.pos = end;

        while self
            .open
            .last()
            .is_some_and(|open| optional::implicitly_closed_by(open, &lower))
        {
            self.open.pop();
        }

        let tag = Tag::new(name, attributes, self_closing);
        let ctx = self.context(start, end);

        if tag.has_flags(TagFlags::EMPTY) {
            self.handler.start_tag(&ctx, tag);
        } else if self_closing && tag.has_flags(TagFlags::XML) {
            self.handler.start_tag(&ctx, tag);
            self.handler.end_tag(&ctx, Tag::end(name));
        } else if metadata::is_raw_text(&lower) {
            self.raw_text_element(tag, &lower, start)?;
        } else {
            self.handler.start_tag(&ctx, tag);
            self.open.push(lower);
        }
        Ok(())
    }

    /// Parse attributes from `i` up to and including the closing `>`.
    fn attributes(
        &self,
        tag_name: &str,
        mut i: usize,
        tag_start: usize,
    ) -> Result<(Attributes, bool, usize), ParseError> {
        let unterminated = || self.error("Unterminated start tag", tag_start);
        let mut attributes = Attributes::new();

        loop {
            i = self.skip_whitespace(i);
            match self.bytes.get(i) {
                None => return Err(unterminated()),
                Some(b'>') => return Ok((attributes, false, i + 1)),
                Some(b'/') if self.bytes.get(i + 1) == Some(&b'>') => {
                    return Ok((attributes, true, i + 2));
                }
                Some(b'/') => {
                    i += 1;
                    continue;
                }
                Some(_) => {}
            }

            // The first character always belongs to the name, even `=`.
            let name_start = i;
            i = self.scan_until(i + 1, b"=>/");
            let name = &self.source[name_start..i];

            let j = self.skip_whitespace(i);
            let mut value = None;
            let mut value_start = 0;
            if self.bytes.get(j) == Some(&b'=') {
                let j = self.skip_whitespace(j + 1);
                match self.bytes.get(j) {
                    None => return Err(unterminated()),
                    Some(&quote @ (b'"' | b'\'')) => {
                        let close = memchr(quote, &self.bytes[j + 1..])
                            .ok_or_else(|| self.error("Unterminated attribute value", j))?;
                        value_start = j + 1;
                        value = Some(&self.source[j + 1..j + 1 + close]);
                        i = j + close + 2;
                    }
                    Some(_) => {
                        value_start = j;
                        i = self.scan_until(j, b">");
                        value = Some(&self.source[j..i]);
                    }
                }
            }

            let value_coordinates = if value.is_some() {
                self.coordinates(value_start)
            } else {
                NodeCoordinates::EMPTY
            };
            attributes.push(
                Attribute::new(tag_name, name, value.map(str::to_owned))
                    .with_coordinates(self.coordinates(name_start), value_coordinates),
            );
        }
    }

    /// Emit a raw-text element as start tag, one text run and end tag.
    fn raw_text_element(&mut self, tag: Tag, lower: &str, start: usize) -> Result<(), ParseError> {
        let body_start = self.pos;
        let (body_end, end) = self
            .find_raw_end(lower, body_start)
            .ok_or_else(|| self.error(format!("Unclosed element <{}>", tag.name), start))?;
        let end_name_end = self.scan_until(body_end + 2, b"/>");
        let end_name = &self.source[body_end + 2..end_name_end];

        let ctx = self.context(start, body_start);
        self.handler.start_tag(&ctx, tag);
        self.emit_text(body_start, body_end);
        let ctx = self.context(body_end, end);
        self.handler.end_tag(&ctx, Tag::end(end_name));

        self.pos = end;
        Ok(())
    }

    /// Locate `</name>` closing a raw-text element. Foreign elements nest.
    fn find_raw_end(&self, lower: &str, from: usize) -> Option<(usize, usize)> {
        let nested = matches!(lower, "svg" | "math");
        let name = lower.as_bytes();
        let is_boundary = |at: usize| {
            self.bytes
                .get(at)
                .is_some_and(|b| b.is_ascii_whitespace() || matches!(b, b'/' | b'>'))
        };
        let names_match = |at: usize| {
            self.bytes
                .get(at..at + name.len())
                .is_some_and(|s| s.eq_ignore_ascii_case(name))
        };

        let mut depth = 0usize;
        let mut i = from;
        while let Some(rel) = memchr(b'<', &self.bytes[i..]) {
            let at = i + rel;
            if self.bytes.get(at + 1) == Some(&b'/')
                && names_match(at + 2)
                && is_boundary(at + 2 + name.len())
            {
                let close = at + memchr(b'>', &self.bytes[at..])?;
                if depth == 0 {
                    return Some((at, close + 1));
                }
                depth -= 1;
                i = close + 1;
            } else if nested && names_match(at + 1) && is_boundary(at + 1 + name.len()) {
                let close = at + memchr(b'>', &self.bytes[at..])?;
                if self.bytes[close - 1] != b'/' {
                    depth += 1;
                }
                i = close + 1;
            } else {
                i = at + 1;
            }
        }
        None
    }
}
