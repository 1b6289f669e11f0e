//! Token sources: turn markup text into handler callbacks.
//!
//! Both parsers push events into a `MarkupHandler` and own the loop. Each event
//! comes with a `MarkupParsingContext` carrying the absolute position of the
//! node, so consumers can report diagnostics without re-scanning the source.

mod html;
mod xml;

pub use html::HtmlParser;
pub use xml::XmlParser;

use crate::markup::{MarkupParsingContext, NodeCoordinates, Tag};
use thiserror::Error;

// ============================================================================
// Parse Error
// ============================================================================

/// Failure of a token source. Aborts the whole minification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (line {}, column {})", coordinates.line, coordinates.column)]
pub struct ParseError {
    pub message: String,
    pub coordinates: NodeCoordinates,
    /// Byte offset into the source.
    pub position: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, coordinates: NodeCoordinates, position: usize) -> Self {
        Self {
            message: message.into(),
            coordinates,
            position,
        }
    }
}

// ============================================================================
// Conditional Comments
// ============================================================================

/// The four shapes of IE conditional comments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionalCommentType {
    /// `<!--[if expr]>` … `<![endif]-->`
    Hidden,
    /// `<![if expr]>` … `<![endif]>`
    Revealed,
    /// `<!--[if expr]><!-->` … `<!--<![endif]-->`
    RevealedValidating,
    /// `<!--[if expr]>-->` … `<!--<![endif]-->`
    RevealedValidatingSimplified,
}

impl ConditionalCommentType {
    /// Text around the expression of the opening comment.
    pub const fn start_delimiters(self) -> (&'static str, &'static str) {
        match self {
            Self::Hidden => ("<!--[if ", "]>"),
            Self::Revealed => ("<![if ", "]>"),
            Self::RevealedValidating => ("<!--[if ", "]><!-->"),
            Self::RevealedValidatingSimplified => ("<!--[if ", "]>-->"),
        }
    }

    /// Closing comment.
    pub const fn end_delimiter(self) -> &'static str {
        match self {
            Self::Hidden => "<![endif]-->",
            Self::Revealed => "<![endif]>",
            Self::RevealedValidating | Self::RevealedValidatingSimplified => "<!--<![endif]-->",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlConditionalComment {
    pub comment_type: ConditionalCommentType,
    pub expression: String,
}

// ============================================================================
// Handler
// ============================================================================

/// Receiver of parser events.
///
/// Text payloads are raw source text; entities are never decoded.
pub trait MarkupHandler {
    /// Full `<?xml … ?>` text.
    fn xml_declaration(&mut self, ctx: &MarkupParsingContext<'_>, text: &str);

    /// Full `<!DOCTYPE …>` text.
    fn doctype(&mut self, ctx: &MarkupParsingContext<'_>, text: &str);

    /// Text between `<!--` and `-->`.
    fn comment(&mut self, ctx: &MarkupParsingContext<'_>, text: &str);

    fn if_conditional_comment(
        &mut self,
        _ctx: &MarkupParsingContext<'_>,
        _comment: &HtmlConditionalComment,
    ) {
    }

    fn end_if_conditional_comment(
        &mut self,
        _ctx: &MarkupParsingContext<'_>,
        _comment_type: ConditionalCommentType,
    ) {
    }

    fn start_tag(&mut self, ctx: &MarkupParsingContext<'_>, tag: Tag);

    fn end_tag(&mut self, ctx: &MarkupParsingContext<'_>, tag: Tag);

    fn text(&mut self, ctx: &MarkupParsingContext<'_>, text: &str);

    /// `{{ expression }}` with its delimiters.
    fn template_tag(
        &mut self,
        _ctx: &MarkupParsingContext<'_>,
        _expression: &str,
        _start_delimiter: &str,
        _end_delimiter: &str,
    ) {
    }

    /// Text between `<![CDATA[` and `]]>`.
    fn cdata(&mut self, _ctx: &MarkupParsingContext<'_>, _text: &str) {}

    /// Full `<?target … ?>` text other than the XML declaration.
    fn processing_instruction(&mut self, _ctx: &MarkupParsingContext<'_>, _text: &str) {}
}

#[cfg(test)]
pub(crate) mod recorder {
    //! Handler that records events as strings, shared by the parser tests.

    use super::*;

    #[derive(Default)]
    pub struct Recorder {
        pub events: Vec<String>,
        pub coordinates: Vec<NodeCoordinates>,
    }

    impl Recorder {
        fn push(&mut self, ctx: &MarkupParsingContext<'_>, event: String) {
            self.events.push(event);
            self.coordinates.push(ctx.coordinates());
        }
    }

    impl MarkupHandler for Recorder {
        fn xml_declaration(&mut self, ctx: &MarkupParsingContext<'_>, text: &str) {
            self.push(ctx, format!("decl:{text}"));
        }

        fn doctype(&mut self, ctx: &MarkupParsingContext<'_>, text: &str) {
            self.push(ctx, format!("doctype:{text}"));
        }

        fn comment(&mut self, ctx: &MarkupParsingContext<'_>, text: &str) {
            self.push(ctx, format!("comment:{text}"));
        }

        fn if_conditional_comment(
            &mut self,
            ctx: &MarkupParsingContext<'_>,
            comment: &HtmlConditionalComment,
        ) {
            self.push(ctx, format!("if:{:?}:{}", comment.comment_type, comment.expression));
        }

        fn end_if_conditional_comment(
            &mut self,
            ctx: &MarkupParsingContext<'_>,
            comment_type: ConditionalCommentType,
        ) {
            self.push(ctx, format!("endif:{comment_type:?}"));
        }

        fn start_tag(&mut self, ctx: &MarkupParsingContext<'_>, tag: Tag) {
            let attrs: Vec<String> = tag
                .attributes
                .iter()
                .map(|a| match &a.value {
                    Some(v) => format!("{}={v}", a.name),
                    None => a.name.clone(),
                })
                .collect();
            let slash = if tag.self_closing { "/" } else { "" };
            self.push(ctx, format!("<{}{}{slash}>", tag.name, attrs.iter().map(|a| format!(" {a}")).collect::<String>()));
        }

        fn end_tag(&mut self, ctx: &MarkupParsingContext<'_>, tag: Tag) {
            self.push(ctx, format!("</{}>", tag.name));
        }

        fn text(&mut self, ctx: &MarkupParsingContext<'_>, text: &str) {
            self.push(ctx, format!("text:{text}"));
        }

        fn template_tag(
            &mut self,
            ctx: &MarkupParsingContext<'_>,
            expression: &str,
            start_delimiter: &str,
            end_delimiter: &str,
        ) {
            self.push(ctx, format!("tpl:{start_delimiter}{expression}{end_delimiter}"));
        }

        fn cdata(&mut self, ctx: &MarkupParsingContext<'_>, text: &str) {
            self.push(ctx, format!("cdata:{text}"));
        }

        fn processing_instruction(&mut self, ctx: &MarkupParsingContext<'_>, text: &str) {
            self.push(ctx, format!("pi:{text}"));
        }
    }
}
