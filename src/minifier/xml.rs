//! Generic XML minifier.
//!
//! Also serves inline `<svg>` and `<math>` islands of the HTML engine.

use std::sync::Arc;

use super::{
    Diagnostic, ErrorCategory, MarkupMinificationResult, MarkupMinifier, OutputBuffer, Outcome,
    into_result,
    text::{collapse_whitespace, is_html_whitespace, is_whitespace_only, normalize_whitespace},
};
use crate::config::XmlSettings;
use crate::logger::{Logger, NullLogger};
use crate::markup::{MarkupParsingContext, Tag};
use crate::parser::{MarkupHandler, XmlParser};

pub struct XmlMinifier {
    settings: XmlSettings,
    logger: Arc<dyn Logger>,
}

impl XmlMinifier {
    pub fn new(settings: XmlSettings) -> Self {
        Self {
            settings,
            logger: Arc::new(NullLogger),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    #[inline]
    pub const fn settings(&self) -> &XmlSettings {
        &self.settings
    }

    /// Minify without statistics; diagnostics stay relative to `content`.
    pub(crate) fn run(&self, content: &str) -> Outcome {
        let mut run = XmlRun::new(&self.settings);
        if let Err(error) = XmlParser::new().parse(content, &mut run) {
            return Outcome::failed(
                Diagnostic::from_parse_error(ErrorCategory::XmlParsingError, &error),
                run.warnings,
            );
        }
        run.finish()
    }
}

impl Default for XmlMinifier {
    fn default() -> Self {
        Self::new(XmlSettings::default())
    }
}

impl MarkupMinifier for XmlMinifier {
    fn process(&self, content: &str) -> MarkupMinificationResult {
        into_result(content, self.run(content))
    }

    fn logger(&self) -> &dyn Logger {
        self.logger.as_ref()
    }
}

// ============================================================================
// Per-call state
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeType {
    Unknown,
    Declaration,
    Doctype,
    Comment,
    Cdata,
    ProcessingInstruction,
    StartTag,
    EndTag,
    Text,
}

struct XmlRun<'s> {
    settings: &'s XmlSettings,
    buffer: OutputBuffer,
    last: NodeType,
    /// `xml:space="preserve"` in effect, one entry per open element.
    preserve_space: Vec<bool>,
    warnings: Vec<Diagnostic>,
}

impl<'s> XmlRun<'s> {
    fn new(settings: &'s XmlSettings) -> Self {
        Self {
            settings,
            buffer: OutputBuffer::new(),
            last: NodeType::Unknown,
            preserve_space: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn preserving(&self) -> bool {
        !self.settings.minify_whitespace || self.preserve_space.last().copied().unwrap_or(false)
    }

    fn empty_tag_end(&self) -> &'static str {
        if self.settings.render_empty_tags_with_space {
            " />"
        } else {
            "/>"
        }
    }

    fn finish(self) -> Outcome {
        let minify_whitespace = self.settings.minify_whitespace;
        let warnings = self.warnings;
        let mut content = self.buffer.finish();
        if minify_whitespace {
            let trimmed = content.trim_matches(is_html_whitespace);
            if trimmed.len() != content.len() {
                content = trimmed.to_owned();
            }
        }
        Outcome {
            content,
            errors: Vec::new(),
            warnings,
        }
    }
}

impl MarkupHandler for XmlRun<'_> {
    fn xml_declaration(&mut self, _ctx: &MarkupParsingContext<'_>, text: &str) {
        self.buffer.push(normalize_instruction(text));
        self.last = NodeType::Declaration;
    }

    fn doctype(&mut self, _ctx: &MarkupParsingContext<'_>, text: &str) {
        self.buffer.push(normalize_whitespace(text));
        self.last = NodeType::Doctype;
    }

    fn comment(&mut self, _ctx: &MarkupParsingContext<'_>, text: &str) {
        if self.settings.remove_xml_comments {
            return;
        }
        self.buffer.push(format!("<!--{text}-->"));
        self.last = NodeType::Comment;
    }

    fn cdata(&mut self, _ctx: &MarkupParsingContext<'_>, text: &str) {
        self.buffer.push(format!("<![CDATA[{text}]]>"));
        self.last = NodeType::Cdata;
    }

    fn processing_instruction(&mut self, _ctx: &MarkupParsingContext<'_>, text: &str) {
        self.buffer.push(normalize_instruction(text));
        self.last = NodeType::ProcessingInstruction;
    }

    fn start_tag(&mut self, ctx: &MarkupParsingContext<'_>, tag: Tag) {
        if self.last == NodeType::EndTag {
            self.buffer.flush();
        }

        let mut rendered = format!("<{}", tag.name);
        for attr in &tag.attributes {
            let value = attr.value_str();
            let quote = if value.contains('"') && !value.contains('\'') {
                '\''
            } else {
                '"'
            };
            rendered.push(' ');
            rendered.push_str(&attr.name);
            rendered.push('=');
            rendered.push(quote);
            rendered.push_str(value);
            rendered.push(quote);
        }
        self.buffer.push(rendered);

        if tag.self_closing {
            self.buffer.push(self.empty_tag_end());
            self.last = NodeType::EndTag;
            return;
        }

        let inherited = self.preserve_space.last().copied().unwrap_or(false);
        let preserve = match tag.attribute_value("xml:space").map(str::trim) {
            Some("preserve") => true,
            Some("default") => false,
            Some(other) => {
                self.warnings.push(Diagnostic::new(
                    ErrorCategory::XmlMinificationWarning,
                    format!("invalid xml:space value `{other}` on <{}>, parent setting kept", tag.name),
                    ctx.coordinates(),
                ));
                inherited
            }
            None => inherited,
        };
        self.preserve_space.push(preserve);

        self.buffer.push(">");
        self.last = NodeType::StartTag;
    }

    fn end_tag(&mut self, _ctx: &MarkupParsingContext<'_>, tag: Tag) {
        self.preserve_space.pop();

        if self.settings.collapse_tags_without_content
            && self.last == NodeType::StartTag
            && self.buffer.last() == Some(">")
        {
            let end = self.empty_tag_end();
            if let Some(last) = self.buffer.last_mut() {
                end.clone_into(last);
            }
        } else {
            self.buffer.push(format!("</{}>", tag.name));
        }
        self.last = NodeType::EndTag;
    }

    fn text(&mut self, _ctx: &MarkupParsingContext<'_>, text: &str) {
        if self.preserving() {
            self.buffer.push(text);
        } else if is_whitespace_only(text) {
            return;
        } else {
            self.buffer.push(collapse_whitespace(text, self.settings.preserve_new_lines));
        }
        self.last = NodeType::Text;
    }
}

/// `<?target   a="1"   ?>` → `<?target a="1"?>`.
fn normalize_instruction(text: &str) -> String {
    let body = text
        .strip_prefix("<?")
        .and_then(|s| s.strip_suffix("?>"))
        .map(|s| s.trim_matches(is_html_whitespace));
    match body {
        Some(body) => format!("<?{}?>", normalize_whitespace(body)),
        None => normalize_whitespace(text),
    }
}
