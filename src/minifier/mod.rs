//! Markup minification engines.
//!
//! | Engine          | Input                                    |
//! |-----------------|------------------------------------------|
//! | `HtmlMinifier`  | HTML, or XHTML via `HtmlMinifier::new_xhtml` |
//! | `XmlMinifier`   | Generic XML, SVG, MathML                 |
//!
//! Every engine is immutable once built and can be shared between threads;
//! per-call state lives on the stack of each `minify` call.
//!
//! Results are all-or-nothing: a parse failure yields exactly one error and
//! no content. Problems in embedded code never void the document; they are
//! reported as warnings (under the code's error category) and the code is
//! left as written.

mod buffer;
pub mod html;
mod navigator;
mod text;
mod xml;

pub(crate) use buffer::OutputBuffer;
pub use html::HtmlMinifier;
pub use navigator::SourceCodeNavigator;
pub use xml::XmlMinifier;

use crate::logger::Logger;
use crate::markup::NodeCoordinates;
use crate::parser::ParseError;
use encoding_rs::{Encoding, UTF_8};
use std::{
    fmt,
    time::{Duration, Instant},
};

// ============================================================================
// Diagnostics
// ============================================================================

/// Kind of a reported problem. The display name is stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    HtmlParsingError,
    XmlParsingError,
    HtmlMinificationWarning,
    XmlMinificationWarning,
    CssMinificationError,
    CssMinificationWarning,
    JsMinificationError,
    JsMinificationWarning,
    JsonMinificationError,
    JsTemplateMinificationError,
    XmlMinificationError,
}

impl ErrorCategory {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HtmlParsingError => "HTML_PARSING_ERROR",
            Self::XmlParsingError => "XML_PARSING_ERROR",
            Self::HtmlMinificationWarning => "HTML_MINIFICATION_WARNING",
            Self::XmlMinificationWarning => "XML_MINIFICATION_WARNING",
            Self::CssMinificationError => "CSS_MINIFICATION_ERROR",
            Self::CssMinificationWarning => "CSS_MINIFICATION_WARNING",
            Self::JsMinificationError => "JS_MINIFICATION_ERROR",
            Self::JsMinificationWarning => "JS_MINIFICATION_WARNING",
            Self::JsonMinificationError => "JSON_MINIFICATION_ERROR",
            Self::JsTemplateMinificationError => "JS_TEMPLATE_MINIFICATION_ERROR",
            Self::XmlMinificationError => "XML_MINIFICATION_ERROR",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One error or warning of a minification call, in document coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinificationErrorInfo {
    pub category: ErrorCategory,
    pub message: String,
    pub line_number: usize,
    pub column_number: usize,
    pub source_fragment: String,
}

/// A diagnostic before its source fragment is attached.
///
/// Nested runs produce these relative to their own input; the caller
/// composes the coordinates with the position of the nested content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Diagnostic {
    pub category: ErrorCategory,
    pub message: String,
    pub coordinates: NodeCoordinates,
}

impl Diagnostic {
    pub fn new(category: ErrorCategory, message: impl Into<String>, coordinates: NodeCoordinates) -> Self {
        Self {
            category,
            message: message.into(),
            coordinates,
        }
    }

    pub fn from_parse_error(category: ErrorCategory, error: &ParseError) -> Self {
        Self::new(category, error.message.clone(), error.coordinates)
    }

    /// Shift into the coordinate space of the enclosing document.
    pub fn relocate(mut self, outer: NodeCoordinates) -> Self {
        self.coordinates = NodeCoordinates::compose(outer, self.coordinates);
        self
    }

    pub fn into_info(self, source: &str) -> MinificationErrorInfo {
        MinificationErrorInfo {
            category: self.category,
            source_fragment: SourceCodeNavigator::fragment(source, self.coordinates),
            message: self.message,
            line_number: self.coordinates.line,
            column_number: self.coordinates.column,
        }
    }
}

/// What one engine run produced, before statistics and fragments.
#[derive(Debug, Default)]
pub(crate) struct Outcome {
    pub content: String,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

impl Outcome {
    pub fn failed(error: Diagnostic, warnings: Vec<Diagnostic>) -> Self {
        Self {
            content: String::new(),
            errors: vec![error],
            warnings,
        }
    }
}

// ============================================================================
// Statistics
// ============================================================================

/// Size comparison of one minification call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinificationStatistics {
    /// Bytes of the input in the output encoding.
    pub original_size: usize,
    /// Bytes of the output in the output encoding.
    pub minified_size: usize,
    pub elapsed: Duration,
}

impl MinificationStatistics {
    pub fn measure(
        encoding: &'static Encoding,
        original: &str,
        minified: &str,
        elapsed: Duration,
    ) -> Self {
        Self {
            original_size: encoded_len(encoding, original),
            minified_size: encoded_len(encoding, minified),
            elapsed,
        }
    }

    /// Negative when the output grew.
    #[allow(clippy::cast_possible_wrap)]
    pub const fn saved_bytes(&self) -> isize {
        self.original_size as isize - self.minified_size as isize
    }

    /// Saved bytes as a percentage of the original size.
    #[allow(clippy::cast_precision_loss)]
    pub fn efficiency(&self) -> f64 {
        if self.original_size == 0 {
            return 0.0;
        }
        self.saved_bytes() as f64 * 100.0 / self.original_size as f64
    }
}

fn encoded_len(encoding: &'static Encoding, text: &str) -> usize {
    if encoding == UTF_8 {
        return text.len();
    }
    let (bytes, _, _) = encoding.encode(text);
    bytes.len()
}

// ============================================================================
// Result & Trait
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkupMinificationResult {
    /// Empty whenever `errors` is not.
    pub minified_content: String,
    pub errors: Vec<MinificationErrorInfo>,
    pub warnings: Vec<MinificationErrorInfo>,
    pub statistics: Option<MinificationStatistics>,
}

impl MarkupMinificationResult {
    #[inline]
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Common surface of the markup engines.
///
/// Implementors supply `process`; the `minify*` family adds statistics and
/// reports diagnostics to the engine's logger.
pub trait MarkupMinifier: Send + Sync {
    /// Minify `content` without statistics or logging.
    fn process(&self, content: &str) -> MarkupMinificationResult;

    fn logger(&self) -> &dyn Logger;

    fn minify_full(
        &self,
        content: &str,
        file_context: &str,
        encoding: &'static Encoding,
        generate_statistics: bool,
    ) -> MarkupMinificationResult {
        let started = Instant::now();
        let mut result = self.process(content);

        if generate_statistics && result.is_success() {
            result.statistics = Some(MinificationStatistics::measure(
                encoding,
                content,
                &result.minified_content,
                started.elapsed(),
            ));
        }

        let logger = self.logger();
        for error in &result.errors {
            logger.error(
                error.category.as_str(),
                &error.message,
                file_context,
                error.line_number,
                error.column_number,
                &error.source_fragment,
            );
        }
        for warning in &result.warnings {
            logger.warn(
                warning.category.as_str(),
                &warning.message,
                file_context,
                warning.line_number,
                warning.column_number,
                &warning.source_fragment,
            );
        }

        result
    }

    fn minify(&self, content: &str) -> MarkupMinificationResult {
        self.minify_full(content, "", UTF_8, false)
    }

    fn minify_with_file_context(&self, content: &str, file_context: &str) -> MarkupMinificationResult {
        self.minify_full(content, file_context, UTF_8, false)
    }

    fn minify_with_encoding(&self, content: &str, encoding: &'static Encoding) -> MarkupMinificationResult {
        self.minify_full(content, "", encoding, false)
    }

    fn minify_with_statistics(&self, content: &str, generate_statistics: bool) -> MarkupMinificationResult {
        self.minify_full(content, "", UTF_8, generate_statistics)
    }
}

/// Turn an engine outcome into the public result.
pub(crate) fn into_result(source: &str, outcome: Outcome) -> MarkupMinificationResult {
    let Outcome {
        content,
        errors,
        warnings,
    } = outcome;
    MarkupMinificationResult {
        minified_content: if errors.is_empty() { content } else { String::new() },
        errors: errors.into_iter().map(|d| d.into_info(source)).collect(),
        warnings: warnings.into_iter().map(|d| d.into_info(source)).collect(),
        statistics: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statistics() {
        let stats = MinificationStatistics::measure(UTF_8, "<p>  héllo  </p>", "<p>héllo", Duration::ZERO);
        assert_eq!(stats.original_size, 17);
        assert_eq!(stats.minified_size, 9);
        assert_eq!(stats.saved_bytes(), 8);
        assert!((stats.efficiency() - 800.0 / 17.0).abs() < 1e-9);
    }

    #[test]
    fn test_statistics_in_single_byte_encoding() {
        let stats = MinificationStatistics::measure(
            encoding_rs::WINDOWS_1252,
            "héllo",
            "héllo",
            Duration::ZERO,
        );
        assert_eq!(stats.original_size, 5);
    }

    #[test]
    fn test_empty_input_statistics() {
        let stats = MinificationStatistics::measure(UTF_8, "", "", Duration::ZERO);
        assert_eq!(stats.efficiency(), 0.0);
    }

    #[test]
    fn test_into_result_is_all_or_nothing() {
        let outcome = Outcome {
            content: "partial".into(),
            errors: vec![Diagnostic::new(
                ErrorCategory::HtmlParsingError,
                "bad",
                NodeCoordinates::new(1, 2),
            )],
            warnings: Vec::new(),
        };
        let result = into_result("<p", outcome);
        assert!(result.minified_content.is_empty());
        assert_eq!(result.errors[0].category.as_str(), "HTML_PARSING_ERROR");
        assert_eq!(result.errors[0].column_number, 2);
        assert!(!result.errors[0].source_fragment.is_empty());
    }

    #[test]
    fn test_relocate() {
        let d = Diagnostic::new(ErrorCategory::CssMinificationError, "x", NodeCoordinates::new(2, 4))
            .relocate(NodeCoordinates::new(10, 8));
        assert_eq!(d.coordinates, NodeCoordinates::new(11, 4));
    }
}
