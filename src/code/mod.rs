//! Pluggable minifiers for code embedded in markup.
//!
//! The markup engines only talk to the `CssMinifier` / `JsMinifier` traits.
//! Failures are data, not `Err`: a minifier that cannot process its input
//! returns the input untouched together with the errors it found, and the
//! engine keeps the original code in place.

mod css;
mod js;
mod json;

pub use css::{CrudeCssMinifier, NullCssMinifier};
pub use js::{CrudeJsMinifier, NullJsMinifier};
pub use json::minify_json;

use crate::markup::NodeCoordinates;

/// A problem found in code, positioned relative to the code's first character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeMinificationErrorInfo {
    pub message: String,
    pub line_number: usize,
    pub column_number: usize,
}

impl CodeMinificationErrorInfo {
    pub fn new(message: impl Into<String>, coordinates: NodeCoordinates) -> Self {
        Self {
            message: message.into(),
            line_number: coordinates.line,
            column_number: coordinates.column,
        }
    }

    /// Error located at byte `offset` of `content`.
    pub fn at(message: impl Into<String>, content: &str, offset: usize) -> Self {
        Self::new(message, NodeCoordinates::at_offset(content, offset))
    }

    #[inline]
    pub const fn coordinates(&self) -> NodeCoordinates {
        NodeCoordinates::new(self.line_number, self.column_number)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeMinificationResult {
    pub minified_content: String,
    pub errors: Vec<CodeMinificationErrorInfo>,
    pub warnings: Vec<CodeMinificationErrorInfo>,
}

impl CodeMinificationResult {
    pub fn ok(minified_content: String) -> Self {
        Self {
            minified_content,
            ..Self::default()
        }
    }

    /// Give up: hand back `content` unchanged with one error.
    pub fn failed(content: &str, error: CodeMinificationErrorInfo) -> Self {
        Self {
            minified_content: content.to_owned(),
            errors: vec![error],
            warnings: Vec::new(),
        }
    }

    #[inline]
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Stylesheet minifier.
pub trait CssMinifier: Send + Sync {
    /// `is_inline_code` is set for `style="…"` declarations.
    fn minify(&self, content: &str, is_inline_code: bool) -> CodeMinificationResult;

    fn is_inline_code_minification_supported(&self) -> bool {
        true
    }
}

/// Script minifier.
pub trait JsMinifier: Send + Sync {
    /// `is_inline_code` is set for event handlers and `javascript:` URLs.
    fn minify(&self, content: &str, is_inline_code: bool) -> CodeMinificationResult;

    fn is_inline_code_minification_supported(&self) -> bool {
        true
    }
}
