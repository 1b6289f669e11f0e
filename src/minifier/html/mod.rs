//! HTML and XHTML minifier.
//!
//! # Pipeline
//!
//! ```text
//! source ──► HtmlParser ──► HtmlRun (MarkupHandler) ──► OutputBuffer ──► String
//!                               │
//!                               ├─► whitespace      text runs, trim decisions
//!                               ├─► attributes      quoting, cleaning, removal
//!                               ├─► optional_tags   end tag omission
//!                               ├─► embedded        script/style/svg bodies
//!                               └─► binding         knockout/angular expressions
//! ```
//!
//! `HtmlMinifier` holds everything derived from the settings once; each call
//! gets a fresh `HtmlRun`, so one minifier can serve many threads.
//!
//! Embedded CSS and JS are only trimmed unless a code minifier is plugged in
//! with `with_css_minifier` / `with_js_minifier`.

mod attributes;
mod binding;
mod embedded;
mod engine;
mod optional_tags;
mod whitespace;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use regex::Regex;
use rustc_hash::FxHashSet;

use self::binding::normalize_directive_name;
use self::engine::HtmlRun;
use super::{MarkupMinificationResult, MarkupMinifier, Outcome, XmlMinifier, into_result};
use crate::code::{CrudeJsMinifier, CssMinifier, JsMinifier, NullCssMinifier, NullJsMinifier};
use crate::config::{EmptyTagRenderMode, HtmlSettings, PreservableAttribute, WhitespaceMinificationMode, XmlSettings};
use crate::logger::{Logger, NullLogger};

pub struct HtmlMinifier {
    settings: HtmlSettings,
    /// Settings for markup inside `<script type="text/html">` and friends.
    template_settings: HtmlSettings,
    xhtml: bool,
    comment_patterns: Vec<Regex>,
    preservable_attributes: Vec<PreservableAttribute>,
    /// Lowercase tag names.
    preservable_optional_tags: FxHashSet<String>,
    /// Normalized with `normalize_directive_name`.
    angular_directives: FxHashSet<String>,
    css: Box<dyn CssMinifier>,
    js: Box<dyn JsMinifier>,
    binding_js: CrudeJsMinifier,
    /// Inline `<svg>` and `<math>`.
    xml: XmlMinifier,
    logger: Arc<dyn Logger>,
}

impl HtmlMinifier {
    pub fn new(settings: HtmlSettings) -> Self {
        Self::build(settings, false)
    }

    /// XHTML output: names keep their case, every attribute is quoted and
    /// empty elements are self-closed.
    pub fn new_xhtml(settings: HtmlSettings) -> Self {
        Self::build(settings, true)
    }

    fn build(settings: HtmlSettings, xhtml: bool) -> Self {
        let xml = XmlMinifier::new(XmlSettings {
            minify_whitespace: settings.whitespace_minification_mode != WhitespaceMinificationMode::None,
            remove_xml_comments: settings.remove_html_comments,
            render_empty_tags_with_space: settings.empty_tag_render_mode == EmptyTagRenderMode::SpaceAndSlash,
            collapse_tags_without_content: false,
            preserve_new_lines: settings.preserve_new_lines,
        });

        Self {
            template_settings: settings.template_settings(),
            xhtml,
            comment_patterns: settings.preservable_comment_regexes(),
            preservable_attributes: settings.parsed_preservable_attributes(),
            preservable_optional_tags: settings
                .preservable_optional_tags
                .iter()
                .map(|t| t.trim().to_ascii_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
            angular_directives: settings
                .custom_angular_directives
                .iter()
                .map(|d| normalize_directive_name(d.trim()))
                .filter(|d| !d.is_empty())
                .collect(),
            css: Box::new(NullCssMinifier),
            js: Box::new(NullJsMinifier),
            binding_js: CrudeJsMinifier,
            xml,
            logger: Arc::new(NullLogger),
            settings,
        }
    }

    pub fn with_css_minifier(mut self, css: impl CssMinifier + 'static) -> Self {
        self.css = Box::new(css);
        self
    }

    pub fn with_js_minifier(mut self, js: impl JsMinifier + 'static) -> Self {
        self.js = Box::new(js);
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    #[inline]
    pub const fn settings(&self) -> &HtmlSettings {
        &self.settings
    }

    #[inline]
    pub const fn is_xhtml(&self) -> bool {
        self.xhtml
    }

    /// Minify without statistics; diagnostics stay relative to `content`.
    pub(crate) fn run(&self, content: &str) -> Outcome {
        HtmlRun::new(self, &self.settings).execute(content)
    }
}

impl Default for HtmlMinifier {
    fn default() -> Self {
        Self::new(HtmlSettings::default())
    }
}

impl MarkupMinifier for HtmlMinifier {
    fn process(&self, content: &str) -> MarkupMinificationResult {
        into_result(content, self.run(content))
    }

    fn logger(&self) -> &dyn Logger {
        self.logger.as_ref()
    }
}
