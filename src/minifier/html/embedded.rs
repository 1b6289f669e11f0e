//! Bodies of raw-text elements: scripts, styles, templates and foreign islands.
//!
//! Legacy pages hide code from old browsers inside HTML comments or CDATA
//! sections. The wrapper is recognised, the code inside is minified, and the
//! wrapper is written back in a canonical form unless its removal is enabled.

use std::sync::LazyLock;

use regex::Regex;

use super::engine::HtmlRun;
use crate::code::{CodeMinificationResult, minify_json};
use crate::config::WhitespaceMinificationMode;
use crate::markup::{MarkupParsingContext, NodeCoordinates, Tag};
use crate::minifier::text::normalize_whitespace;
use crate::minifier::{Diagnostic, ErrorCategory};

// ============================================================================
// Content types
// ============================================================================

/// MIME types (lowercase, without parameters) that mean JavaScript.
pub(super) fn is_js_type(value: &str) -> bool {
    matches!(
        value,
        "text/javascript"
            | "application/javascript"
            | "text/ecmascript"
            | "application/ecmascript"
            | "application/x-javascript"
            | "application/x-ecmascript"
            | "text/x-javascript"
            | "text/x-ecmascript"
            | "text/jscript"
            | "text/livescript"
            | "text/javascript1.0"
            | "text/javascript1.1"
            | "text/javascript1.2"
            | "text/javascript1.3"
            | "text/javascript1.4"
            | "text/javascript1.5"
    )
}

pub(super) fn is_css_type(value: &str) -> bool {
    value == "text/css"
}

fn is_json_type(value: &str) -> bool {
    matches!(value, "importmap" | "speculationrules")
        || value.ends_with("/json")
        || value.ends_with("+json")
}

/// What a `<script>` body holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ScriptKind {
    Js,
    VbScript,
    Json,
    /// Markup re-minified by a nested run.
    Template,
    Other,
}

pub(super) fn script_kind(tag: &Tag, template_types: &[String]) -> ScriptKind {
    let content_type = tag
        .attribute_value("type")
        .map(|v| v.split(';').next().unwrap_or_default().trim().to_ascii_lowercase())
        .unwrap_or_default();

    if content_type.is_empty() {
        let vbscript = tag
            .attribute_value("language")
            .is_some_and(|l| l.trim().eq_ignore_ascii_case("vbscript"));
        return if vbscript { ScriptKind::VbScript } else { ScriptKind::Js };
    }

    if is_js_type(&content_type) || content_type == "module" {
        ScriptKind::Js
    } else if matches!(content_type.as_str(), "text/vbscript" | "text/vbs") {
        ScriptKind::VbScript
    } else if is_json_type(&content_type) {
        ScriptKind::Json
    } else if content_type == "text/html"
        || template_types
            .iter()
            .any(|t| t.trim().eq_ignore_ascii_case(&content_type))
    {
        ScriptKind::Template
    } else {
        ScriptKind::Other
    }
}

// ============================================================================
// Wrappers
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum CodeLanguage {
    Js,
    VbScript,
    Css,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Wrapper {
    None,
    Cdata,
    Comment,
    /// `<!--//--><![CDATA[//><!--` … `//--><!]]>`
    Hybrid,
}

static RE_JS_HYBRID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*<!--//--><!\[CDATA\[//><!--[ \t]*(?:\r\n|\n|\r)?(.*?)(?:\r\n|\n|\r)?[ \t]*//--><!\]\]>\s*$")
        .unwrap()
});

static RE_JS_CDATA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*(?://[ \t]*<!\[CDATA\[|/\*[ \t]*<!\[CDATA\[[ \t]*\*/)[ \t]*(?:\r\n|\n|\r)?(.*?)(?:\r\n|\n|\r)?[ \t]*(?://[ \t]*\]\]>|/\*[ \t]*\]\]>[ \t]*\*/)\s*$")
        .unwrap()
});

static RE_JS_COMMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*<!--[^\r\n]*(?:\r\n|\n|\r)(.*?)(?:\r\n|\n|\r)?[ \t]*(?://[^\r\n]*?)?-->\s*$")
        .unwrap()
});

static RE_VBS_COMMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*<!--[^\r\n]*(?:\r\n|\n|\r)(.*?)(?:\r\n|\n|\r)?[ \t]*(?:'[^\r\n]*?)?-->\s*$")
        .unwrap()
});

static RE_CSS_HYBRID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*<!--/\*--><!\[CDATA\[/\*><!--\*/(.*?)/\*\]\]>\*/-->\s*$").unwrap()
});

static RE_CSS_CDATA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*/\*\s*<!\[CDATA\[\s*\*/(.*?)/\*\s*\]\]>\s*\*/\s*$").unwrap()
});

static RE_CSS_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^\s*<!--(.*?)-->\s*$").unwrap());

/// Code found inside an optional wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Unwrapped<'a> {
    pub wrapper: Wrapper,
    pub code: &'a str,
    /// Byte offset of `code` in the body.
    pub offset: usize,
}

pub(super) fn unwrap_code(language: CodeLanguage, body: &str) -> Unwrapped<'_> {
    let patterns: &[(Wrapper, &Regex)] = match language {
        CodeLanguage::Js => &[
            (Wrapper::Hybrid, &RE_JS_HYBRID),
            (Wrapper::Cdata, &RE_JS_CDATA),
            (Wrapper::Comment, &RE_JS_COMMENT),
        ],
        CodeLanguage::VbScript => &[(Wrapper::Comment, &RE_VBS_COMMENT)],
        CodeLanguage::Css => &[
            (Wrapper::Hybrid, &RE_CSS_HYBRID),
            (Wrapper::Cdata, &RE_CSS_CDATA),
            (Wrapper::Comment, &RE_CSS_COMMENT),
        ],
    };

    for (wrapper, re) in patterns {
        if let Some(code) = re.captures(body).and_then(|caps| caps.get(1)) {
            return Unwrapped {
                wrapper: *wrapper,
                code: code.as_str(),
                offset: code.start(),
            };
        }
    }
    Unwrapped {
        wrapper: Wrapper::None,
        code: body,
        offset: 0,
    }
}

/// Canonical form of `wrapper` around `code`.
pub(super) fn wrap_code(language: CodeLanguage, wrapper: Wrapper, code: &str) -> String {
    match (language, wrapper) {
        (_, Wrapper::None) => code.to_owned(),
        (CodeLanguage::Js, Wrapper::Cdata) => format!("//<![CDATA[\n{code}\n//]]>"),
        (CodeLanguage::Js, Wrapper::Comment) => format!("<!--\n{code}\n//-->"),
        (CodeLanguage::Js, Wrapper::Hybrid) => {
            format!("<!--//--><![CDATA[//><!--\n{code}\n//--><!]]>")
        }
        (CodeLanguage::VbScript, _) => format!("<!--\n{code}\n'-->"),
        (CodeLanguage::Css, Wrapper::Cdata) => format!("/*<![CDATA[*/{code}/*]]>*/"),
        (CodeLanguage::Css, Wrapper::Comment) => format!("<!--{code}-->"),
        (CodeLanguage::Css, Wrapper::Hybrid) => {
            format!("<!--/*--><![CDATA[/*><!--*/{code}/*]]>*/-->")
        }
    }
}

// ============================================================================
// Engine hooks
// ============================================================================

impl HtmlRun<'_> {
    pub(super) fn process_raw_body(&mut self, ctx: &MarkupParsingContext<'_>, tag: &Tag, body: &str) {
        let at = ctx.coordinates();
        let content = match tag.name_in_lowercase.as_str() {
            "script" => self.process_script(tag, body, at),
            "style" => self.process_style(tag, body, at),
            "svg" | "math" => self.process_foreign(body, at),
            "title" if self.settings.whitespace_minification_mode != WhitespaceMinificationMode::None => {
                normalize_whitespace(body)
            }
            _ => body.to_owned(),
        };
        self.write_content(&content);
    }

    fn process_script(&mut self, tag: &Tag, body: &str, at: NodeCoordinates) -> String {
        match script_kind(tag, &self.settings.processable_script_types) {
            ScriptKind::Js => {
                self.process_code(CodeLanguage::Js, body, at, self.settings.minify_embedded_js_code)
            }
            ScriptKind::VbScript => self.process_code(CodeLanguage::VbScript, body, at, false),
            ScriptKind::Json if self.settings.minify_embedded_json_data && !body.trim().is_empty() => {
                let result = minify_json(body);
                self.collect_code_diagnostics(
                    &result,
                    ErrorCategory::JsonMinificationError,
                    ErrorCategory::JsMinificationWarning,
                    at,
                );
                if result.is_ok() {
                    result.minified_content
                } else {
                    body.to_owned()
                }
            }
            ScriptKind::Template => self.process_template(body, at),
            ScriptKind::Json | ScriptKind::Other => body.to_owned(),
        }
    }

    fn process_style(&mut self, tag: &Tag, body: &str, at: NodeCoordinates) -> String {
        let is_css = tag
            .attribute_value("type")
            .is_none_or(|t| t.trim().is_empty() || is_css_type(&t.trim().to_ascii_lowercase()));
        if is_css {
            self.process_code(CodeLanguage::Css, body, at, self.settings.minify_embedded_css_code)
        } else {
            body.to_owned()
        }
    }

    fn process_code(&mut self, language: CodeLanguage, body: &str, at: NodeCoordinates, minify: bool) -> String {
        let Unwrapped {
            wrapper,
            code,
            offset,
        } = unwrap_code(language, body);
        let strip = match wrapper {
            Wrapper::None => false,
            Wrapper::Cdata | Wrapper::Hybrid => {
                self.settings.remove_cdata_sections_from_scripts_and_styles
            }
            Wrapper::Comment => self.settings.remove_html_comments_from_scripts_and_styles,
        };
        let whitespace_untouched =
            self.settings.whitespace_minification_mode == WhitespaceMinificationMode::None;
        if !minify && !strip && whitespace_untouched {
            return body.to_owned();
        }

        let code_at = at.advance(&body[..offset]);
        let code = if code.trim().is_empty() {
            String::new()
        } else if minify {
            match language {
                CodeLanguage::Js => self.minify_js_code(code, false, code_at),
                CodeLanguage::Css => self.minify_css_code(code, false, code_at),
                CodeLanguage::VbScript => code.trim().to_owned(),
            }
        } else {
            code.trim().to_owned()
        };

        if strip {
            code
        } else {
            wrap_code(language, wrapper, &code)
        }
    }

    fn process_template(&mut self, body: &str, at: NodeCoordinates) -> String {
        let minifier = self.minifier;
        let outcome = HtmlRun::new(minifier, &minifier.template_settings).execute(body);
        self.warnings
            .extend(outcome.warnings.into_iter().map(|d| d.relocate(at)));
        if outcome.errors.is_empty() {
            outcome.content
        } else {
            self.warnings
                .extend(outcome.errors.into_iter().map(|d| d.relocate(at)));
            body.to_owned()
        }
    }

    fn process_foreign(&mut self, body: &str, at: NodeCoordinates) -> String {
        if self.settings.whitespace_minification_mode == WhitespaceMinificationMode::None {
            return body.to_owned();
        }
        let outcome = self.minifier.xml.run(body);
        self.warnings
            .extend(outcome.warnings.into_iter().map(|d| d.relocate(at)));
        if outcome.errors.is_empty() {
            return outcome.content;
        }
        for error in outcome.errors {
            self.warnings.push(
                Diagnostic::new(ErrorCategory::XmlMinificationError, error.message, error.coordinates)
                    .relocate(at),
            );
        }
        body.to_owned()
    }

    // ------------------------------------------------------------------------
    // Code minifier calls
    // ------------------------------------------------------------------------

    pub(super) fn minify_css_code(&mut self, code: &str, inline: bool, at: NodeCoordinates) -> String {
        let css = self.minifier.css.as_ref();
        if inline && !css.is_inline_code_minification_supported() {
            return code.trim().to_owned();
        }
        let result = css.minify(code, inline);
        self.collect_code_diagnostics(
            &result,
            ErrorCategory::CssMinificationError,
            ErrorCategory::CssMinificationWarning,
            at,
        );
        if result.is_ok() {
            result.minified_content
        } else {
            code.trim().to_owned()
        }
    }

    pub(super) fn minify_js_code(&mut self, code: &str, inline: bool, at: NodeCoordinates) -> String {
        let js = self.minifier.js.as_ref();
        if inline && !js.is_inline_code_minification_supported() {
            return code.trim().to_owned();
        }
        let result = js.minify(code, inline);
        self.collect_code_diagnostics(
            &result,
            ErrorCategory::JsMinificationError,
            ErrorCategory::JsMinificationWarning,
            at,
        );
        if result.is_ok() {
            result.minified_content
        } else {
            code.trim().to_owned()
        }
    }

    /// Record a code minifier's findings. Its errors become warnings of the
    /// document: the code stays as written and the page is still minified.
    pub(super) fn collect_code_diagnostics(
        &mut self,
        result: &CodeMinificationResult,
        error_category: ErrorCategory,
        warning_category: ErrorCategory,
        at: NodeCoordinates,
    ) {
        for error in &result.errors {
            self.warnings.push(
                Diagnostic::new(error_category, error.message.clone(), error.coordinates()).relocate(at),
            );
        }
        for warning in &result.warnings {
            self.warnings.push(
                Diagnostic::new(warning_category, warning.message.clone(), warning.coordinates())
                    .relocate(at),
            );
        }
    }
}
