//! Client-side template syntax: Knockout containerless bindings and Angular
//! directives. Both carry JavaScript expressions inside comments and
//! attribute values.

use std::sync::LazyLock;

use regex::Regex;

use super::HtmlMinifier;
use super::engine::HtmlRun;
use crate::code::JsMinifier;
use crate::markup::NodeCoordinates;
use crate::minifier::{Diagnostic, ErrorCategory};

static RE_KO_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^\s*ko(?:\s+(.+?))?\s*$").unwrap());

static RE_KO_END_COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*/ko\s*$").unwrap());

static RE_ANGULAR_COMMENT_DIRECTIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*directive:").unwrap());

/// Built-in directives whose value is an expression.
const ANGULAR_EXPRESSION_DIRECTIVES: &[&str] = &[
    "ng-bind",
    "ng-blur",
    "ng-change",
    "ng-checked",
    "ng-class",
    "ng-class-even",
    "ng-class-odd",
    "ng-click",
    "ng-dblclick",
    "ng-disabled",
    "ng-focus",
    "ng-hide",
    "ng-if",
    "ng-init",
    "ng-keydown",
    "ng-keypress",
    "ng-keyup",
    "ng-model",
    "ng-mousedown",
    "ng-mouseenter",
    "ng-mouseleave",
    "ng-mousemove",
    "ng-mouseover",
    "ng-mouseup",
    "ng-readonly",
    "ng-required",
    "ng-selected",
    "ng-show",
    "ng-style",
    "ng-submit",
    "ng-switch",
    "ng-value",
];

/// `data-ng:bind`, `x-ng_bind` and `ng-bind` all name the same directive.
pub(super) fn normalize_directive_name(name: &str) -> String {
    let lower = name.to_ascii_lowercase();
    let stripped = lower
        .strip_prefix("data-")
        .or_else(|| lower.strip_prefix("x-"))
        .unwrap_or(&lower);
    stripped.replace([':', '_'], "-")
}

impl HtmlMinifier {
    pub(super) fn is_angular_directive(&self, name: &str) -> bool {
        let name = normalize_directive_name(name);
        ANGULAR_EXPRESSION_DIRECTIVES.contains(&name.as_str()) || self.angular_directives.contains(&name)
    }
}

impl HtmlRun<'_> {
    /// Body of an HTML comment to write, or `None` to drop the comment.
    pub(super) fn process_comment(&mut self, text: &str, at: NodeCoordinates) -> Option<String> {
        if let Some(caps) = RE_KO_COMMENT.captures(text) {
            if !self.settings.minify_knockout_binding_expressions {
                return Some(text.to_owned());
            }
            return Some(match caps.get(1) {
                Some(expr) => {
                    let expr_at = at.advance(&text[..expr.start()]);
                    format!("ko {}", self.minify_knockout_binding(expr.as_str(), expr_at))
                }
                None => "ko".to_owned(),
            });
        }
        if RE_KO_END_COMMENT.is_match(text) {
            let keep = if self.settings.minify_knockout_binding_expressions {
                "/ko".to_owned()
            } else {
                text.to_owned()
            };
            return Some(keep);
        }
        if RE_ANGULAR_COMMENT_DIRECTIVE.is_match(text) {
            return Some(text.to_owned());
        }
        if self.minifier.comment_patterns.iter().any(|re| re.is_match(text)) {
            return Some(text.to_owned());
        }

        (!self.settings.remove_html_comments).then(|| text.to_owned())
    }

    /// Minify the body of a `data-bind` value or `<!-- ko … -->` comment.
    ///
    /// The body is an object literal without braces, so it is minified
    /// inside `({ … })` and unwrapped again.
    pub(super) fn minify_knockout_binding(&mut self, expression: &str, at: NodeCoordinates) -> String {
        if expression.trim().is_empty() {
            return String::new();
        }
        let wrapped = format!("({{{expression}}})");
        let result = self.minifier.binding_js.minify(&wrapped, true);

        if !result.is_ok() {
            for error in &result.errors {
                let mut coordinates = error.coordinates();
                if coordinates.line == 1 {
                    coordinates.column = coordinates.column.saturating_sub(2).max(1);
                }
                self.warnings.push(
                    Diagnostic::new(ErrorCategory::JsTemplateMinificationError, error.message.clone(), coordinates)
                        .relocate(at),
                );
            }
            return expression.trim().to_owned();
        }

        let minified = result.minified_content.trim();
        minified
            .strip_prefix("({")
            .and_then(|rest| rest.strip_suffix("})"))
            .map_or_else(|| expression.trim().to_owned(), |body| body.trim().to_owned())
    }

    /// Minify an Angular expression from a directive value or `{{ … }}`.
    pub(super) fn minify_binding_expression(&mut self, expression: &str, at: NodeCoordinates) -> String {
        if expression.trim().is_empty() {
            return expression.trim().to_owned();
        }
        let result = self.minifier.binding_js.minify(expression, true);
        if result.is_ok() {
            return result.minified_content.trim().to_owned();
        }
        for error in result.errors {
            self.warnings.push(
                Diagnostic::new(ErrorCategory::JsTemplateMinificationError, error.message.clone(), error.coordinates())
                    .relocate(at),
            );
        }
        expression.trim().to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_directive_name() {
        assert_eq!(normalize_directive_name("ng-click"), "ng-click");
        assert_eq!(normalize_directive_name("data-ng:click"), "ng-click");
        assert_eq!(normalize_directive_name("X-NG_MODEL"), "ng-model");
    }

    #[test]
    fn test_knockout_comment_patterns() {
        assert!(RE_KO_COMMENT.is_match(" ko foreach: items "));
        assert!(RE_KO_COMMENT.is_match("ko"));
        assert!(!RE_KO_COMMENT.is_match("kool"));
        assert!(RE_KO_END_COMMENT.is_match(" /ko "));
        assert!(RE_ANGULAR_COMMENT_DIRECTIVE.is_match(" directive: my-dir exp"));
    }
}
