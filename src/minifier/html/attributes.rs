//! Attribute processor.
//!
//! Each attribute goes through a fixed sequence: the removal rules
//! (redundant defaults, script/style `type`, `xmlns`), then value rewriting
//! by semantic type, then empty-value removal, then quote selection.

use std::sync::LazyLock;

use regex::Regex;
use smallvec::smallvec;

use super::embedded::{is_css_type, is_js_type};
use super::engine::HtmlRun;
use crate::config::{AttributeQuotesRemovalMode, EmptyTagRenderMode};
use crate::markup::{Attribute, AttributeType, NodeCoordinates, Tag, TagFlags};
use crate::minifier::ErrorCategory;
use crate::minifier::text::{collapse_whitespace, is_html_whitespace, normalize_whitespace};

static RE_CHARSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)charset\s*=\s*([^\s;]+)").unwrap());

static RE_HTML4_UNQUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9\-_:.]+$").unwrap());

static RE_HTML5_UNQUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^[^\s"'`=<>]+$"#).unwrap());

/// `<meta http-equiv="content-type" content="text/html; charset=X">` → `<meta charset=X>`.
pub(super) fn upgrade_meta_charset(tag: Tag) -> Tag {
    if !tag.is("meta")
        || !tag
            .attribute("http-equiv")
            .is_some_and(|a| a.value_eq_ignore_case("content-type"))
    {
        return tag;
    }
    let Some(content) = tag.attribute("content") else {
        return tag;
    };
    let Some(charset) = RE_CHARSET
        .captures(content.value_str())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_owned())
    else {
        return tag;
    };

    let charset = Attribute::new("meta", "charset", Some(charset))
        .with_coordinates(content.name_coordinates, content.value_coordinates);
    Tag::new(tag.name, smallvec![charset], tag.self_closing)
}

/// Values a default makes redundant.
fn is_redundant(tag: &Tag, attr: &Attribute) -> bool {
    let value = attr.value_str().trim();
    let is = |expected: &str| value.eq_ignore_ascii_case(expected);

    match (tag.name_in_lowercase.as_str(), attr.name_in_lowercase.as_str()) {
        ("script", "language") => value.to_ascii_lowercase().starts_with("javascript"),
        ("script", "charset") => !tag.has_attribute("src"),
        ("a", "name") => tag.attribute_value("id").is_some_and(|id| id.trim() == value),
        ("form", "method") => is("get"),
        ("form", "autocomplete") => is("on"),
        ("input", "type") => is("text"),
        ("button", "type") => is("submit"),
        ("area", "shape") => is("rect"),
        ("td" | "th", "colspan" | "rowspan") => value == "1",
        ("link" | "style", "media") => is("all"),
        ("img", "decoding") => is("auto"),
        ("textarea", "wrap") => is("soft"),
        ("track", "kind") => is("subtitles"),
        _ => false,
    }
}

/// Attributes dropped when their value ends up empty.
fn can_remove_empty(tag: &Tag, attr: &Attribute) -> bool {
    if attr.attr_type == AttributeType::Event {
        return true;
    }
    match attr.name_in_lowercase.as_str() {
        "class" | "id" | "style" | "title" | "lang" | "dir" => true,
        "value" => {
            tag.is("input")
                && !tag
                    .attribute_value("type")
                    .is_some_and(|t| matches!(t.trim().to_ascii_lowercase().as_str(), "checkbox" | "radio"))
        }
        _ => false,
    }
}

/// Strip an ASCII prefix case-insensitively.
fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    let head = value.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &value[prefix.len()..])
}

/// Bytes of leading whitespace.
fn leading_whitespace(value: &str) -> usize {
    value.len() - value.trim_start_matches(is_html_whitespace).len()
}

impl HtmlRun<'_> {
    /// Fragments of a start tag: `<name`, one per kept attribute, then the closing.
    pub(super) fn render_start_tag(&mut self, tag: &Tag) -> Vec<String> {
        let mut fragments = vec![format!("<{}", self.rendered_name(tag))];
        let mut last_unquoted = false;
        for attr in &tag.attributes {
            if let Some((fragment, unquoted)) = self.render_attribute(tag, attr) {
                fragments.push(fragment);
                last_unquoted = unquoted;
            }
        }

        let slash_closed = tag.has_flags(TagFlags::EMPTY)
            || (tag.self_closing && (tag.has_flags(TagFlags::XML) || self.is_xhtml()));
        let closing = if !slash_closed {
            ">"
        } else {
            match self.settings.empty_tag_render_mode {
                EmptyTagRenderMode::NoSlash if tag.has_flags(TagFlags::EMPTY) && !self.is_xhtml() => ">",
                EmptyTagRenderMode::SpaceAndSlash => " />",
                // `<img src=a/>` would read as `src="a/"`
                _ if last_unquoted => " />",
                EmptyTagRenderMode::NoSlash if self.is_xhtml() => " />",
                _ => "/>",
            }
        };
        fragments.push(closing.to_owned());
        fragments
    }

    fn is_preservable(&self, tag: &Tag, attr: &Attribute) -> bool {
        self.minifier.preservable_attributes.iter().any(|p| {
            p.matches(&tag.name_in_lowercase, &attr.name_in_lowercase, attr.value_str())
        })
    }

    fn is_removable_type(&self, tag: &Tag, attr: &Attribute) -> bool {
        if attr.name_in_lowercase != "type" {
            return false;
        }
        let value = attr.value_str().trim().to_ascii_lowercase();
        match tag.name_in_lowercase.as_str() {
            "script" => self.settings.remove_js_type_attributes && is_js_type(&value),
            "style" => self.settings.remove_css_type_attributes && is_css_type(&value),
            "link" => {
                self.settings.remove_css_type_attributes
                    && is_css_type(&value)
                    && tag
                        .attribute("rel")
                        .is_some_and(|rel| rel.value_eq_ignore_case("stylesheet"))
            }
            _ => false,
        }
    }

    fn rendered_attribute_name<'a>(&self, tag: &Tag, attr: &'a Attribute) -> &'a str {
        if self.settings.preserve_case || self.is_xhtml() || tag.has_flags(TagFlags::XML) {
            &attr.name
        } else {
            &attr.name_in_lowercase
        }
    }

    /// ` name=value`, or `None` when the attribute is dropped.
    ///
    /// The flag tells whether the value was written without quotes.
    fn render_attribute(&mut self, tag: &Tag, attr: &Attribute) -> Option<(String, bool)> {
        let tag_name = tag.name_in_lowercase.as_str();
        let attr_name = attr.name_in_lowercase.as_str();
        let preservable = self.is_preservable(tag, attr);

        if !preservable
            && ((self.settings.remove_redundant_attributes && is_redundant(tag, attr))
                || self.is_removable_type(tag, attr))
        {
            return None;
        }

        if !self.is_xhtml() {
            if attr_name == "xmlns" && matches!(tag_name, "html" | "svg" | "math") {
                return None;
            }
            if (attr_name.starts_with("xml:") || attr_name.starts_with("xmlns:"))
                && !tag.has_flags(TagFlags::XML)
            {
                self.warn(
                    ErrorCategory::HtmlMinificationWarning,
                    format!("Namespaced attribute `{}` has no meaning in HTML", attr.name),
                    attr.name_coordinates,
                );
            }
        }

        let name = self.rendered_attribute_name(tag, attr).to_owned();
        let Some(raw) = attr.value.as_deref() else {
            return Some(if !self.is_xhtml() {
                (format!(" {name}"), false)
            } else if attr.attr_type == AttributeType::Boolean {
                (format!(" {name}=\"{name}\""), false)
            } else {
                (format!(" {name}=\"\""), false)
            });
        };

        if attr.attr_type == AttributeType::Boolean {
            let meaningful_value = attr_name == "hidden"
                && !raw.trim().is_empty()
                && !raw.trim().eq_ignore_ascii_case("hidden");
            if self.settings.collapse_boolean_attributes && !self.is_xhtml() && !meaningful_value {
                return Some((format!(" {name}"), false));
            }
            if self.is_xhtml() && raw.trim().is_empty() {
                return Some((format!(" {name}=\"{name}\""), false));
            }
        }

        let value = if raw.contains("{{") && raw.contains("}}") {
            self.clean_templated_value(attr, raw)
        } else {
            self.clean_value(tag, attr, raw)
        };

        if !preservable
            && self.settings.remove_empty_attributes
            && value.is_empty()
            && can_remove_empty(tag, attr)
        {
            return None;
        }

        Some(self.quote(tag, &name, &value))
    }

    fn quote(&self, tag: &Tag, name: &str, value: &str) -> (String, bool) {
        let grammar = match self.settings.attribute_quotes_removal_mode {
            AttributeQuotesRemovalMode::KeepQuotes => None,
            AttributeQuotesRemovalMode::Html4 => Some(&*RE_HTML4_UNQUOTED),
            AttributeQuotesRemovalMode::Html5 => Some(&*RE_HTML5_UNQUOTED),
        };
        let unquoted = !self.is_xhtml()
            && !tag.has_flags(TagFlags::XML)
            && !value.ends_with('/')
            && grammar.is_some_and(|re| re.is_match(value));
        if unquoted {
            return (format!(" {name}={value}"), true);
        }

        let rendered = match (value.contains('"'), value.contains('\'')) {
            (true, false) => format!(" {name}='{value}'"),
            (true, true) => format!(" {name}=\"{}\"", value.replace('"', "&#34;")),
            _ => format!(" {name}=\"{value}\""),
        };
        (rendered, false)
    }

    // ------------------------------------------------------------------------
    // Values
    // ------------------------------------------------------------------------

    fn clean_value(&mut self, tag: &Tag, attr: &Attribute, raw: &str) -> String {
        let at = attr.value_coordinates;
        match attr.attr_type {
            AttributeType::Uri => self.clean_uri(tag, raw, at),
            AttributeType::Numeric => raw.trim().to_owned(),
            AttributeType::ClassName => normalize_whitespace(raw),
            AttributeType::Style => {
                let trimmed = raw.trim();
                if self.settings.minify_inline_css_code && !trimmed.is_empty() {
                    let minified = self.minify_css_code(raw, true, at);
                    minified.trim_end_matches(';').to_owned()
                } else {
                    trimmed.trim_end_matches(';').trim_end().to_owned()
                }
            }
            AttributeType::Event => self.clean_event_handler(raw, at),
            AttributeType::Boolean | AttributeType::Text => self.clean_text_value(tag, attr, raw),
        }
    }

    fn clean_uri(&mut self, tag: &Tag, raw: &str, at: NodeCoordinates) -> String {
        let leading = leading_whitespace(raw);
        let value = raw.trim();

        if let Some(code) = strip_prefix_ignore_case(value, "javascript:") {
            if self.settings.minify_inline_js_code && !code.trim().is_empty() {
                let code_at = at.advance(&raw[..leading + "javascript:".len()]);
                let minified = self.minify_js_code(code, true, code_at);
                return format!("{}{minified}", &value[.."javascript:".len()]);
            }
            return value.to_owned();
        }

        let external = tag.attribute("rel").is_some_and(|rel| {
            rel.value_str()
                .split_ascii_whitespace()
                .any(|token| token.eq_ignore_ascii_case("external"))
        });
        if !external {
            if self.settings.remove_http_protocol_from_attributes {
                if let Some(rest) = strip_prefix_ignore_case(value, "http://") {
                    return format!("//{rest}");
                }
            }
            if self.settings.remove_https_protocol_from_attributes {
                if let Some(rest) = strip_prefix_ignore_case(value, "https://") {
                    return format!("//{rest}");
                }
            }
        }
        value.to_owned()
    }

    fn clean_event_handler(&mut self, raw: &str, at: NodeCoordinates) -> String {
        let mut offset = leading_whitespace(raw);
        let mut code = raw.trim();
        if self.settings.remove_js_protocol_from_attributes {
            if let Some(rest) = strip_prefix_ignore_case(code, "javascript:") {
                offset += "javascript:".len();
                code = rest;
            }
        }
        if !self.settings.minify_inline_js_code || code.trim().is_empty() {
            return code.trim().to_owned();
        }

        let minified = self.minify_js_code(code, true, at.advance(&raw[..offset]));
        match minified.strip_suffix(';') {
            Some(stripped) => stripped.to_owned(),
            None => minified,
        }
    }

    fn clean_text_value(&mut self, tag: &Tag, attr: &Attribute, raw: &str) -> String {
        let name = attr.name_in_lowercase.as_str();
        if name == "data-bind" && self.settings.minify_knockout_binding_expressions {
            return self.minify_knockout_binding(raw, attr.value_coordinates);
        }
        if self.settings.minify_angular_binding_expressions && self.minifier.is_angular_directive(name) {
            return self.minify_binding_expression(raw, attr.value_coordinates);
        }
        if name == "content"
            && tag.is("meta")
            && tag
                .attribute("name")
                .is_some_and(|n| n.value_eq_ignore_case("keywords"))
        {
            return raw
                .split(',')
                .map(str::trim)
                .filter(|keyword| !keyword.is_empty())
                .collect::<Vec<_>>()
                .join(",");
        }
        raw.to_owned()
    }

    /// Values mixing literal text with `{{ … }}` expressions.
    fn clean_templated_value(&mut self, attr: &Attribute, raw: &str) -> String {
        let mut out = String::with_capacity(raw.len());
        let mut consumed = 0;

        loop {
            let rest = &raw[consumed..];
            let Some(open) = rest.find("{{") else {
                break;
            };
            let (start, end) = if rest[open..].starts_with("{{{") {
                ("{{{", "}}}")
            } else {
                ("{{", "}}")
            };
            let expr_start = open + start.len();
            let Some(close) = rest[expr_start..].find(end) else {
                break;
            };
            let expr_end = expr_start + close;

            out.push_str(&clean_literal(attr.attr_type, &rest[..open], consumed == 0, false));
            if self.settings.minify_angular_binding_expressions {
                let at = attr
                    .value_coordinates
                    .advance(&raw[..consumed + expr_start]);
                let expression = self.minify_binding_expression(&rest[expr_start..expr_end], at);
                out.push_str(start);
                out.push_str(&expression);
                out.push_str(end);
            } else {
                out.push_str(&rest[open..expr_end + end.len()]);
            }
            consumed += expr_end + end.len();
        }

        out.push_str(&clean_literal(attr.attr_type, &raw[consumed..], consumed == 0, true));
        out
    }
}

/// Type-specific cleanup of the literal parts of a templated value.
fn clean_literal(attr_type: AttributeType, literal: &str, is_first: bool, is_last: bool) -> String {
    let mut value = match attr_type {
        AttributeType::ClassName => collapse_whitespace(literal, false).into_owned(),
        _ => literal.to_owned(),
    };
    let trims = matches!(
        attr_type,
        AttributeType::Uri | AttributeType::Numeric | AttributeType::ClassName | AttributeType::Style
    );
    if trims && is_first {
        value = value.trim_start_matches(is_html_whitespace).to_owned();
    }
    if trims && is_last {
        value = value.trim_end_matches(is_html_whitespace).to_owned();
        if attr_type == AttributeType::Style {
            value = value.trim_end_matches(';').to_owned();
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::Attributes;

    fn tag(name: &str, attrs: &[(&str, &str)]) -> Tag {
        let attributes: Attributes = attrs
            .iter()
            .map(|(n, v)| Attribute::new(name, *n, Some((*v).to_owned())))
            .collect();
        Tag::new(name, attributes, false)
    }

    #[test]
    fn test_meta_charset_upgrade() {
        let upgraded = upgrade_meta_charset(tag(
            "meta",
            &[("http-equiv", "Content-Type"), ("content", "text/html; charset=UTF-8")],
        ));
        assert_eq!(upgraded.attributes.len(), 1);
        assert_eq!(upgraded.attribute_value("charset"), Some("UTF-8"));

        let untouched = upgrade_meta_charset(tag("meta", &[("name", "viewport")]));
        assert_eq!(untouched.attributes.len(), 1);
        assert!(untouched.has_attribute("name"));
    }

    #[test]
    fn test_redundant_rules() {
        let form = tag("form", &[("method", "GET")]);
        assert!(is_redundant(&form, &form.attributes[0]));

        let anchor = tag("a", &[("id", "top"), ("name", "top")]);
        assert!(is_redundant(&anchor, &anchor.attributes[1]));

        let anchor = tag("a", &[("id", "top"), ("name", "bottom")]);
        assert!(!is_redundant(&anchor, &anchor.attributes[1]));

        let script = tag("script", &[("src", "a.js"), ("charset", "utf-8")]);
        assert!(!is_redundant(&script, &script.attributes[1]));
    }

    #[test]
    fn test_empty_removal_allow_list() {
        let input = tag("input", &[("type", "checkbox"), ("value", "")]);
        assert!(!can_remove_empty(&input, &input.attributes[1]));
        let input = tag("input", &[("value", "")]);
        assert!(can_remove_empty(&input, &input.attributes[0]));
        let a = tag("a", &[("href", "")]);
        assert!(!can_remove_empty(&a, &a.attributes[0]));
    }

    #[test]
    fn test_clean_literal() {
        assert_eq!(clean_literal(AttributeType::ClassName, "  a   b ", true, false), "a b ");
        assert_eq!(clean_literal(AttributeType::Style, "color:red; ", false, true), "color:red");
        assert_eq!(clean_literal(AttributeType::Text, "  x ", true, true), "  x ");
    }
}
