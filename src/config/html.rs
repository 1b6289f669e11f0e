//! `[html]` section configuration.
//!
//! The option surface of the HTML and XHTML minifiers.

use super::{ConfigError, defaults};
use educe::Educe;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

// ============================================================================
// Enums
// ============================================================================

/// How hard whitespace between nodes is squeezed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum WhitespaceMinificationMode {
    /// Leave whitespace alone.
    None,
    /// Collapse runs to one space, never trim next to a tag.
    Safe,
    /// Also trim around block, invisible and non-independent tags (default).
    #[default]
    Medium,
    /// Also trim around inline and inline-block tags.
    Aggressive,
}

/// How void elements (`br`, `img`, …) are closed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmptyTagRenderMode {
    /// `<br>` (default).
    #[default]
    NoSlash,
    /// `<br/>`
    Slash,
    /// `<br />`
    SpaceAndSlash,
}

/// When attribute values may lose their quotes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttributeQuotesRemovalMode {
    /// Always quote.
    KeepQuotes,
    /// Unquote values matching `[a-zA-Z0-9-_:.]+`.
    Html4,
    /// Unquote values free of whitespace, quotes, `` ` ``, `=`, `<` and `>` (default).
    #[default]
    Html5,
}

// ============================================================================
// Preservable Attributes
// ============================================================================

static RE_PRESERVABLE_ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*([a-zA-Z0-9\-_:]*)\[\s*([^\s=\]]+)\s*(?:=\s*"?([^"\]]*)"?\s*)?\]\s*$"#)
        .unwrap()
});

/// An attribute the redundancy and empty-value rules must not drop.
///
/// Written as `tag[attr]`, `tag[attr=value]`, `[attr]` or `[attr=value]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreservableAttribute {
    pub tag: Option<String>,
    pub name: String,
    pub value: Option<String>,
}

impl PreservableAttribute {
    pub fn parse(expression: &str) -> Option<Self> {
        let caps = RE_PRESERVABLE_ATTRIBUTE.captures(expression)?;
        let tag = caps
            .get(1)
            .map(|m| m.as_str().to_ascii_lowercase())
            .filter(|t| !t.is_empty());
        Some(Self {
            tag,
            name: caps[2].to_ascii_lowercase(),
            value: caps.get(3).map(|m| m.as_str().trim().to_owned()),
        })
    }

    /// `tag` and `name` are lowercase.
    pub fn matches(&self, tag: &str, name: &str, value: &str) -> bool {
        self.tag.as_deref().is_none_or(|t| t == tag)
            && self.name == name
            && self
                .value
                .as_deref()
                .is_none_or(|v| v.eq_ignore_ascii_case(value.trim()))
    }
}

// ============================================================================
// HtmlSettings
// ============================================================================

/// `[html]` section in markmin.toml - HTML/XHTML minification options.
///
/// # Example
/// ```toml
/// [html]
/// whitespace_minification_mode = "aggressive"
/// remove_optional_end_tags = false
/// preservable_html_comments = ["^\\s*google_ad"]
/// attribute_quotes_removal_mode = "keep-quotes"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct HtmlSettings {
    #[serde(default = "defaults::html::whitespace_minification_mode")]
    #[educe(Default = defaults::html::whitespace_minification_mode())]
    pub whitespace_minification_mode: WhitespaceMinificationMode,

    /// Collapse whitespace runs containing a line break to `\n` instead of a space.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub preserve_new_lines: bool,

    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub remove_html_comments: bool,

    /// Drop `<!-- … -->` wrappers around script and style bodies.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub remove_html_comments_from_scripts_and_styles: bool,

    /// Drop `<![CDATA[ … ]]>` wrappers around script and style bodies.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub remove_cdata_sections_from_scripts_and_styles: bool,

    /// Regexes matched against comment text; matching comments are kept.
    #[serde(default = "defaults::empty_list")]
    #[educe(Default = defaults::empty_list())]
    pub preservable_html_comments: Vec<String>,

    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub use_short_doctype: bool,

    #[serde(default = "defaults::html::custom_short_doctype")]
    #[educe(Default = defaults::html::custom_short_doctype())]
    pub custom_short_doctype: String,

    /// Keep tag and attribute names as written.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub preserve_case: bool,

    /// Rewrite `<meta http-equiv="content-type">` to `<meta charset>`.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub use_meta_charset_tag: bool,

    #[serde(default = "defaults::html::empty_tag_render_mode")]
    #[educe(Default = defaults::html::empty_tag_render_mode())]
    pub empty_tag_render_mode: EmptyTagRenderMode,

    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub remove_optional_end_tags: bool,

    /// Tag names whose end tags are never removed.
    #[serde(default = "defaults::empty_list")]
    #[educe(Default = defaults::empty_list())]
    pub preservable_optional_tags: Vec<String>,

    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub remove_tags_without_content: bool,

    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub collapse_boolean_attributes: bool,

    #[serde(default = "defaults::html::attribute_quotes_removal_mode")]
    #[educe(Default = defaults::html::attribute_quotes_removal_mode())]
    pub attribute_quotes_removal_mode: AttributeQuotesRemovalMode,

    /// `tag[attr]` / `tag[attr=value]` / `[attr]` expressions.
    #[serde(default = "defaults::empty_list")]
    #[educe(Default = defaults::empty_list())]
    pub preservable_attributes: Vec<String>,

    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub remove_empty_attributes: bool,

    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub remove_redundant_attributes: bool,

    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub remove_js_type_attributes: bool,

    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub remove_css_type_attributes: bool,

    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub remove_http_protocol_from_attributes: bool,

    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub remove_https_protocol_from_attributes: bool,

    /// Strip `javascript:` from event handler attributes.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub remove_js_protocol_from_attributes: bool,

    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub minify_embedded_css_code: bool,

    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub minify_inline_css_code: bool,

    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub minify_embedded_js_code: bool,

    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub minify_inline_js_code: bool,

    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub minify_embedded_json_data: bool,

    /// Extra `<script type>` values whose body is re-minified as HTML.
    #[serde(default = "defaults::empty_list")]
    #[educe(Default = defaults::empty_list())]
    pub processable_script_types: Vec<String>,

    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub minify_knockout_binding_expressions: bool,

    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub minify_angular_binding_expressions: bool,

    /// Additional attribute names holding Angular expressions.
    #[serde(default = "defaults::empty_list")]
    #[educe(Default = defaults::empty_list())]
    pub custom_angular_directives: Vec<String>,

    /// Recognise `{{ … }}` template tags in text.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub process_template_tags: bool,
}

impl HtmlSettings {
    /// Preset for XHTML output.
    pub fn xhtml() -> Self {
        Self {
            empty_tag_render_mode: EmptyTagRenderMode::SpaceAndSlash,
            attribute_quotes_removal_mode: AttributeQuotesRemovalMode::KeepQuotes,
            remove_optional_end_tags: false,
            collapse_boolean_attributes: false,
            use_short_doctype: false,
            ..Self::default()
        }
    }

    /// Settings for re-minifying template bodies (`<script type="text/html">`).
    ///
    /// Code inside templates is left as is.
    pub fn template_settings(&self) -> Self {
        Self {
            minify_embedded_css_code: false,
            minify_inline_css_code: false,
            minify_embedded_js_code: false,
            minify_inline_js_code: false,
            minify_embedded_json_data: false,
            ..self.clone()
        }
    }

    /// Regexes of `preservable_html_comments`, skipping invalid ones.
    pub fn preservable_comment_regexes(&self) -> Vec<Regex> {
        self.preservable_html_comments
            .iter()
            .filter_map(|pattern| Regex::new(pattern).ok())
            .collect()
    }

    /// Parsed `preservable_attributes`, skipping malformed ones.
    pub fn parsed_preservable_attributes(&self) -> Vec<PreservableAttribute> {
        self.preservable_attributes
            .iter()
            .filter_map(|expr| PreservableAttribute::parse(expr))
            .collect()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for pattern in &self.preservable_html_comments {
            if let Err(e) = Regex::new(pattern) {
                return Err(ConfigError::Validation(format!(
                    "[html.preservable_html_comments] invalid regex `{pattern}`: {e}"
                )));
            }
        }

        if let Some(expr) = self
            .preservable_attributes
            .iter()
            .find(|expr| PreservableAttribute::parse(expr).is_none())
        {
            return Err(ConfigError::Validation(format!(
                "[html.preservable_attributes] malformed expression `{expr}`"
            )));
        }

        if self.use_short_doctype && !self.custom_short_doctype.trim_start().starts_with("<!") {
            return Err(ConfigError::Validation(
                "[html.custom_short_doctype] must start with `<!`".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = HtmlSettings::default();
        assert_eq!(
            settings.whitespace_minification_mode,
            WhitespaceMinificationMode::Medium
        );
        assert!(settings.remove_optional_end_tags);
        assert!(!settings.remove_tags_without_content);
        assert_eq!(settings.custom_short_doctype, "<!DOCTYPE html>");
        assert_eq!(
            settings.attribute_quotes_removal_mode,
            AttributeQuotesRemovalMode::Html5
        );
    }

    #[test]
    fn test_deserialize_partial() {
        let settings: HtmlSettings = toml::from_str(
            r#"
            whitespace_minification_mode = "aggressive"
            empty_tag_render_mode = "space-and-slash"
            preservable_optional_tags = ["p"]
        "#,
        )
        .unwrap();
        assert_eq!(
            settings.whitespace_minification_mode,
            WhitespaceMinificationMode::Aggressive
        );
        assert_eq!(settings.empty_tag_render_mode, EmptyTagRenderMode::SpaceAndSlash);
        assert_eq!(settings.preservable_optional_tags, vec!["p"]);
        assert!(settings.remove_html_comments);
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(toml::from_str::<HtmlSettings>("remove_everything = true").is_err());
    }

    #[test]
    fn test_xhtml_preset() {
        let settings = HtmlSettings::xhtml();
        assert_eq!(settings.empty_tag_render_mode, EmptyTagRenderMode::SpaceAndSlash);
        assert_eq!(
            settings.attribute_quotes_removal_mode,
            AttributeQuotesRemovalMode::KeepQuotes
        );
        assert!(!settings.remove_optional_end_tags);
    }

    #[test]
    fn test_preservable_attribute_parse() {
        let attr = PreservableAttribute::parse("form[method=get]").unwrap();
        assert_eq!(attr.tag.as_deref(), Some("form"));
        assert_eq!(attr.name, "method");
        assert_eq!(attr.value.as_deref(), Some("get"));
        assert!(attr.matches("form", "method", "GET"));
        assert!(!attr.matches("form", "method", "post"));

        let attr = PreservableAttribute::parse("[type]").unwrap();
        assert!(attr.tag.is_none());
        assert!(attr.matches("input", "type", "text"));

        assert!(PreservableAttribute::parse("form method").is_none());
    }

    #[test]
    fn test_validate() {
        let mut settings = HtmlSettings::default();
        assert!(settings.validate().is_ok());

        settings.preservable_html_comments = vec!["(unclosed".into()];
        assert!(settings.validate().is_err());

        settings.preservable_html_comments.clear();
        settings.preservable_attributes = vec!["nope".into()];
        assert!(settings.validate().is_err());

        settings.preservable_attributes.clear();
        settings.custom_short_doctype = "html".into();
        assert!(settings.validate().is_err());
    }
}
