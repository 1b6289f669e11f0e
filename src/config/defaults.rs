//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

// ============================================================================
// Common Defaults
// ============================================================================

pub fn r#true() -> bool {
    true
}

pub fn r#false() -> bool {
    false
}

pub fn empty_list() -> Vec<String> {
    Vec::new()
}

// ============================================================================
// Top-level Defaults
// ============================================================================

pub fn mode() -> super::MarkupMode {
    super::MarkupMode::Html
}

pub fn output() -> Option<std::path::PathBuf> {
    None
}

pub fn encoding() -> String {
    "utf-8".into()
}

// ============================================================================
// [html] Section Defaults
// ============================================================================

pub mod html {
    use super::super::{AttributeQuotesRemovalMode, EmptyTagRenderMode, WhitespaceMinificationMode};

    pub fn whitespace_minification_mode() -> WhitespaceMinificationMode {
        WhitespaceMinificationMode::Medium
    }

    pub fn custom_short_doctype() -> String {
        "<!DOCTYPE html>".into()
    }

    pub fn empty_tag_render_mode() -> EmptyTagRenderMode {
        EmptyTagRenderMode::NoSlash
    }

    pub fn attribute_quotes_removal_mode() -> AttributeQuotesRemovalMode {
        AttributeQuotesRemovalMode::Html5
    }
}
