//! Static classification of HTML tags and attributes.
//!
//! Pure lookups over lowercase names. Everything here is compile-time data.

use bitflags::bitflags;

bitflags! {
    /// Rendering and parsing traits of a tag.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TagFlags: u16 {
        const BLOCK = 1;
        const INLINE = 1 << 1;
        const INLINE_BLOCK = 1 << 2;
        /// Void element, never has content or an end tag.
        const EMPTY = 1 << 3;
        /// End tag may be omitted.
        const OPTIONAL = 1 << 4;
        /// Only meaningful inside a specific parent (list items, table parts, ruby text).
        const NON_INDEPENDENT = 1 << 5;
        /// Never renders visible content.
        const INVISIBLE = 1 << 6;
        /// Body is script or stylesheet code.
        const EMBEDDED_CODE = 1 << 7;
        /// Foreign (SVG/MathML) island.
        const XML = 1 << 8;
    }
}

/// Semantic type of an attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AttributeType {
    #[default]
    Text,
    Boolean,
    Uri,
    Numeric,
    ClassName,
    Style,
    Event,
}

/// Flags of a tag given its lowercase name.
pub fn tag_flags(name: &str) -> TagFlags {
    let mut flags = TagFlags::empty();

    if is_block(name) {
        flags |= TagFlags::BLOCK;
    }
    if is_inline(name) {
        flags |= TagFlags::INLINE;
    }
    if is_inline_block(name) {
        flags |= TagFlags::INLINE_BLOCK;
    }
    if is_empty(name) {
        flags |= TagFlags::EMPTY;
    }
    if is_optional(name) {
        flags |= TagFlags::OPTIONAL;
    }
    if is_non_independent(name) {
        flags |= TagFlags::NON_INDEPENDENT;
    }
    if is_invisible(name) {
        flags |= TagFlags::INVISIBLE;
    }
    if matches!(name, "script" | "style") {
        flags |= TagFlags::EMBEDDED_CODE;
    }
    if matches!(name, "svg" | "math") {
        flags |= TagFlags::XML;
    }

    flags
}

fn is_block(name: &str) -> bool {
    matches!(
        name,
        "address"
            | "article"
            | "aside"
            | "blockquote"
            | "body"
            | "caption"
            | "center"
            | "col"
            | "colgroup"
            | "dd"
            | "details"
            | "dialog"
            | "dir"
            | "div"
            | "dl"
            | "dt"
            | "fieldset"
            | "figcaption"
            | "figure"
            | "footer"
            | "form"
            | "frame"
            | "frameset"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "head"
            | "header"
            | "hgroup"
            | "hr"
            | "html"
            | "legend"
            | "li"
            | "listing"
            | "main"
            | "menu"
            | "nav"
            | "noframes"
            | "ol"
            | "optgroup"
            | "option"
            | "p"
            | "pre"
            | "search"
            | "section"
            | "summary"
            | "table"
            | "tbody"
            | "td"
            | "tfoot"
            | "th"
            | "thead"
            | "tr"
            | "ul"
            | "xmp"
    )
}

fn is_inline(name: &str) -> bool {
    matches!(
        name,
        "a" | "abbr"
            | "acronym"
            | "b"
            | "bdi"
            | "bdo"
            | "big"
            | "blink"
            | "br"
            | "cite"
            | "code"
            | "data"
            | "del"
            | "dfn"
            | "em"
            | "font"
            | "i"
            | "ins"
            | "kbd"
            | "label"
            | "mark"
            | "nobr"
            | "output"
            | "q"
            | "rb"
            | "rp"
            | "rt"
            | "rtc"
            | "ruby"
            | "s"
            | "samp"
            | "small"
            | "span"
            | "strike"
            | "strong"
            | "sub"
            | "sup"
            | "time"
            | "tt"
            | "u"
            | "var"
            | "wbr"
    )
}

fn is_inline_block(name: &str) -> bool {
    matches!(
        name,
        "applet"
            | "audio"
            | "button"
            | "canvas"
            | "embed"
            | "iframe"
            | "img"
            | "input"
            | "keygen"
            | "math"
            | "meter"
            | "object"
            | "picture"
            | "progress"
            | "select"
            | "svg"
            | "textarea"
            | "video"
    )
}

/// Void elements.
pub fn is_empty(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "base"
            | "basefont"
            | "bgsound"
            | "br"
            | "col"
            | "command"
            | "embed"
            | "frame"
            | "hr"
            | "image"
            | "img"
            | "input"
            | "isindex"
            | "keygen"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

fn is_optional(name: &str) -> bool {
    matches!(
        name,
        "body"
            | "colgroup"
            | "dd"
            | "dt"
            | "head"
            | "html"
            | "li"
            | "optgroup"
            | "option"
            | "p"
            | "rb"
            | "rp"
            | "rt"
            | "rtc"
            | "tbody"
            | "td"
            | "tfoot"
            | "th"
            | "thead"
            | "tr"
    )
}

fn is_non_independent(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "caption"
            | "col"
            | "colgroup"
            | "dd"
            | "dt"
            | "figcaption"
            | "legend"
            | "li"
            | "optgroup"
            | "option"
            | "param"
            | "rb"
            | "rp"
            | "rt"
            | "rtc"
            | "source"
            | "summary"
            | "tbody"
            | "td"
            | "tfoot"
            | "th"
            | "thead"
            | "tr"
            | "track"
    )
}

fn is_invisible(name: &str) -> bool {
    matches!(
        name,
        "base"
            | "basefont"
            | "bgsound"
            | "datalist"
            | "head"
            | "link"
            | "meta"
            | "param"
            | "script"
            | "source"
            | "style"
            | "template"
            | "title"
            | "track"
    )
}

/// Elements whose whitespace is rendered as written.
#[inline]
pub fn preserves_whitespace(name: &str) -> bool {
    matches!(name, "pre" | "textarea" | "listing")
}

/// Elements whose body the tokenizer passes through as one raw text run.
#[inline]
pub fn is_raw_text(name: &str) -> bool {
    matches!(
        name,
        "script"
            | "style"
            | "textarea"
            | "title"
            | "xmp"
            | "iframe"
            | "noembed"
            | "noframes"
            | "svg"
            | "math"
    )
}

/// Attributes whose presence alone carries the value.
pub fn is_boolean_attribute(name: &str) -> bool {
    matches!(
        name,
        "allowfullscreen"
            | "async"
            | "autofocus"
            | "autoplay"
            | "checked"
            | "compact"
            | "controls"
            | "declare"
            | "default"
            | "defaultchecked"
            | "defaultmuted"
            | "defaultselected"
            | "defer"
            | "disabled"
            | "enabled"
            | "formnovalidate"
            | "hidden"
            | "indeterminate"
            | "inert"
            | "ismap"
            | "itemscope"
            | "loop"
            | "multiple"
            | "muted"
            | "nohref"
            | "nomodule"
            | "noresize"
            | "noshade"
            | "novalidate"
            | "nowrap"
            | "open"
            | "pauseonexit"
            | "playsinline"
            | "readonly"
            | "required"
            | "reversed"
            | "scoped"
            | "seamless"
            | "selected"
            | "sortable"
            | "truespeed"
            | "typemustmatch"
            | "visible"
    )
}

fn is_uri_attribute(tag: &str, attribute: &str) -> bool {
    match attribute {
        "href" => matches!(tag, "a" | "area" | "base" | "link"),
        "src" => matches!(
            tag,
            "audio"
                | "embed"
                | "frame"
                | "iframe"
                | "img"
                | "input"
                | "script"
                | "source"
                | "track"
                | "video"
        ),
        "action" => tag == "form",
        "formaction" => matches!(tag, "button" | "input"),
        "cite" => matches!(tag, "blockquote" | "del" | "ins" | "q"),
        "longdesc" => matches!(tag, "frame" | "iframe" | "img"),
        "usemap" => matches!(tag, "img" | "input" | "object"),
        "classid" | "codebase" | "data" => tag == "object",
        "poster" => tag == "video",
        "background" => tag == "body",
        "profile" => tag == "head",
        "manifest" => tag == "html",
        "icon" => tag == "command",
        _ => false,
    }
}

fn is_numeric_attribute(tag: &str, attribute: &str) -> bool {
    match attribute {
        "tabindex" => true,
        "maxlength" | "minlength" => matches!(tag, "input" | "textarea"),
        "size" => matches!(tag, "input" | "select"),
        "rows" | "cols" => tag == "textarea",
        "colspan" | "rowspan" => matches!(tag, "td" | "th"),
        "span" => matches!(tag, "col" | "colgroup"),
        "start" => tag == "ol",
        "value" => tag == "li",
        "high" | "low" | "optimum" => tag == "meter",
        "max" | "min" => matches!(tag, "meter" | "progress"),
        _ => false,
    }
}

/// Semantic type of `attribute` on `tag` (both lowercase).
pub fn attribute_type(tag: &str, attribute: &str) -> AttributeType {
    if is_boolean_attribute(attribute) {
        AttributeType::Boolean
    } else if is_uri_attribute(tag, attribute) {
        AttributeType::Uri
    } else if is_numeric_attribute(tag, attribute) {
        AttributeType::Numeric
    } else if attribute == "class" {
        AttributeType::ClassName
    } else if attribute == "style" {
        AttributeType::Style
    } else if attribute.len() > 2 && attribute.starts_with("on") {
        AttributeType::Event
    } else {
        AttributeType::Text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_flags_block_and_optional() {
        let flags = tag_flags("li");
        assert!(flags.contains(TagFlags::BLOCK));
        assert!(flags.contains(TagFlags::OPTIONAL));
        assert!(flags.contains(TagFlags::NON_INDEPENDENT));
        assert!(!flags.contains(TagFlags::INLINE));
    }

    #[test]
    fn test_tag_flags_void_inline_block() {
        let flags = tag_flags("img");
        assert!(flags.contains(TagFlags::EMPTY | TagFlags::INLINE_BLOCK));
    }

    #[test]
    fn test_tag_flags_embedded_code_and_xml() {
        assert!(tag_flags("script").contains(TagFlags::EMBEDDED_CODE | TagFlags::INVISIBLE));
        assert!(tag_flags("svg").contains(TagFlags::XML));
        assert_eq!(tag_flags("my-widget"), TagFlags::empty());
    }

    #[test]
    fn test_attribute_types() {
        assert_eq!(attribute_type("input", "disabled"), AttributeType::Boolean);
        assert_eq!(attribute_type("a", "href"), AttributeType::Uri);
        assert_eq!(attribute_type("div", "href"), AttributeType::Text);
        assert_eq!(attribute_type("td", "colspan"), AttributeType::Numeric);
        assert_eq!(attribute_type("p", "class"), AttributeType::ClassName);
        assert_eq!(attribute_type("p", "style"), AttributeType::Style);
        assert_eq!(attribute_type("button", "onclick"), AttributeType::Event);
        assert_eq!(attribute_type("p", "on"), AttributeType::Text);
    }
}
