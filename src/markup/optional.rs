//! When may an end tag be left out without changing the parsed tree.
//!
//! Both lookups take lowercase names. Neither knows about user preferences;
//! the minifier layers those on top.

/// End tags that can always be dropped at the end of the document.
pub const SAFE_OPTIONAL_END_TAGS: [&str; 4] = ["html", "head", "body", "colgroup"];

#[inline]
pub fn is_safe_optional_end_tag(name: &str) -> bool {
    SAFE_OPTIONAL_END_TAGS.contains(&name)
}

/// Start tags that close an open `p`.
pub fn closes_paragraph(name: &str) -> bool {
    matches!(
        name,
        "address"
            | "article"
            | "aside"
            | "blockquote"
            | "details"
            | "dialog"
            | "div"
            | "dl"
            | "fieldset"
            | "figcaption"
            | "figure"
            | "footer"
            | "form"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "header"
            | "hgroup"
            | "hr"
            | "main"
            | "menu"
            | "nav"
            | "ol"
            | "p"
            | "pre"
            | "search"
            | "section"
            | "table"
            | "ul"
    )
}

/// The end tag of `name` may be omitted when the start tag `next` follows it.
pub fn omissible_before(name: &str, next: &str) -> bool {
    match name {
        "p" => closes_paragraph(next),
        "head" => next == "body",
        // A `col` after an omitted `</colgroup>` joins the open group.
        "colgroup" => next != "col",
        "li" => next == "li",
        "dt" | "dd" => matches!(next, "dt" | "dd"),
        "rb" | "rt" | "rp" => matches!(next, "rb" | "rt" | "rtc" | "rp"),
        "rtc" => matches!(next, "rb" | "rtc" | "rp"),
        "optgroup" => next == "optgroup",
        "option" => matches!(next, "option" | "optgroup"),
        "thead" | "tbody" => matches!(next, "tbody" | "tfoot"),
        "tr" => next == "tr",
        "td" | "th" => matches!(next, "td" | "th"),
        _ => false,
    }
}

/// The end tag of `name` may be omitted when its parent `parent` ends right
/// after it.
pub fn omissible_in(name: &str, parent: &str) -> bool {
    match name {
        "p" => !matches!(
            parent,
            "a" | "audio" | "del" | "ins" | "map" | "noscript" | "video"
        ),
        "li" => matches!(parent, "ul" | "ol" | "menu"),
        "dd" => matches!(parent, "dl" | "div"),
        "rb" | "rt" | "rp" => matches!(parent, "ruby" | "rtc"),
        "rtc" => parent == "ruby",
        "optgroup" => parent == "select",
        "option" => matches!(parent, "select" | "optgroup" | "datalist"),
        "tbody" | "tfoot" => parent == "table",
        "tr" => matches!(parent, "table" | "thead" | "tbody" | "tfoot"),
        "td" | "th" => parent == "tr",
        _ => is_safe_optional_end_tag(name),
    }
}

/// The open element `open` is implicitly closed by the start tag `next`.
pub fn implicitly_closed_by(open: &str, next: &str) -> bool {
    match open {
        "head" => next == "body",
        "colgroup" => matches!(next, "thead" | "tbody" | "tfoot" | "tr"),
        "thead" | "tbody" | "tfoot" => next == "tbody" || next == "tfoot" || next == "thead",
        _ => omissible_before(open, next),
    }
}
