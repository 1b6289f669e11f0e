//! Whitespace helpers shared by the engines.

use std::borrow::Cow;

/// ASCII whitespace as HTML defines it.
#[inline]
pub fn is_html_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0C')
}

#[inline]
pub fn is_whitespace_only(text: &str) -> bool {
    text.chars().all(is_html_whitespace)
}

/// Replace every whitespace run with one space, or with `\n` when the run
/// held a line break and `preserve_new_lines` is set.
pub fn collapse_whitespace(text: &str, preserve_new_lines: bool) -> Cow<'_, str> {
    if !needs_collapse(text, preserve_new_lines) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if !is_html_whitespace(c) {
            out.push(c);
            continue;
        }
        let mut newline = matches!(c, '\n' | '\r');
        while let Some(&next) = chars.peek() {
            if !is_html_whitespace(next) {
                break;
            }
            newline |= matches!(next, '\n' | '\r');
            chars.next();
        }
        out.push(if newline && preserve_new_lines { '\n' } else { ' ' });
    }
    Cow::Owned(out)
}

fn needs_collapse(text: &str, preserve_new_lines: bool) -> bool {
    let mut previous_ws = false;
    for c in text.chars() {
        let ws = is_html_whitespace(c);
        let canonical = c == ' ' || (preserve_new_lines && c == '\n');
        if ws && (previous_ws || !canonical) {
            return true;
        }
        previous_ws = ws;
    }
    false
}

/// Collapse and trim: the form used for doctypes, declarations and
/// conditional-comment expressions.
pub fn normalize_whitespace(text: &str) -> String {
    collapse_whitespace(text.trim_matches(is_html_whitespace), false).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse() {
        assert_eq!(collapse_whitespace("a  \t b", false), "a b");
        assert_eq!(collapse_whitespace(" a\n\n b ", false), " a b ");
        assert!(matches!(collapse_whitespace("a b", false), Cow::Borrowed(_)));
    }

    #[test]
    fn test_collapse_preserving_new_lines() {
        assert_eq!(collapse_whitespace("a \r\n  b  c", true), "a\nb c");
        assert_eq!(collapse_whitespace("a\nb", true), "a\nb");
        assert_eq!(collapse_whitespace("a\nb", false), "a b");
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize_whitespace("  <!DOCTYPE   html\n PUBLIC>  "), "<!DOCTYPE html PUBLIC>");
        assert!(is_whitespace_only(" \n\t"));
        assert!(!is_whitespace_only(" x "));
    }
}
