//! Stylesheet minifiers.

use super::{CodeMinificationErrorInfo, CodeMinificationResult, CssMinifier};

/// Leaves code alone apart from trimming.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCssMinifier;

impl CssMinifier for NullCssMinifier {
    fn minify(&self, content: &str, _is_inline_code: bool) -> CodeMinificationResult {
        CodeMinificationResult::ok(content.trim().to_owned())
    }
}

/// Whitespace and comment stripper.
///
/// Keeps `/*! … */` comments, never touches string contents and does not
/// rewrite values (no `0px` → `0`, no color shortening).
#[derive(Debug, Clone, Copy, Default)]
pub struct CrudeCssMinifier;

impl CssMinifier for CrudeCssMinifier {
    fn minify(&self, content: &str, is_inline_code: bool) -> CodeMinificationResult {
        match compact(content) {
            Ok(mut minified) => {
                if is_inline_code && minified.ends_with(';') {
                    minified.pop();
                }
                CodeMinificationResult::ok(minified)
            }
            Err(error) => CodeMinificationResult::failed(content, error),
        }
    }
}

/// No whitespace needed on either side.
#[inline]
const fn is_separator(c: char) -> bool {
    matches!(c, '{' | '}' | ';' | ',' | '>')
}

/// Combinators that only tighten outside of `(…)`; inside they may be
/// arithmetic (`calc(1px + 2px)`).
#[inline]
const fn is_combinator(c: char) -> bool {
    matches!(c, '+' | '~')
}

fn compact(content: &str) -> Result<String, CodeMinificationErrorInfo> {
    let mut out = String::with_capacity(content.len());
    let mut chars = content.char_indices().peekable();
    let mut pending_space = false;
    let mut depth = 0usize;

    while let Some((i, c)) = chars.next() {
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }

        if c == '/' && content[i..].starts_with("/*") {
            let end = content[i + 2..]
                .find("*/")
                .map(|rel| i + 2 + rel + 2)
                .ok_or_else(|| CodeMinificationErrorInfo::at("Unterminated comment", content, i))?;
            if content[i..].starts_with("/*!") {
                push_space_if_needed(&mut out, &mut pending_space, '/', depth);
                out.push_str(&content[i..end]);
            } else {
                pending_space = true;
            }
            while chars.peek().is_some_and(|&(j, _)| j < end) {
                chars.next();
            }
            continue;
        }

        push_space_if_needed(&mut out, &mut pending_space, c, depth);

        match c {
            '"' | '\'' => {
                out.push(c);
                let mut escaped = false;
                loop {
                    let Some((j, s)) = chars.next() else {
                        return Err(CodeMinificationErrorInfo::at("Unterminated string", content, i));
                    };
                    out.push(s);
                    if escaped {
                        escaped = false;
                    } else if s == '\\' {
                        escaped = true;
                    } else if s == c {
                        break;
                    } else if s == '\n' {
                        return Err(CodeMinificationErrorInfo::at("Unterminated string", content, j));
                    }
                }
            }
            '}' => {
                if out.ends_with(';') {
                    out.pop();
                }
                out.push(c);
            }
            '(' => {
                depth += 1;
                out.push(c);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                out.push(c);
            }
            _ => out.push(c),
        }
    }

    Ok(out)
}

fn push_space_if_needed(out: &mut String, pending_space: &mut bool, next: char, depth: usize) {
    if !std::mem::take(pending_space) {
        return;
    }
    let Some(prev) = out.chars().last() else {
        return;
    };
    let tight = |c: char| is_separator(c) || (depth == 0 && is_combinator(c));
    if tight(prev) || tight(next) || prev == ':' {
        return;
    }
    out.push(' ');
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minify(content: &str) -> String {
        CrudeCssMinifier.minify(content, false).minified_content
    }

    #[test]
    fn test_collapses_whitespace_and_separators() {
        assert_eq!(
            minify("  body  {\n  color : red ;\n  margin: 0 auto;\n}\n\na > b ,  i ~ u { x: y }"),
            "body{color :red;margin:0 auto}a>b,i~u{x:y}"
        );
    }

    #[test]
    fn test_keeps_descendant_and_pseudo_selectors() {
        assert_eq!(minify("ul li  a:hover { }"), "ul li a:hover{}");
        assert_eq!(minify("a :hover{}"), "a :hover{}");
    }

    #[test]
    fn test_calc_keeps_operator_spacing() {
        assert_eq!(
            minify("p { width: calc(100% + 2px); }"),
            "p{width:calc(100% + 2px)}"
        );
    }

    #[test]
    fn test_comments() {
        assert_eq!(minify("/* x */a{}/*! keep */b{}"), "a{}/*! keep */b{}");
        let result = CrudeCssMinifier.minify("a{}\n/* open", false);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].line_number, 2);
        assert_eq!(result.minified_content, "a{}\n/* open");
    }

    #[test]
    fn test_strings_untouched() {
        assert_eq!(
            minify("a::after { content: \"  ;  \" }"),
            "a::after{content:\"  ;  \"}"
        );
    }

    #[test]
    fn test_inline_drops_trailing_semicolon() {
        let result = CrudeCssMinifier.minify(" color: red;  background: blue; ", true);
        assert_eq!(result.minified_content, "color:red;background:blue");
    }
}
