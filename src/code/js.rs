//! Script minifiers.

use super::{CodeMinificationErrorInfo, CodeMinificationResult, JsMinifier};

/// Leaves code alone apart from trimming.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullJsMinifier;

impl JsMinifier for NullJsMinifier {
    fn minify(&self, content: &str, _is_inline_code: bool) -> CodeMinificationResult {
        CodeMinificationResult::ok(content.trim().to_owned())
    }
}

/// JSMin-style character level minifier.
///
/// Drops comments (except `/*! … */`) and whitespace that does not separate
/// tokens. A line break survives where automatic semicolon insertion might
/// depend on it. String, template and regular expression literals pass
/// through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrudeJsMinifier;

impl JsMinifier for CrudeJsMinifier {
    fn minify(&self, content: &str, _is_inline_code: bool) -> CodeMinificationResult {
        match Scanner::new(content).run() {
            Ok(minified) => CodeMinificationResult::ok(minified),
            Err(error) => CodeMinificationResult::failed(content, error),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Gap {
    None,
    Space,
    Newline,
}

/// Keywords after which `/` starts a regular expression.
const REGEX_KEYWORDS: [&str; 14] = [
    "return",
    "typeof",
    "case",
    "do",
    "else",
    "in",
    "of",
    "void",
    "new",
    "delete",
    "throw",
    "instanceof",
    "yield",
    "await",
];

#[inline]
fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '$' | '\\') || !c.is_ascii()
}

struct Scanner<'a> {
    content: &'a str,
    pos: usize,
    out: String,
    gap: Gap,
}

impl<'a> Scanner<'a> {
    fn new(content: &'a str) -> Self {
        Self {
            content,
            pos: 0,
            out: String::with_capacity(content.len()),
            gap: Gap::None,
        }
    }

    fn rest(&self) -> &'a str {
        &self.content[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn error(&self, message: &str, at: usize) -> CodeMinificationErrorInfo {
        CodeMinificationErrorInfo::at(message, self.content, at)
    }

    fn widen_gap(&mut self, gap: Gap) {
        self.gap = self.gap.max(gap);
    }

    fn run(mut self) -> Result<String, CodeMinificationErrorInfo> {
        while let Some(c) = self.peek() {
            let rest = self.rest();
            if c == '\n' || c == '\r' || c == '\u{2028}' || c == '\u{2029}' {
                self.bump();
                self.widen_gap(Gap::Newline);
            } else if c.is_whitespace() {
                self.bump();
                self.widen_gap(Gap::Space);
            } else if rest.starts_with("//") {
                let len = rest.find(['\n', '\r']).unwrap_or(rest.len());
                self.pos += len;
            } else if rest.starts_with("/*") {
                self.block_comment()?;
            } else if c == '"' || c == '\'' {
                self.flush_gap(c);
                self.string(c)?;
            } else if c == '`' {
                self.flush_gap(c);
                self.template()?;
            } else if c == '/' && self.regex_allowed() {
                self.flush_gap(c);
                self.regex()?;
            } else {
                self.flush_gap(c);
                self.bump();
                self.out.push(c);
            }
        }
        Ok(self.out)
    }

    /// Emit whatever separator is still needed between the output so far and `next`.
    fn flush_gap(&mut self, next: char) {
        let gap = std::mem::replace(&mut self.gap, Gap::None);
        let Some(prev) = self.out.chars().last() else {
            return;
        };

        let needs_space = (is_identifier_char(prev) && is_identifier_char(next))
            || (prev == '+' && next == '+')
            || (prev == '-' && next == '-');

        match gap {
            Gap::None => {}
            Gap::Newline
                if (is_identifier_char(prev) || matches!(prev, ')' | ']' | '}' | '"' | '\'' | '`' | '+' | '-'))
                    && (is_identifier_char(next)
                        || matches!(next, '(' | '[' | '{' | '"' | '\'' | '`' | '+' | '-' | '!' | '~' | '/')) =>
            {
                self.out.push('\n');
            }
            Gap::Newline | Gap::Space if needs_space => self.out.push(' '),
            Gap::Newline | Gap::Space => {}
        }
    }

    fn block_comment(&mut self) -> Result<(), CodeMinificationErrorInfo> {
        let start = self.pos;
        let rest = self.rest();
        let len = rest[2..]
            .find("*/")
            .map(|i| i + 4)
            .ok_or_else(|| self.error("Unterminated comment", start))?;
        let comment = &rest[..len];
        self.pos += len;

        if comment.starts_with("/*!") {
            self.flush_gap('/');
            self.out.push_str(comment);
            self.out.push('\n');
        } else if comment.contains(['\n', '\r']) {
            self.widen_gap(Gap::Newline);
        } else {
            self.widen_gap(Gap::Space);
        }
        Ok(())
    }

    fn string(&mut self, quote: char) -> Result<(), CodeMinificationErrorInfo> {
        let start = self.pos;
        self.bump();
        self.out.push(quote);
        loop {
            match self.bump() {
                None | Some('\n' | '\r') => {
                    return Err(self.error("Unterminated string literal", start));
                }
                Some('\\') => {
                    self.out.push('\\');
                    if let Some(escaped) = self.bump() {
                        self.out.push(escaped);
                    }
                }
                Some(c) => {
                    self.out.push(c);
                    if c == quote {
                        return Ok(());
                    }
                }
            }
        }
    }

    fn template(&mut self) -> Result<(), CodeMinificationErrorInfo> {
        let start = self.pos;
        self.bump();
        self.out.push('`');
        loop {
            match self.bump() {
                None => return Err(self.error("Unterminated template literal", start)),
                Some('\\') => {
                    self.out.push('\\');
                    if let Some(escaped) = self.bump() {
                        self.out.push(escaped);
                    }
                }
                Some(c) => {
                    self.out.push(c);
                    if c == '`' {
                        return Ok(());
                    }
                }
            }
        }
    }

    fn regex(&mut self) -> Result<(), CodeMinificationErrorInfo> {
        let start = self.pos;
        self.bump();
        self.out.push('/');
        let mut in_class = false;
        loop {
            match self.bump() {
                None | Some('\n' | '\r') => {
                    return Err(self.error("Unterminated regular expression literal", start));
                }
                Some('\\') => {
                    self.out.push('\\');
                    if let Some(escaped) = self.bump() {
                        self.out.push(escaped);
                    }
                }
                Some(c) => {
                    self.out.push(c);
                    match c {
                        '[' => in_class = true,
                        ']' => in_class = false,
                        '/' if !in_class => return Ok(()),
                        _ => {}
                    }
                }
            }
        }
    }

    /// A `/` here starts a regular expression rather than a division.
    fn regex_allowed(&self) -> bool {
        let out = self.out.trim_end();
        let Some(prev) = out.chars().last() else {
            return true;
        };
        if matches!(
            prev,
            '(' | ',' | '=' | ':' | '[' | '!' | '&' | '|' | '?' | '{' | '}' | ';' | '+' | '-'
                | '*' | '%' | '~' | '^' | '<' | '>'
        ) {
            return true;
        }
        let word_start = out
            .char_indices()
            .rev()
            .take_while(|&(_, c)| is_identifier_char(c))
            .last()
            .map_or(out.len(), |(i, _)| i);
        REGEX_KEYWORDS.contains(&&out[word_start..])
    }
}
