//! Logging utilities with colored output.
//!
//! This module provides:
//! - `log!` macro for formatted terminal output with colored prefixes
//! - `Logger`, the sink minifiers report their diagnostics to, with a silent
//!   `NullLogger` and a terminal-rendering `ConsoleLogger`
//!
//! # Example
//!
//! ```ignore
//! log!("minify"; "{} files", count);
//! ```
//!
//! `ConsoleLogger` output:
//!
//! ```text
//! error[CSS_MINIFICATION_ERROR]: Unterminated comment
//!   ┌─ index.html:3:12
//!   │
//! 2 │ <head>
//! 3 │   <style>a{}/* open
//!   │             ^
//! 4 │ </head>
//! ```

use colored::{ColoredString, Colorize};
use crossterm::terminal::size;
use std::{
    fmt::Write as _,
    io::{Write, stderr, stdout},
    sync::OnceLock,
};

/// Cached terminal width (fetched once on first use)
static TERMINAL_WIDTH: OnceLock<u16> = OnceLock::new();

/// Length of brackets around module name: "[]"
const BRACKET_LEN: usize = 2;
/// Space after prefix: "[module] " <- this space
const SPACE_AFTER_PREFIX: usize = 1;

/// Calculate total prefix length for a module name.
#[inline]
const fn calc_prefix_len(module_len: usize) -> usize {
    module_len + BRACKET_LEN + SPACE_AFTER_PREFIX
}

/// Get terminal width, cached after first call.
/// Falls back to 120 columns if detection fails.
fn get_terminal_width() -> u16 {
    *TERMINAL_WIDTH.get_or_init(|| size().map(|(w, _)| w).unwrap_or(120))
}

// ============================================================================
// Log Macro
// ============================================================================

/// Log a message with a colored module prefix.
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Log a message with a colored module prefix.
///
/// Single-line messages are truncated to the terminal width.
pub fn log(module: &str, message: &str) {
    let prefix = colorize_prefix(module, &module.to_ascii_lowercase());
    let width = get_terminal_width() as usize;

    let message = if message.contains('\n') {
        message
    } else {
        truncate_str(message, width.saturating_sub(calc_prefix_len(module.len())))
    };

    let mut stdout = stdout().lock();
    writeln!(stdout, "{prefix} {message}").ok();
    stdout.flush().ok();
}

/// Apply color to a module prefix based on module type.
#[inline]
fn colorize_prefix(module: &str, module_lower: &str) -> ColoredString {
    let prefix = format!("[{module}]");
    match module_lower {
        "minify" => prefix.bright_green().bold(),
        "stats" => prefix.bright_blue().bold(),
        "error" => prefix.bright_red().bold(),
        _ => prefix.bright_yellow().bold(),
    }
}

/// Truncate a string to fit within `max_len` bytes.
///
/// Ensures the result is valid UTF-8 by finding the nearest character boundary.
#[inline]
fn truncate_str(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    let mut end = max_len;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

// ============================================================================
// Gutter Characters
// ============================================================================

/// Box-drawing characters for source snippets.
pub(crate) mod gutter {
    pub const HEADER: &str = "┌─";
    pub const BAR: &str = "│";
    pub const MARKER: &str = "^";
}

// ============================================================================
// Diagnostic Sink
// ============================================================================

/// Receiver of minification errors and warnings.
///
/// `line`/`column` are 1-based positions in the file named by `file_context`;
/// `source_fragment` is the gutter snippet produced alongside the diagnostic.
pub trait Logger: Send + Sync {
    fn error(
        &self,
        category: &str,
        message: &str,
        file_context: &str,
        line: usize,
        column: usize,
        source_fragment: &str,
    );

    fn warn(
        &self,
        category: &str,
        message: &str,
        file_context: &str,
        line: usize,
        column: usize,
        source_fragment: &str,
    );
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn error(&self, _: &str, _: &str, _: &str, _: usize, _: usize, _: &str) {}

    fn warn(&self, _: &str, _: &str, _: &str, _: usize, _: usize, _: &str) {}
}

/// Color theme for diagnostic output.
#[derive(Clone, Copy)]
struct DiagnosticTheme {
    label: &'static str,
    colorize: fn(&str) -> ColoredString,
}

impl DiagnosticTheme {
    const ERROR: Self = Self {
        label: "error",
        colorize: |s| s.red(),
    };
    const WARNING: Self = Self {
        label: "warning",
        colorize: |s| s.yellow(),
    };

    #[inline]
    fn paint(self, text: &str) -> ColoredString {
        (self.colorize)(text)
    }
}

/// Renders diagnostics to stderr with a source snippet.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleLogger {
    show_warnings: bool,
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        Self {
            show_warnings: true,
        }
    }
}

impl ConsoleLogger {
    pub const fn new(show_warnings: bool) -> Self {
        Self { show_warnings }
    }
}

impl Logger for ConsoleLogger {
    fn error(
        &self,
        category: &str,
        message: &str,
        file_context: &str,
        line: usize,
        column: usize,
        source_fragment: &str,
    ) {
        let text = render_diagnostic(
            DiagnosticTheme::ERROR,
            category,
            message,
            file_context,
            line,
            column,
            source_fragment,
        );
        eprint!("{text}");
        stderr().flush().ok();
    }

    fn warn(
        &self,
        category: &str,
        message: &str,
        file_context: &str,
        line: usize,
        column: usize,
        source_fragment: &str,
    ) {
        if !self.show_warnings {
            return;
        }
        let text = render_diagnostic(
            DiagnosticTheme::WARNING,
            category,
            message,
            file_context,
            line,
            column,
            source_fragment,
        );
        eprint!("{text}");
        stderr().flush().ok();
    }
}

fn render_diagnostic(
    theme: DiagnosticTheme,
    category: &str,
    message: &str,
    file_context: &str,
    line: usize,
    column: usize,
    source_fragment: &str,
) -> String {
    let mut output = String::new();
    let width = (line + 1).to_string().len();
    let file = if file_context.is_empty() {
        "<input>"
    } else {
        file_context
    };

    _ = writeln!(
        output,
        "{}: {}",
        theme.paint(&format!("{}[{category}]", theme.label)).bold(),
        message.bold()
    );
    _ = writeln!(
        output,
        "{:>width$} {} {file}:{line}:{column}",
        "",
        theme.paint(gutter::HEADER),
    );

    if source_fragment.is_empty() {
        return output;
    }

    _ = writeln!(output, "{:>width$} {}", "", theme.paint(gutter::BAR));
    for fragment_line in source_fragment.lines() {
        let Some((number, code)) = fragment_line.split_once(gutter::BAR) else {
            _ = writeln!(output, "{fragment_line}");
            continue;
        };
        let is_marker = code.trim().chars().all(|c| c == '^');
        let code = if is_marker {
            theme.paint(code).bold().to_string()
        } else {
            code.to_owned()
        };
        _ = writeln!(
            output,
            "{:>width$} {}{code}",
            number.trim(),
            theme.paint(gutter::BAR),
        );
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str_respects_char_boundaries() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello", 3), "hel");
        assert_eq!(truncate_str("héllo", 2), "h");
    }

    #[test]
    fn test_calc_prefix_len() {
        assert_eq!(calc_prefix_len("minify".len()), 9);
    }

    #[test]
    fn test_render_diagnostic() {
        colored::control::set_override(false);
        let text = render_diagnostic(
            DiagnosticTheme::ERROR,
            "CSS_MINIFICATION_ERROR",
            "Unterminated comment",
            "index.html",
            3,
            12,
            "2 │ <head>\n3 │   <style>/*\n  │           ^\n",
        );
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "error[CSS_MINIFICATION_ERROR]: Unterminated comment");
        assert_eq!(lines[1], "  ┌─ index.html:3:12");
        assert_eq!(lines[2], "  │");
        assert_eq!(lines[3], "2 │ <head>");
        assert_eq!(lines[5], "  │           ^");
    }

    #[test]
    fn test_render_without_fragment() {
        colored::control::set_override(false);
        let text = render_diagnostic(DiagnosticTheme::WARNING, "X", "m", "", 1, 1, "");
        assert_eq!(text, "warning[X]: m\n  ┌─ <input>:1:1\n");
    }
}
