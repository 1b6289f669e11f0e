//! Source snippets for diagnostics.

use crate::logger::gutter;
use crate::markup::NodeCoordinates;
use std::fmt::Write;

/// Lines wider than this are shown through a window around the column.
const MAX_LINE_WIDTH: usize = 120;

/// Builds the source fragment attached to errors and warnings.
pub struct SourceCodeNavigator;

impl SourceCodeNavigator {
    /// The line at `coordinates` with one neighbour on each side, each
    /// prefixed by its number, and a caret under the column:
    ///
    /// ```text
    /// 2 │ <head>
    /// 3 │   <style>a{}/* open
    ///   │             ^
    /// 4 │ </head>
    /// ```
    ///
    /// Empty when the coordinates are outside the source.
    pub fn fragment(source: &str, coordinates: NodeCoordinates) -> String {
        let lines = split_lines(source);
        let line = coordinates.line;
        if line == 0 || line > lines.len() {
            return String::new();
        }

        let first = line.saturating_sub(1).max(1);
        let last = (line + 1).min(lines.len());
        let width = last.to_string().len();

        let column = coordinates.column.max(1);
        let window_start = if lines[line - 1].chars().count() > MAX_LINE_WIDTH {
            column.saturating_sub(MAX_LINE_WIDTH / 2 + 1)
        } else {
            0
        };

        let mut output = String::new();
        for number in first..=last {
            let text: String = lines[number - 1]
                .chars()
                .skip(window_start)
                .take(MAX_LINE_WIDTH)
                .collect();
            _ = writeln!(output, "{number:>width$} {} {text}", gutter::BAR);

            if number == line {
                // Tabs stay tabs so the caret lines up.
                let padding: String = lines[number - 1]
                    .chars()
                    .skip(window_start)
                    .take(column - 1 - window_start.min(column - 1))
                    .map(|c| if c == '\t' { '\t' } else { ' ' })
                    .collect();
                _ = writeln!(
                    output,
                    "{:>width$} {} {padding}{}",
                    "",
                    gutter::BAR,
                    gutter::MARKER
                );
            }
        }
        output
    }
}

/// Split on `\n`, `\r\n` and lone `\r`.
fn split_lines(source: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let bytes = source.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push(&source[start..i]);
                start = i + 1;
            }
            b'\r' => {
                lines.push(&source[start..i]);
                if bytes.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    lines.push(&source[start..]);
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_with_neighbours() {
        let source = "<html>\n<head>\n  <style>a{}/* open\n</head>\n</html>";
        let fragment = SourceCodeNavigator::fragment(source, NodeCoordinates::new(3, 13));
        assert_eq!(
            fragment,
            "2 │ <head>\n3 │   <style>a{}/* open\n  │             ^\n4 │ </head>\n"
        );
    }

    #[test]
    fn test_fragment_first_line() {
        let fragment = SourceCodeNavigator::fragment("<p>\r\nx", NodeCoordinates::new(1, 1));
        assert_eq!(fragment, "1 │ <p>\n  │ ^\n2 │ x\n");
    }

    #[test]
    fn test_fragment_out_of_range() {
        assert!(SourceCodeNavigator::fragment("a", NodeCoordinates::new(5, 1)).is_empty());
        assert!(SourceCodeNavigator::fragment("a", NodeCoordinates::EMPTY).is_empty());
    }

    #[test]
    fn test_long_line_window() {
        let source = format!("{}X{}", "a".repeat(500), "b".repeat(500));
        let fragment = SourceCodeNavigator::fragment(&source, NodeCoordinates::new(1, 501));
        let lines: Vec<&str> = fragment.lines().collect();
        let caret = lines[1].find('^').unwrap();
        assert_eq!(lines[0].chars().nth(lines[1][..caret].chars().count()), Some('X'));
    }
}
