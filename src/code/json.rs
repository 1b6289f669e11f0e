//! JSON data blocks (`<script type="application/ld+json">` and friends).

use super::{CodeMinificationErrorInfo, CodeMinificationResult};
use crate::markup::NodeCoordinates;

/// Strip insignificant whitespace from JSON.
///
/// Input is validated with `serde_json` first; invalid data comes back
/// unchanged with one error. Numbers and escapes keep their original spelling.
pub fn minify_json(content: &str) -> CodeMinificationResult {
    if let Err(e) = serde_json::from_str::<serde_json::Value>(content) {
        let error = CodeMinificationErrorInfo::new(
            e.to_string(),
            NodeCoordinates::new(e.line().max(1), e.column().max(1)),
        );
        return CodeMinificationResult::failed(content, error);
    }

    let mut out = String::with_capacity(content.len());
    let mut in_string = false;
    let mut escaped = false;
    for c in content.chars() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
        } else if c == '"' {
            in_string = true;
            out.push(c);
        } else if !c.is_whitespace() {
            out.push(c);
        }
    }
    CodeMinificationResult::ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compacts_valid_json() {
        let result = minify_json("{\n  \"name\" : \"a  b\",\n  \"n\": 1.50,\n  \"q\": \"say \\\"x \\\"\"\n}");
        assert!(result.is_ok());
        assert_eq!(
            result.minified_content,
            "{\"name\":\"a  b\",\"n\":1.50,\"q\":\"say \\\"x \\\"\"}"
        );
    }

    #[test]
    fn test_invalid_json_is_reported_and_kept() {
        let source = "{\n  \"a\": 1,\n}";
        let result = minify_json(source);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].line_number, 3);
        assert_eq!(result.minified_content, source);
    }
}
