//! Markmin - markup minifier for HTML, XHTML and XML.
//!
//! # Example
//!
//! ```
//! use markmin::{HtmlMinifier, HtmlSettings, MarkupMinifier};
//!
//! let minifier = HtmlMinifier::new(HtmlSettings::default());
//! let result = minifier.minify("<p>  Hello,   world!  </p>");
//! assert!(result.is_success());
//! assert_eq!(result.minified_content, "<p>Hello, world!</p>");
//! ```

pub mod batch;
pub mod cli;
pub mod code;
pub mod config;
pub mod logger;
pub mod markup;
pub mod minifier;
pub mod parser;

pub use code::{CodeMinificationResult, CssMinifier, JsMinifier};
pub use config::{HtmlSettings, MarkupMode, MinifierConfig, WhitespaceMinificationMode, XmlSettings};
pub use minifier::{
    ErrorCategory, HtmlMinifier, MarkupMinificationResult, MarkupMinifier, MinificationErrorInfo,
    MinificationStatistics, XmlMinifier,
};
pub use logger::{ConsoleLogger, Logger, NullLogger};
