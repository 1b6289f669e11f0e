//! Minifier configuration for `markmin.toml`.
//!
//! # Sections
//!
//! | Section     | Purpose                                          |
//! |-------------|--------------------------------------------------|
//! | top level   | Markup mode, output directory, statistics        |
//! | `[html]`    | HTML/XHTML minification options                  |
//! | `[xml]`     | XML minification options (also SVG/MathML)      |
//!
//! # Example
//!
//! ```toml
//! mode = "html"
//! output = "dist"
//! statistics = true
//!
//! [html]
//! whitespace_minification_mode = "aggressive"
//! remove_redundant_attributes = true
//!
//! [xml]
//! collapse_tags_without_content = true
//! ```

pub mod defaults;
mod error;
mod html;
mod xml;

pub use error::ConfigError;
pub use html::{
    AttributeQuotesRemovalMode, EmptyTagRenderMode, HtmlSettings, PreservableAttribute,
    WhitespaceMinificationMode,
};
pub use xml::XmlSettings;

use crate::cli::Cli;
use anyhow::{Result, bail};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// Markup Mode
// ============================================================================

/// Which minifier handles the input files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MarkupMode {
    #[default]
    Html,
    Xhtml,
    Xml,
}

impl MarkupMode {
    /// File extensions picked up when walking a directory.
    pub const fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::Html => &["html", "htm"],
            Self::Xhtml => &["xhtml", "html", "htm"],
            Self::Xml => &["xml", "svg", "xsl", "xslt", "rss", "atom"],
        }
    }
}

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing markmin.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct MinifierConfig {
    /// Path the config was loaded from (empty when defaults are used)
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default = "defaults::mode")]
    #[educe(Default = defaults::mode())]
    pub mode: MarkupMode,

    /// Output directory; files are rewritten in place when unset
    #[serde(default = "defaults::output")]
    #[educe(Default = defaults::output())]
    pub output: Option<PathBuf>,

    /// Print size statistics per file
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub statistics: bool,

    /// Encoding sizes are measured in (any WHATWG label)
    #[serde(default = "defaults::encoding")]
    #[educe(Default = defaults::encoding())]
    pub encoding: String,

    #[serde(default)]
    pub html: HtmlSettings,

    #[serde(default)]
    pub xml: XmlSettings,
}

impl MinifierConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: MinifierConfig = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        let mut config = Self::from_str(&content)?;
        config.config_path = path.to_path_buf();
        Ok(config)
    }

    /// Load the file named by `--config` if it exists, then apply CLI overrides.
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut config = if cli.config.exists() {
            Self::from_path(&cli.config)?
        } else {
            Self::default()
        };
        config.update_with_cli(cli);
        config.validate()?;
        Ok(config)
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &Cli) {
        Self::update_option(&mut self.mode, cli.mode.as_ref());
        Self::update_option(&mut self.statistics, cli.stats.as_ref());
        if cli.output.is_some() {
            self.output = cli.output.clone();
        }

        if let Some(mode) = cli.whitespace {
            self.html.whitespace_minification_mode = mode;
            self.xml.minify_whitespace = mode != WhitespaceMinificationMode::None;
        }

        if cli.keep_comments {
            self.html.remove_html_comments = false;
            self.xml.remove_xml_comments = false;
        }
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Output encoding, resolved from its label.
    pub fn output_encoding(&self) -> Option<&'static encoding_rs::Encoding> {
        encoding_rs::Encoding::for_label(self.encoding.trim().as_bytes())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.html.validate()?;

        if self.output_encoding().is_none() {
            bail!(ConfigError::UnknownEncoding(self.encoding.clone()));
        }

        if let Some(output) = &self.output
            && output.is_file()
        {
            bail!(ConfigError::Validation(format!(
                "[output] `{}` is a file, expected a directory",
                output.display()
            )));
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_from_str() {
        let config = MinifierConfig::from_str(
            r#"
            mode = "xhtml"
            statistics = true

            [html]
            remove_redundant_attributes = true

            [xml]
            render_empty_tags_with_space = true
        "#,
        )
        .unwrap();

        assert_eq!(config.mode, MarkupMode::Xhtml);
        assert!(config.statistics);
        assert!(config.html.remove_redundant_attributes);
        assert!(config.xml.render_empty_tags_with_space);
        assert_eq!(config.encoding, "utf-8");
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = MinifierConfig::from_str("").unwrap();
        assert_eq!(config.mode, MarkupMode::Html);
        assert!(config.output.is_none());
        assert!(config.html.remove_html_comments);
    }

    #[test]
    fn test_unknown_fields_rejected() {
        assert!(MinifierConfig::from_str("colour = \"blue\"").is_err());
        assert!(MinifierConfig::from_str("[html]\nsqueeze = true").is_err());
    }

    #[test]
    fn test_from_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "mode = \"xml\"").unwrap();
        let config = MinifierConfig::from_path(file.path()).unwrap();
        assert_eq!(config.mode, MarkupMode::Xml);
        assert_eq!(config.config_path, file.path());
    }

    #[test]
    fn test_from_missing_path() {
        let err = MinifierConfig::from_path(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(err.downcast_ref::<ConfigError>().is_some());
    }

    #[test]
    fn test_update_with_cli() {
        let cli = Cli::parse_from([
            "markmin",
            "--mode",
            "xml",
            "--whitespace",
            "none",
            "--keep-comments",
            "index.html",
            "--stats",
        ]);
        let mut config = MinifierConfig::default();
        config.update_with_cli(&cli);

        assert_eq!(config.mode, MarkupMode::Xml);
        assert!(config.statistics);
        assert_eq!(
            config.html.whitespace_minification_mode,
            WhitespaceMinificationMode::None
        );
        assert!(!config.xml.minify_whitespace);
        assert!(!config.html.remove_html_comments);
        assert!(!config.xml.remove_xml_comments);
    }

    #[test]
    fn test_validate() {
        let mut config = MinifierConfig::default();
        assert!(config.validate().is_ok());

        config.encoding = "klingon".into();
        assert!(config.validate().is_err());

        config.encoding = "windows-1251".into();
        assert!(config.validate().is_ok());

        let file = NamedTempFile::new().unwrap();
        config.output = Some(file.path().to_path_buf());
        assert!(config.validate().is_err());
    }
}
