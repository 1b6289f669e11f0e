//! Command-line interface definitions.
//!
//! Defines all CLI arguments using clap.

use crate::config::{MarkupMode, WhitespaceMinificationMode};
use clap::Parser;
use std::path::PathBuf;

/// Markmin - minify HTML, XHTML and XML files
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Files or directories to minify
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Config file name (default: markmin.toml)
    #[arg(short = 'C', long, default_value = "markmin.toml")]
    pub config: PathBuf,

    /// Markup flavour of the input files
    #[arg(short, long, value_enum)]
    pub mode: Option<MarkupMode>,

    /// Output directory; files are rewritten in place when unset
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Whitespace minification mode
    #[arg(short, long, value_enum)]
    pub whitespace: Option<WhitespaceMinificationMode>,

    /// Keep HTML and XML comments
    #[arg(long)]
    pub keep_comments: bool,

    /// Print size statistics for every file
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub stats: Option<bool>,

    /// Only report errors
    #[arg(short, long)]
    pub quiet: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["markmin", "site"]);
        assert_eq!(cli.inputs, vec![PathBuf::from("site")]);
        assert_eq!(cli.config, PathBuf::from("markmin.toml"));
        assert!(cli.mode.is_none());
        assert!(cli.stats.is_none());
        assert!(!cli.quiet);
    }

    #[test]
    fn test_stats_flag_forms() {
        let cli = Cli::parse_from(["markmin", "a.html", "--stats"]);
        assert_eq!(cli.stats, Some(true));
        let cli = Cli::parse_from(["markmin", "a.html", "--stats", "false"]);
        assert_eq!(cli.stats, Some(false));
    }

    #[test]
    fn test_mode_and_whitespace() {
        let cli = Cli::parse_from(["markmin", "-m", "xhtml", "-w", "aggressive", "-o", "dist", "a.html"]);
        assert_eq!(cli.mode, Some(MarkupMode::Xhtml));
        assert_eq!(cli.whitespace, Some(WhitespaceMinificationMode::Aggressive));
        assert_eq!(cli.output, Some(PathBuf::from("dist")));
    }

    #[test]
    fn test_inputs_required() {
        assert!(Cli::try_parse_from(["markmin", "--stats"]).is_err());
    }
}
