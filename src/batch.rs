//! Batch minification of files and directory trees.
//!
//! # Flow
//!
//! ```text
//! run()
//!     │
//!     ├── collect_jobs()     inputs → (source, relative path) pairs
//!     │
//!     └── par_iter          read → decode → minify → encode → write
//! ```
//!
//! Every file is minified on its own; a file that fails to parse is reported
//! and left untouched while the others are still written.

use crate::{
    code::{CrudeCssMinifier, CrudeJsMinifier},
    config::{MarkupMode, MinifierConfig},
    log,
    logger::{ConsoleLogger, Logger},
    minifier::{HtmlMinifier, MarkupMinifier, XmlMinifier},
};
use anyhow::{Context, Result, anyhow};
use encoding_rs::Encoding;
use rayon::prelude::*;
use std::{
    fs,
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};
use walkdir::WalkDir;

/// Files to ignore during directory traversal
const IGNORED_FILES: &[&str] = &[".DS_Store"];

/// One file to minify.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Job {
    source: PathBuf,
    /// Path below the output directory.
    relative: PathBuf,
}

/// Totals over a batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: usize,
    pub failed: usize,
    pub original_size: usize,
    pub minified_size: usize,
}

impl BatchSummary {
    #[inline]
    pub const fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// Build the minifier for `config.mode`.
pub fn build_minifier(config: &MinifierConfig, logger: Arc<dyn Logger>) -> Box<dyn MarkupMinifier> {
    match config.mode {
        MarkupMode::Html => Box::new(
            HtmlMinifier::new(config.html.clone())
                .with_css_minifier(CrudeCssMinifier)
                .with_js_minifier(CrudeJsMinifier)
                .with_logger(logger),
        ),
        MarkupMode::Xhtml => Box::new(
            HtmlMinifier::new_xhtml(config.html.clone())
                .with_css_minifier(CrudeCssMinifier)
                .with_js_minifier(CrudeJsMinifier)
                .with_logger(logger),
        ),
        MarkupMode::Xml => Box::new(XmlMinifier::new(config.xml.clone()).with_logger(logger)),
    }
}

/// Minify every input file, or every matching file below an input directory.
pub fn run(config: &MinifierConfig, inputs: &[PathBuf], quiet: bool) -> Result<BatchSummary> {
    let encoding = config
        .output_encoding()
        .ok_or_else(|| anyhow!("unknown encoding `{}`", config.encoding))?;
    let minifier = build_minifier(config, Arc::new(ConsoleLogger::new(!quiet)));
    let jobs = collect_jobs(inputs, config.mode)?;

    if !quiet {
        log!("minify"; "{} files", jobs.len());
    }

    let failed = AtomicUsize::new(0);
    let original_size = AtomicUsize::new(0);
    let minified_size = AtomicUsize::new(0);

    jobs.par_iter().try_for_each(|job| -> Result<()> {
        let target = match &config.output {
            Some(output) => output.join(&job.relative),
            None => job.source.clone(),
        };
        match minify_file(minifier.as_ref(), job, &target, encoding, config.statistics)? {
            Some((original, minified)) => {
                original_size.fetch_add(original, Ordering::Relaxed);
                minified_size.fetch_add(minified, Ordering::Relaxed);
                if !quiet {
                    if config.statistics {
                        log!(
                            "stats";
                            "{}: {} -> {} bytes",
                            job.relative.display(),
                            original,
                            minified
                        );
                    } else {
                        log!("minify"; "{}", job.relative.display());
                    }
                }
            }
            None => {
                failed.fetch_add(1, Ordering::Relaxed);
            }
        }
        Ok(())
    })?;

    let summary = BatchSummary {
        processed: jobs.len(),
        failed: failed.into_inner(),
        original_size: original_size.into_inner(),
        minified_size: minified_size.into_inner(),
    };

    if !quiet {
        let saved = summary.original_size.saturating_sub(summary.minified_size);
        log!(
            "minify";
            "done, {} failed, {} bytes saved",
            summary.failed,
            saved
        );
    }
    Ok(summary)
}

/// Minify one file into `target`. `None` when the markup could not be parsed.
fn minify_file(
    minifier: &dyn MarkupMinifier,
    job: &Job,
    target: &Path,
    encoding: &'static Encoding,
    statistics: bool,
) -> Result<Option<(usize, usize)>> {
    let bytes = fs::read(&job.source).with_context(|| format!("failed to read {}", job.source.display()))?;
    let (content, _, _) = encoding.decode(&bytes);

    let result = minifier.minify_full(&content, &job.relative.display().to_string(), encoding, statistics);
    if !result.is_success() {
        return Ok(None);
    }

    let (encoded, _, _) = encoding.encode(&result.minified_content);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(target, &encoded).with_context(|| format!("failed to write {}", target.display()))?;

    Ok(Some((bytes.len(), encoded.len())))
}

/// Expand inputs into files: files are taken as given, directories are walked
/// for the extensions of `mode`.
fn collect_jobs(inputs: &[PathBuf], mode: MarkupMode) -> Result<Vec<Job>> {
    let mut jobs = Vec::new();
    for input in inputs {
        if input.is_file() {
            let relative = input
                .file_name()
                .map(PathBuf::from)
                .ok_or_else(|| anyhow!("invalid input {}", input.display()))?;
            jobs.push(Job {
                source: input.clone(),
                relative,
            });
        } else if input.is_dir() {
            jobs.extend(
                WalkDir::new(input)
                    .sort_by_file_name()
                    .into_iter()
                    .filter_map(Result::ok)
                    .filter(|e| e.file_type().is_file())
                    .filter(|e| {
                        let name = e.file_name().to_str().unwrap_or_default();
                        !IGNORED_FILES.contains(&name)
                    })
                    .filter(|e| has_extension(e.path(), mode.extensions()))
                    .map(|e| Job {
                        relative: e.path().strip_prefix(input).unwrap_or(e.path()).to_path_buf(),
                        source: e.into_path(),
                    }),
            );
        } else {
            return Err(anyhow!("input not found: {}", input.display()));
        }
    }
    Ok(jobs)
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_collect_jobs_filters_by_mode() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "index.html", "");
        write(dir.path(), "blog/post.htm", "");
        write(dir.path(), "feed.xml", "");
        write(dir.path(), "style.css", "");

        let jobs = collect_jobs(&[dir.path().to_path_buf()], MarkupMode::Html).unwrap();
        let relative: Vec<_> = jobs.iter().map(|j| j.relative.clone()).collect();
        assert_eq!(relative, vec![PathBuf::from("blog/post.htm"), PathBuf::from("index.html")]);

        let jobs = collect_jobs(&[dir.path().to_path_buf()], MarkupMode::Xml).unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].relative, PathBuf::from("feed.xml"));
    }

    #[test]
    fn test_missing_input() {
        assert!(collect_jobs(&[PathBuf::from("/no/such/input")], MarkupMode::Html).is_err());
    }

    #[test]
    fn test_run_into_output_directory() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write(src.path(), "index.html", "<p>  hello  </p>\n");
        write(src.path(), "docs/a.html", "<ul><li>a</li><li>b</li></ul>\n");

        let config = MinifierConfig {
            output: Some(out.path().to_path_buf()),
            ..MinifierConfig::default()
        };
        let summary = run(&config, &[src.path().to_path_buf()], true).unwrap();

        assert_eq!(summary.processed, 2);
        assert!(summary.is_success());
        assert_eq!(fs::read_to_string(out.path().join("index.html")).unwrap(), "<p>hello</p>");
        assert_eq!(
            fs::read_to_string(out.path().join("docs/a.html")).unwrap(),
            "<ul><li>a<li>b</ul>"
        );
        // sources untouched
        assert_eq!(
            fs::read_to_string(src.path().join("index.html")).unwrap(),
            "<p>  hello  </p>\n"
        );
    }

    #[test]
    fn test_failed_file_is_left_alone() {
        let dir = TempDir::new().unwrap();
        let good = write(dir.path(), "good.html", "<div> x </div>");
        let bad = write(dir.path(), "bad.html", "<div></span>");

        let summary = run(&MinifierConfig::default(), &[good.clone(), bad.clone()], true).unwrap();

        assert_eq!(summary.processed, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(fs::read_to_string(good).unwrap(), "<div>x</div>");
        assert_eq!(fs::read_to_string(bad).unwrap(), "<div></span>");
    }

    #[test]
    fn test_xml_mode() {
        let dir = TempDir::new().unwrap();
        let feed = write(dir.path(), "feed.xml", "<feed>\n  <title> News </title>\n</feed>\n");
        let config = MinifierConfig {
            mode: MarkupMode::Xml,
            ..MinifierConfig::default()
        };
        run(&config, &[feed.clone()], true).unwrap();
        assert_eq!(fs::read_to_string(feed).unwrap(), "<feed><title> News </title></feed>");
    }
}
