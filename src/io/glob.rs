//! Input pattern expansion.
//!
//! Jobs accept one or more input arguments that may be literal paths or glob
//! patterns (`data/part-*.csv`). Matches come back sorted so processing
//! order, and therefore line numbering, is deterministic.

use anyhow::{Context, Result, bail};
use glob::glob;
use std::path::PathBuf;

/// Expand a glob pattern into a sorted list of matching files.
///
/// Directories are skipped; zero matches is not an error here.
///
/// # Errors
/// Returns an error if the pattern is invalid or an entry cannot be read.
pub fn expand_glob(pattern: &str) -> Result<Vec<PathBuf>> {
    let paths = glob(pattern).with_context(|| format!("invalid glob pattern: {pattern}"))?;
    let mut out = Vec::new();
    for entry in paths {
        let path = entry.with_context(|| format!("read glob entry for {pattern}"))?;
        if path.is_file() {
            out.push(path);
        }
    }
    out.sort();
    Ok(out)
}

/// Resolve CLI input arguments to concrete files.
///
/// Arguments containing glob metacharacters are expanded (and must match at
/// least one file); plain paths pass through untouched.
///
/// # Errors
/// Returns an error on an invalid pattern or a pattern with no matches.
pub fn resolve_inputs(inputs: &[String]) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for input in inputs {
        if input.contains(['*', '?', '[']) {
            let matched = expand_glob(input)?;
            if matched.is_empty() {
                bail!("no files found matching pattern: {input}");
            }
            out.extend(matched);
        } else {
            out.push(PathBuf::from(input));
        }
    }
    Ok(out)
}
