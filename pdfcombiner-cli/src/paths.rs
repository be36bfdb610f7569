//! Input path collection for one-shot mode.

use std::path::PathBuf;

use anyhow::{Context, Result};

/// Expand multiple glob patterns into filesystem paths.
///
/// Accepts anything iterable with items that convert to `&str`, e.g.:
/// `&[&str]`, `Vec<String>`, or `Vec<&str>`.
///
/// Returns a flattened list of resolved paths, in pattern order.
///
/// Errors:
/// - Propagates `glob` parse errors.
/// - Propagates filesystem errors from the glob iterator.
pub fn collect_paths_for_patterns<T>(patterns: T) -> Result<Vec<PathBuf>>
where
    T: IntoIterator,
    T::Item: AsRef<str>,
{
    let mut resolved_paths = Vec::new();

    for pattern in patterns.into_iter() {
        let paths = collect_paths_for_pattern(pattern)?;
        resolved_paths.extend(paths);
    }

    Ok(resolved_paths)
}

/// Expand a single glob pattern into filesystem paths.
///
/// Pattern examples:
/// - `"**/*.pdf"`
/// - `"./docs/*.pdf"`
fn collect_paths_for_pattern<P: AsRef<str>>(pattern: P) -> Result<Vec<PathBuf>> {
    let mut resolved_paths = Vec::new();

    let paths = glob::glob(pattern.as_ref())
        .with_context(|| format!("invalid glob pattern: {}", pattern.as_ref()))?;

    for entry in paths {
        let path = entry.context("failed to read glob entry")?;
        resolved_paths.push(path);
    }

    Ok(resolved_paths)
}
