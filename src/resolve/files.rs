// src/resolve/files.rs

//! Expansion of `files` patterns into concrete test files.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Context;
use globset::{GlobBuilder, GlobMatcher, GlobSet, GlobSetBuilder};
use tracing::debug;

use crate::errors::Result;
use crate::fs::FileSystem;
use crate::resolve::{normalize_path, relative_path};

/// Gather the test files for one configuration.
///
/// - Absolute entries are taken literally (no globbing, no existence check)
///   but are still subject to `ignore`.
/// - Relative entries are glob patterns evaluated against `base_dir`.
/// - `ignore` patterns are matched against both the path relative to
///   `base_dir` and the absolute path.
///
/// The result is de-duplicated and keeps pattern order; matches of a single
/// pattern are sorted. Symlinked directories are not walked into, symlinked
/// files are matched like any other file.
pub fn gather_files(
    fs: &dyn FileSystem,
    base_dir: &Path,
    patterns: &[String],
    ignore: &[String],
) -> Result<Vec<PathBuf>> {
    let ignore_set = build_globset(ignore)?;
    let is_ignored = |path: &Path| {
        if ignore_set.is_match(path) {
            return true;
        }
        relative_path(fs, base_dir, path).is_some_and(|rel| ignore_set.is_match(rel))
    };

    let mut seen = HashSet::new();
    let mut files = Vec::new();

    for pattern in patterns {
        let matches = if Path::new(pattern).is_absolute() {
            vec![normalize_path(Path::new(pattern))]
        } else {
            expand_pattern(fs, base_dir, pattern)?
        };

        for path in matches {
            if is_ignored(&path) {
                debug!(?path, "test file ignored");
                continue;
            }
            if seen.insert(path.clone()) {
                files.push(path);
            }
        }
    }

    Ok(files)
}

/// Expand a single relative pattern under `base_dir`.
fn expand_pattern(fs: &dyn FileSystem, base_dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let pattern = pattern.trim_start_matches("./");
    let (prefix, rest) = split_literal_prefix(pattern);
    let walk_root = normalize_path(&base_dir.join(&prefix));

    if rest.is_empty() {
        // No glob characters at all: a plain relative path.
        return Ok(if fs.is_file(&walk_root) {
            vec![walk_root]
        } else {
            Vec::new()
        });
    }

    if !fs.is_dir(&walk_root) {
        return Ok(Vec::new());
    }

    let matcher = compile(&rest)?;
    let mut found = Vec::new();
    let mut stack = vec![walk_root.clone()];

    while let Some(dir) = stack.pop() {
        for path in fs.read_dir(&dir)? {
            if is_hidden(&path) {
                continue;
            }
            if fs.is_dir(&path) {
                // Linked directories can loop back to an ancestor.
                if fs.is_symlink(&path) {
                    debug!(?path, "not descending into symlinked directory");
                    continue;
                }
                stack.push(path);
            } else if fs.is_file(&path) {
                if let Some(rel) = relative_path(fs, &walk_root, &path) {
                    if matcher.is_match(&rel) {
                        found.push(path);
                    }
                }
            }
        }
    }

    found.sort();
    Ok(found)
}

/// Split `a/b/**/*.js` into (`a/b`, `**/*.js`).
fn split_literal_prefix(pattern: &str) -> (PathBuf, String) {
    let segments: Vec<&str> = pattern.split('/').collect();
    let first_glob = segments
        .iter()
        .position(|s| s.contains(['*', '?', '[', '{']))
        .unwrap_or(segments.len());

    let prefix: PathBuf = segments[..first_glob].iter().collect();
    let rest = segments[first_glob..].join("/");
    (prefix, rest)
}

/// Dot-files and dot-directories are not matched by wildcards.
fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'))
}

fn compile(pattern: &str) -> Result<GlobMatcher> {
    let glob = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .with_context(|| format!("invalid glob pattern: {pattern}"))?;
    Ok(glob.compile_matcher())
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = GlobBuilder::new(pat.trim_start_matches("./"))
            .literal_separator(true)
            .build()
            .with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build().context("building ignore globset")?)
}
