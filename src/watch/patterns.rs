// src/watch/patterns.rs

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::cli::CliArgs;
use crate::fs::RealFileSystem;
use crate::resolve::relative_path;

/// Watched when `--watch-files` is not given.
pub const DEFAULT_WATCH: &[&str] = &["**/*"];

/// Always ignored: dependency trees, VCS metadata and downloaded editors.
pub const DEFAULT_IGNORE: &[&str] = &["**/node_modules/**", "**/.git/**", "**/.vscode-test/**"];

/// Effective watch and ignore globs, relative to the watch root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchDefaults {
    pub watch: Vec<String>,
    pub ignore: Vec<String>,
}

impl WatchDefaults {
    /// Merge the built-in defaults with `--watch-files` / `--watch-ignore`.
    ///
    /// `coverage_output` is ignored too when it lives under `root`, so
    /// writing coverage does not retrigger the pass that wrote it.
    pub fn from_args(args: &CliArgs, root: &Path, coverage_output: Option<&Path>) -> Self {
        let watch = if args.watch_files.is_empty() {
            DEFAULT_WATCH.iter().map(|s| s.to_string()).collect()
        } else {
            args.watch_files.clone()
        };

        let mut ignore: Vec<String> = DEFAULT_IGNORE.iter().map(|s| s.to_string()).collect();
        if let Some(rel) = coverage_output
            .and_then(|dir| relative_path(&RealFileSystem, root, dir))
            .filter(|rel| !rel.is_empty())
        {
            ignore.push(format!("{rel}/**"));
        }
        ignore.extend(args.watch_ignore.iter().cloned());

        Self { watch, ignore }
    }
}

/// Compiled watch/ignore patterns.
///
/// The watcher passes paths relative to the watch root (e.g.
/// `"src/extension.ts"`) into [`WatchProfile::matches`].
#[derive(Clone)]
pub struct WatchProfile {
    watch_set: GlobSet,
    ignore_set: GlobSet,
    watch: Vec<String>,
    ignore: Vec<String>,
}

impl fmt::Debug for WatchProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchProfile")
            .field("watch", &self.watch)
            .field("ignore", &self.ignore)
            .finish_non_exhaustive()
    }
}

impl WatchProfile {
    pub fn new(defaults: &WatchDefaults) -> Result<Self> {
        let watch_set = build_globset(&defaults.watch).context("building watch globset")?;
        let ignore_set = build_globset(&defaults.ignore).context("building ignore globset")?;
        Ok(Self {
            watch_set,
            ignore_set,
            watch: defaults.watch.clone(),
            ignore: defaults.ignore.clone(),
        })
    }

    /// Returns true if a change to `rel_path` should reach the scheduler.
    pub fn matches(&self, rel_path: &str) -> bool {
        !rel_path.is_empty() && self.watch_set.is_match(rel_path) && !self.ignore_set.is_match(rel_path)
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}
