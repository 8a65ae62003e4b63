// src/engine/coverage.rs

//! Coverage collection lifecycle.
//!
//! A [`CoverageCoordinator`] owns a temporary directory that every prepared
//! run writes raw coverage into. [`CoverageCoordinator::finalize`] consumes
//! the coordinator, so the raw files are merged into the output directory
//! exactly once per pass.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Serialize;
use serde_json::{Map, Value};
use tempfile::TempDir;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::ResolvedConfiguration;
use crate::errors::Result;
use crate::resolve::resolve_against;

/// Name of the manifest written next to the merged raw coverage files.
pub const MANIFEST_FILE: &str = "coverage-manifest.json";

/// Default output directory, relative to the config directory.
pub const DEFAULT_OUTPUT_DIR: &str = "coverage";

/// Where coverage ends up: `--coverage-output` (relative to `cwd`), else
/// `coverage.output` (relative to the config directory), else
/// `<config dir>/coverage`.
pub fn coverage_output_dir(args: &CliArgs, config: &ResolvedConfiguration, cwd: &Path) -> PathBuf {
    if let Some(out) = &args.coverage_output {
        return resolve_against(cwd, out);
    }
    let configured = config
        .coverage()
        .and_then(|c| c.output.as_deref())
        .unwrap_or(DEFAULT_OUTPUT_DIR);
    config.resolve_path(configured)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CoverageManifest {
    files: Vec<String>,
    options: Map<String, Value>,
}

/// What [`CoverageCoordinator::finalize`] wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageSummary {
    pub output_dir: PathBuf,
    pub files: Vec<String>,
}

#[derive(Debug)]
pub struct CoverageCoordinator {
    raw_dir: TempDir,
    output_dir: PathBuf,
    options: Map<String, Value>,
}

impl CoverageCoordinator {
    /// Create the raw coverage directory. `options` are the report-writer
    /// settings from the config, recorded in the manifest.
    pub fn new(output_dir: PathBuf, options: Map<String, Value>) -> Result<Self> {
        let raw_dir = tempfile::Builder::new()
            .prefix("vscode-test-coverage-")
            .tempdir()
            .context("creating raw coverage directory")?;
        debug!(raw = ?raw_dir.path(), output = ?output_dir, "coverage collection started");
        Ok(Self {
            raw_dir,
            output_dir,
            options,
        })
    }

    /// Directory handed to each run through `RunContext::coverage_dir`.
    pub fn raw_dir(&self) -> &Path {
        self.raw_dir.path()
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Copy every raw `*.json` coverage file into the output directory and
    /// write the manifest. The raw directory is removed afterwards.
    pub fn finalize(self) -> Result<CoverageSummary> {
        fs::create_dir_all(&self.output_dir)
            .with_context(|| format!("creating coverage output dir {:?}", self.output_dir))?;

        let mut files = Vec::new();
        let entries = fs::read_dir(self.raw_dir.path())
            .with_context(|| format!("reading raw coverage dir {:?}", self.raw_dir.path()))?;
        for entry in entries {
            let path = entry.context("reading raw coverage entry")?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(name) = path.file_name() else {
                continue;
            };
            fs::copy(&path, self.output_dir.join(name))
                .with_context(|| format!("copying coverage file {:?}", path))?;
            files.push(name.to_string_lossy().into_owned());
        }
        files.sort();

        let manifest = CoverageManifest {
            files: files.clone(),
            options: self.options,
        };
        fs::write(
            self.output_dir.join(MANIFEST_FILE),
            serde_json::to_vec_pretty(&manifest)?,
        )
        .with_context(|| format!("writing coverage manifest in {:?}", self.output_dir))?;

        info!(output = ?self.output_dir, count = files.len(), "coverage written");
        Ok(CoverageSummary {
            output_dir: self.output_dir,
            files,
        })
    }
}
