// src/engine/aggregate.rs

//! Sequential execution of prepared runs.

use std::path::PathBuf;

use serde_json::{Map, Value};
use tracing::{error, info, warn};

use crate::engine::coverage::CoverageCoordinator;
use crate::errors::{CliError, Result};
use crate::platform::{PreparedRun, RunContext};

/// Options for [`run_all`].
#[derive(Debug, Clone, Default)]
pub struct RunAllOptions {
    /// Stop after the first run that does not pass.
    pub bail: bool,
    /// Collect coverage into this directory.
    pub coverage_output: Option<PathBuf>,
    /// Extra `coverage` settings recorded in the coverage manifest.
    pub coverage_options: Map<String, Value>,
}

/// Execute `runs` strictly in order and return the aggregate exit code: the
/// maximum of the individual codes, or the first non-zero code with `bail`.
///
/// A run that fails to execute counts as exit code 1 and does not stop later
/// runs unless `bail` is set. Coverage is finalized exactly once after the
/// sequence, whether it completed, bailed or hit errors; the first execution
/// error is returned after that.
pub async fn run_all(runs: &[Box<dyn PreparedRun>], opts: &RunAllOptions) -> Result<i32> {
    let coverage = match &opts.coverage_output {
        Some(dir) => Some(CoverageCoordinator::new(
            dir.clone(),
            opts.coverage_options.clone(),
        )?),
        None => None,
    };
    let ctx = RunContext {
        coverage_dir: coverage.as_ref().map(|c| c.raw_dir().to_path_buf()),
    };

    let mut code = 0;
    let mut first_error: Option<CliError> = None;

    for run in runs {
        let result = match run.execute(&ctx).await {
            Ok(outcome) => outcome.exit_code(),
            Err(err) => {
                error!(run = run.name(), error = %err, "test configuration could not run");
                first_error.get_or_insert(err);
                1
            }
        };
        code = code.max(result);

        if opts.bail && result != 0 {
            warn!(run = run.name(), "bailing after failed test configuration");
            break;
        }
    }

    let finalized = coverage.map(CoverageCoordinator::finalize).transpose();

    if let Some(err) = first_error {
        return Err(err);
    }
    finalized?;

    info!(exit_code = code, count = runs.len(), "test pass finished");
    Ok(code)
}
