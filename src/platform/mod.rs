// src/platform/mod.rs

//! Platform resolution and prepared runs.
//!
//! A [`Platform`] inspects a [`TestConfiguration`] and, if it owns it,
//! produces a [`PreparedRun`]: a frozen, immediately executable unit. All
//! I/O needed to decide *what* to run (path resolution, module lookup, glob
//! expansion) happens while preparing; executing only launches.
//!
//! - [`desktop`] is the desktop editor variant.
//! - [`extensions`] merges and installs extension dependencies.
//! - [`launcher`] locates the editor executable and spawns it.

pub mod desktop;
pub mod extensions;
pub mod launcher;

use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;

use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{ResolvedConfiguration, TestConfiguration};
use crate::errors::{CliError, Result};
use crate::fs::FileSystem;

pub use desktop::{DesktopPlatform, DesktopRunDescription, LaunchPlan, PreparedDesktopRun};

/// Boxed future returned by the object-safe async seams in this crate.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Prepared runs for one pass, in configuration order.
pub type PreparedRuns = Arc<Vec<Box<dyn PreparedRun>>>;

/// Per-pass data that is not part of the configuration.
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    /// Raw coverage output directory while coverage is being collected.
    pub coverage_dir: Option<PathBuf>,
}

/// Result of a prepared run that completed.
///
/// Anything that prevented the run from completing (missing executable,
/// failed extension install, the editor dying without an exit code) is an
/// `Err` instead, so "tests failed" is never confused with "could not run".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Passed,
    TestsFailed { code: i32 },
}

impl RunOutcome {
    /// Process exit code contributed by this outcome.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunOutcome::Passed => 0,
            RunOutcome::TestsFailed { .. } => 1,
        }
    }

    pub fn from_exit_code(code: i32) -> Self {
        if code == 0 {
            RunOutcome::Passed
        } else {
            RunOutcome::TestsFailed { code }
        }
    }
}

/// An executable unit derived from one test configuration and one platform.
pub trait PreparedRun: Send + Sync + fmt::Debug {
    /// Display name used in logs (label or index).
    fn name(&self) -> &str;

    /// Run the tests. Must not re-read configuration from disk.
    fn execute<'a>(&'a self, ctx: &'a RunContext) -> BoxFuture<'a, Result<RunOutcome>>;

    /// JSON snapshot of everything `execute` would use. Never runs anything.
    fn describe(&self) -> serde_json::Value;
}

/// Everything preparation reads. Cheap to clone.
#[derive(Debug, Clone)]
pub struct PrepareContext {
    pub args: Arc<CliArgs>,
    pub config: Arc<ResolvedConfiguration>,
    pub fs: Arc<dyn FileSystem>,
    /// Directory `--run` paths are resolved against.
    pub cwd: PathBuf,
}

/// Closed set of supported platforms, in resolution order.
#[derive(Debug, Clone)]
pub enum Platform {
    Desktop(DesktopPlatform),
}

impl Platform {
    /// All platforms, in the order they are asked to claim a configuration.
    pub fn all() -> Vec<Platform> {
        vec![Platform::Desktop(DesktopPlatform)]
    }

    /// Returns `Ok(None)` if this platform does not own `test`.
    pub fn prepare(
        &self,
        ctx: &PrepareContext,
        index: usize,
        test: &TestConfiguration,
    ) -> Result<Option<Box<dyn PreparedRun>>> {
        match self {
            Platform::Desktop(p) => Ok(p
                .prepare(ctx, index, test)?
                .map(|run| Box::new(run) as Box<dyn PreparedRun>)),
        }
    }
}

/// Prepare the configuration at `index`; the first platform that claims it
/// wins.
pub fn prepare_one(ctx: &PrepareContext, index: usize) -> Result<Box<dyn PreparedRun>> {
    let test = ctx
        .config
        .tests()
        .get(index)
        .ok_or_else(|| CliError::LabelNotFound(index.to_string()))?;

    for platform in Platform::all() {
        if let Some(run) = platform.prepare(ctx, index, test)? {
            debug!(run = run.name(), "prepared run");
            return Ok(run);
        }
    }

    Err(CliError::NoPlatform(test.display_name(index)))
}

/// Prepare every enabled configuration. Any error aborts the whole batch so
/// that nothing runs from a partial preparation.
pub fn prepare_all(ctx: &PrepareContext, enabled: &[usize]) -> Result<PreparedRuns> {
    let runs = enabled
        .iter()
        .map(|&index| prepare_one(ctx, index))
        .collect::<Result<Vec<_>>>()?;
    info!(count = runs.len(), "prepared test configurations");
    Ok(Arc::new(runs))
}
