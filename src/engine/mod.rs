// src/engine/mod.rs

//! Run orchestration for vscode-test.
//!
//! This module ties together:
//! - the run aggregator (sequential execution, bail, exit codes)
//! - the coverage coordinator
//! - the prepare + run pipeline
//! - the watch scheduler, reacting to:
//!   - the watcher's initial "ready" event
//!   - file changes
//!   - pass completions
//!   - shutdown signals
//!
//! The pure watch state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`].

use std::path::PathBuf;

use crate::types::ChangeKind;

/// Events flowing into the watch runtime from the watcher and signal
/// handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeEvent {
    /// The watcher finished its initial scan. Emitted once.
    WatcherReady,
    FileChanged { path: PathBuf, kind: ChangeKind },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod aggregate;
pub mod core;
pub mod coverage;
pub mod pipeline;
pub mod runtime;

pub use aggregate::{run_all, RunAllOptions};
pub use core::{CoreCommand, CoreStep, WatchCore, WatchInput, WatchState};
pub use coverage::{coverage_output_dir, CoverageCoordinator, CoverageSummary};
pub use pipeline::{ConfigPipeline, Pipeline};
pub use runtime::{WatchRuntime, DEFAULT_DEBOUNCE};
