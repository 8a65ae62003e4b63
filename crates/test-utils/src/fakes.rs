use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Value};
use tokio::time::Instant;
use vscode_test_cli::engine::Pipeline;
use vscode_test_cli::errors::{CliError, Result};
use vscode_test_cli::platform::{BoxFuture, PreparedRun, PreparedRuns, RunContext, RunOutcome};

/// What a [`FakeRun`] does when executed.
#[derive(Debug, Clone)]
pub enum FakeResult {
    Exit(i32),
    /// Fails to execute, like a missing editor binary.
    Error(String),
}

/// Shared record of fake executions.
#[derive(Debug, Clone, Default)]
pub struct RunJournal {
    executed: Arc<Mutex<Vec<String>>>,
    coverage_dirs: Arc<Mutex<Vec<Option<PathBuf>>>>,
}

impl RunJournal {
    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }

    pub fn coverage_dirs(&self) -> Vec<Option<PathBuf>> {
        self.coverage_dirs.lock().unwrap().clone()
    }
}

/// A prepared run that records its execution and returns a fixed result.
/// When coverage is active it writes `<name>.json` into the raw directory.
#[derive(Debug)]
pub struct FakeRun {
    name: String,
    result: FakeResult,
    journal: RunJournal,
}

impl FakeRun {
    pub fn new(name: &str, result: FakeResult, journal: &RunJournal) -> Self {
        Self {
            name: name.to_string(),
            result,
            journal: journal.clone(),
        }
    }

    pub fn exiting(name: &str, code: i32, journal: &RunJournal) -> Box<dyn PreparedRun> {
        Box::new(Self::new(name, FakeResult::Exit(code), journal))
    }
}

impl PreparedRun for FakeRun {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute<'a>(&'a self, ctx: &'a RunContext) -> BoxFuture<'a, Result<RunOutcome>> {
        Box::pin(async move {
            self.journal.executed.lock().unwrap().push(self.name.clone());
            self.journal
                .coverage_dirs
                .lock()
                .unwrap()
                .push(ctx.coverage_dir.clone());

            if let Some(dir) = &ctx.coverage_dir {
                std::fs::write(dir.join(format!("{}.json", self.name)), b"{\"result\":[]}")?;
            }

            match &self.result {
                FakeResult::Exit(code) => Ok(RunOutcome::from_exit_code(*code)),
                FakeResult::Error(msg) => Err(CliError::ExecutableNotFound(msg.clone())),
            }
        })
    }

    fn describe(&self) -> Value {
        json!({ "name": self.name })
    }
}

/// Counters shared between a [`FakePipeline`] and the test observing it.
#[derive(Debug, Default)]
pub struct PipelineStats {
    prepares: AtomicUsize,
    passes: Mutex<Vec<(Instant, PreparedRuns)>>,
}

impl PipelineStats {
    /// How many times runs were prepared from scratch.
    pub fn prepares(&self) -> usize {
        self.prepares.load(Ordering::SeqCst)
    }

    /// How many passes started running.
    pub fn passes(&self) -> usize {
        self.passes.lock().unwrap().len()
    }

    /// When each pass started running.
    pub fn pass_starts(&self) -> Vec<Instant> {
        self.passes.lock().unwrap().iter().map(|(at, _)| *at).collect()
    }

    /// The prepared runs each pass executed, for identity checks.
    pub fn pass_runs(&self) -> Vec<PreparedRuns> {
        self.passes
            .lock()
            .unwrap()
            .iter()
            .map(|(_, runs)| Arc::clone(runs))
            .collect()
    }
}

/// Pipeline whose passes take `run_time` of (Tokio) time and exit with
/// `exit_code`. The first `failing_prepares` preparations fail.
#[derive(Debug)]
pub struct FakePipeline {
    stats: Arc<PipelineStats>,
    journal: RunJournal,
    run_time: Duration,
    exit_code: i32,
    failing_prepares: usize,
}

impl FakePipeline {
    pub fn new(run_time: Duration) -> Self {
        Self {
            stats: Arc::new(PipelineStats::default()),
            journal: RunJournal::default(),
            run_time,
            exit_code: 0,
            failing_prepares: 0,
        }
    }

    pub fn with_exit_code(mut self, code: i32) -> Self {
        self.exit_code = code;
        self
    }

    pub fn with_failing_prepares(mut self, n: usize) -> Self {
        self.failing_prepares = n;
        self
    }

    pub fn stats(&self) -> Arc<PipelineStats> {
        Arc::clone(&self.stats)
    }
}

impl Pipeline for FakePipeline {
    fn prepare(&self) -> BoxFuture<'_, Result<PreparedRuns>> {
        Box::pin(async move {
            let n = self.stats.prepares.fetch_add(1, Ordering::SeqCst);
            if n < self.failing_prepares {
                return Err(CliError::InvalidConfig(format!("preparation {n} failed")));
            }
            let runs: Vec<Box<dyn PreparedRun>> =
                vec![FakeRun::exiting("fake", self.exit_code, &self.journal)];
            Ok(Arc::new(runs))
        })
    }

    fn run(&self, runs: PreparedRuns) -> BoxFuture<'_, Result<i32>> {
        Box::pin(async move {
            self.stats
                .passes
                .lock()
                .unwrap()
                .push((Instant::now(), Arc::clone(&runs)));
            tokio::time::sleep(self.run_time).await;
            Ok(self.exit_code)
        })
    }
}
