// src/engine/runtime.rs

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, error, info};

use crate::errors::{CliError, Result};
use crate::platform::PreparedRuns;

use super::core::{CoreCommand, WatchCore, WatchInput};
use super::pipeline::Pipeline;
use super::RuntimeEvent;

/// Delay between the last change of a burst and the pass it triggers.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Prepared runs kept between passes.
///
/// Every invalidation bumps `epoch`. A pass records the epoch it started
/// with, and what it prepared is only stored if no invalidation happened
/// meanwhile, so a structural change during a pass is never lost.
#[derive(Debug, Default)]
struct PreparedCache {
    runs: Option<PreparedRuns>,
    epoch: u64,
}

impl PreparedCache {
    fn invalidate(&mut self) {
        if self.runs.take().is_some() {
            debug!("prepared runs invalidated");
        }
        self.epoch += 1;
    }

    fn store(&mut self, epoch: u64, runs: PreparedRuns) {
        if epoch == self.epoch {
            self.runs = Some(runs);
        } else {
            debug!("discarding prepared runs from an invalidated pass");
        }
    }
}

/// What a finished pass reports back to the loop.
struct PassReport {
    epoch: u64,
    /// Freshly prepared runs, if the pass had to prepare.
    built: Option<PreparedRuns>,
    outcome: Result<i32>,
}

enum Wake {
    Event(Option<RuntimeEvent>),
    PassDone(PassReport),
    DebounceElapsed,
}

/// Drives [`WatchCore`] from watcher events, the debounce timer and pass
/// completions, and runs passes through a [`Pipeline`].
///
/// At most one pass is in flight: the core only emits `StartPass` from
/// `Idle`/`Debouncing`, and every state change happens on this loop between
/// awaits.
pub struct WatchRuntime<P: Pipeline> {
    core: WatchCore,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    pass_tx: mpsc::UnboundedSender<PassReport>,
    pass_rx: mpsc::UnboundedReceiver<PassReport>,
    pipeline: Arc<P>,
    cache: PreparedCache,
    debounce: Duration,
    deadline: Option<Instant>,
}

impl<P: Pipeline> fmt::Debug for WatchRuntime<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchRuntime")
            .field("core", &self.core)
            .field("cache", &self.cache)
            .field("debounce", &self.debounce)
            .field("deadline", &self.deadline)
            .finish_non_exhaustive()
    }
}

impl<P: Pipeline> WatchRuntime<P> {
    pub fn new(event_rx: mpsc::Receiver<RuntimeEvent>, pipeline: P) -> Self {
        let (pass_tx, pass_rx) = mpsc::unbounded_channel();
        Self {
            core: WatchCore::new(),
            event_rx,
            pass_tx,
            pass_rx,
            pipeline: Arc::new(pipeline),
            cache: PreparedCache::default(),
            debounce: DEFAULT_DEBOUNCE,
            deadline: None,
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Main event loop. Returns once shutdown is requested or the event
    /// channel closes; pass failures are logged and never end the loop.
    pub async fn run(mut self) -> Result<()> {
        info!(debounce_ms = self.debounce.as_millis() as u64, "watch runtime started");

        loop {
            let wake = tokio::select! {
                event = self.event_rx.recv() => Wake::Event(event),
                Some(report) = self.pass_rx.recv() => Wake::PassDone(report),
                _ = sleep_until(self.deadline) => Wake::DebounceElapsed,
            };

            let input = match wake {
                Wake::Event(None) => {
                    info!("watch event channel closed; exiting");
                    break;
                }
                Wake::Event(Some(event)) => {
                    debug!(?event, "watch runtime received event");
                    match event {
                        RuntimeEvent::WatcherReady => WatchInput::WatcherReady,
                        RuntimeEvent::FileChanged { kind, .. } => WatchInput::FileChanged(kind),
                        RuntimeEvent::ShutdownRequested => WatchInput::ShutdownRequested,
                    }
                }
                Wake::PassDone(report) => {
                    self.finish_pass(report);
                    WatchInput::PassFinished
                }
                Wake::DebounceElapsed => {
                    self.deadline = None;
                    WatchInput::DebounceElapsed
                }
            };

            let step = self.core.step(input);
            debug!(state = ?self.core.state(), commands = ?step.commands, "watch core stepped");
            for command in step.commands {
                self.execute_command(command);
            }

            if !step.keep_running {
                info!("shutdown requested; stopping watch runtime");
                break;
            }
        }

        info!("watch runtime exiting");
        Ok(())
    }

    fn execute_command(&mut self, command: CoreCommand) {
        match command {
            CoreCommand::InvalidateCache => self.cache.invalidate(),
            CoreCommand::ArmDebounce => {
                self.deadline = Some(Instant::now() + self.debounce);
            }
            CoreCommand::StartPass => {
                self.deadline = None;
                self.start_pass();
            }
        }
    }

    fn start_pass(&mut self) {
        let epoch = self.cache.epoch;
        let cached = self.cache.runs.clone();
        debug!(epoch, reuse = cached.is_some(), "starting watch pass");

        let pipeline = Arc::clone(&self.pipeline);
        let pass_tx = self.pass_tx.clone();
        tokio::spawn(async move {
            // Run the pass in its own task so a panic still reports back and
            // the loop leaves `Running`.
            let report = match tokio::spawn(execute_pass(pipeline, cached)).await {
                Ok((built, outcome)) => PassReport {
                    epoch,
                    built,
                    outcome,
                },
                Err(join) => PassReport {
                    epoch,
                    built: None,
                    outcome: Err(CliError::Other(anyhow::anyhow!("watch pass aborted: {join}"))),
                },
            };
            // The receiver lives as long as the runtime.
            let _ = pass_tx.send(report);
        });
    }

    fn finish_pass(&mut self, report: PassReport) {
        if let Some(runs) = report.built {
            self.cache.store(report.epoch, runs);
        }
        match report.outcome {
            Ok(0) => info!("watch pass passed"),
            Ok(code) => info!(exit_code = code, "watch pass failed"),
            Err(err) => error!("watch pass errored: {}", err.render()),
        }
    }
}

async fn execute_pass<P: Pipeline>(
    pipeline: Arc<P>,
    cached: Option<PreparedRuns>,
) -> (Option<PreparedRuns>, Result<i32>) {
    let (runs, built) = match cached {
        Some(runs) => (runs, None),
        None => match pipeline.prepare().await {
            Ok(runs) => (Arc::clone(&runs), Some(runs)),
            Err(err) => return (None, Err(err)),
        },
    };
    let outcome = pipeline.run(runs).await;
    (built, outcome)
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
