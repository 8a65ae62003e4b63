// src/engine/core.rs

//! Pure watch scheduler state machine.
//!
//! [`WatchCore`] consumes [`WatchInput`]s and produces:
//! - an updated [`WatchState`]
//! - a list of [`CoreCommand`]s describing what the IO shell should do next
//!
//! The async shell (`engine::runtime::WatchRuntime`) owns the debounce timer,
//! the prepared-run cache and the pass task. The core has no channels, no
//! Tokio types and performs no IO, so every transition is unit testable.

use crate::types::ChangeKind;

/// Where the scheduler is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WatchState {
    #[default]
    Idle,
    /// A debounce timer is armed; further changes restart it.
    Debouncing,
    /// A pass is in flight.
    Running,
    /// A pass is in flight and changes arrived meanwhile; exactly one
    /// follow-up is owed.
    RunningRerunPending,
}

impl WatchState {
    pub fn is_running(&self) -> bool {
        matches!(self, WatchState::Running | WatchState::RunningRerunPending)
    }
}

/// Inputs to the core, already stripped of paths and results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchInput {
    /// The watcher finished its initial scan.
    WatcherReady,
    FileChanged(ChangeKind),
    DebounceElapsed,
    PassFinished,
    ShutdownRequested,
}

/// Command produced by the core, executed by the IO shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreCommand {
    /// Drop cached prepared runs.
    InvalidateCache,
    /// Clear any pending debounce timer and start a new one.
    ArmDebounce,
    /// Start a prepare + run pass.
    StartPass,
}

/// Decision returned by the core after handling one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreStep {
    pub commands: Vec<CoreCommand>,
    /// Whether the outer loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    fn continue_with(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }
}

#[derive(Debug, Default)]
pub struct WatchCore {
    state: WatchState,
}

impl WatchCore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> WatchState {
        self.state
    }

    /// Handle a single input, updating the state and returning the commands
    /// for the IO shell.
    pub fn step(&mut self, input: WatchInput) -> CoreStep {
        use WatchState::*;

        let mut commands = Vec::new();

        match input {
            WatchInput::WatcherReady => match self.state {
                Idle | Debouncing => {
                    self.state = Running;
                    commands.push(CoreCommand::StartPass);
                }
                Running => self.state = RunningRerunPending,
                RunningRerunPending => {}
            },

            WatchInput::FileChanged(kind) => {
                if kind == ChangeKind::Structural {
                    commands.push(CoreCommand::InvalidateCache);
                }
                match self.state {
                    Idle | Debouncing => {
                        self.state = Debouncing;
                        commands.push(CoreCommand::ArmDebounce);
                    }
                    Running | RunningRerunPending => self.state = RunningRerunPending,
                }
            }

            // A stale timer can only fire outside `Debouncing` if the shell
            // failed to clear it; ignore it.
            WatchInput::DebounceElapsed => {
                if self.state == Debouncing {
                    self.state = Running;
                    commands.push(CoreCommand::StartPass);
                }
            }

            WatchInput::PassFinished => match self.state {
                Running => self.state = Idle,
                RunningRerunPending => {
                    self.state = Debouncing;
                    commands.push(CoreCommand::ArmDebounce);
                }
                Idle | Debouncing => {}
            },

            WatchInput::ShutdownRequested => {
                return CoreStep {
                    commands,
                    keep_running: false,
                };
            }
        }

        CoreStep::continue_with(commands)
    }
}
