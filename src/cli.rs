// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! `CliArgs` is parsed once in `main` and then passed by reference to every
//! component that needs it; nothing reads it from global state.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde_json::{Map, Value};

/// Command-line arguments for `vscode-test`.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "vscode-test",
    version,
    about = "Run VS Code extension tests from a declarative configuration.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (JSON or TOML).
    ///
    /// Default: `.vscode-test.json` / `.vscode-test.toml` in the current
    /// directory or the nearest ancestor that has one.
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Only run configurations with this label, or at this 0-based index.
    #[arg(long, short = 'l', value_name = "NAME_OR_INDEX")]
    pub label: Vec<String>,

    /// Re-run tests whenever watched files change.
    #[arg(long, short = 'w')]
    pub watch: bool,

    /// Glob patterns (relative to the config directory) to watch.
    #[arg(long, value_name = "GLOB")]
    pub watch_files: Vec<String>,

    /// Glob patterns to ignore while watching.
    #[arg(long, value_name = "GLOB")]
    pub watch_ignore: Vec<String>,

    /// Stop after the first configuration that fails.
    #[arg(long)]
    pub bail: bool,

    /// Collect code coverage.
    #[arg(long)]
    pub coverage: bool,

    /// Directory that coverage output is written to.
    #[arg(long, value_name = "DIR")]
    pub coverage_output: Option<PathBuf>,

    /// Run only these test files, overriding the configured `files`.
    #[arg(long, value_name = "FILE")]
    pub run: Vec<PathBuf>,

    /// Modules to load before the tests run.
    #[arg(long, value_name = "MODULE")]
    pub file: Vec<String>,

    /// Glob patterns of test files to skip.
    #[arg(long, value_name = "GLOB")]
    pub ignore: Vec<String>,

    /// Print the resolved configuration as JSON without running anything.
    #[arg(long)]
    pub list_configuration: bool,

    /// Extensions to install before running tests.
    #[arg(long, value_name = "ID")]
    pub install_extensions: Vec<String>,

    /// Don't install the extensions listed in `extensionDependencies`.
    #[arg(long)]
    pub skip_extension_dependencies: bool,

    /// VS Code version to run tests against (`stable`, `insiders`, `X.Y.Z`).
    #[arg(long, value_name = "VERSION")]
    pub code_version: Option<String>,

    /// Path of the in-editor test runner entry point.
    #[arg(long, value_name = "PATH", env = "VSCODE_TEST_RUNNER_ENTRY")]
    pub runner_entry: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `VSCODE_TEST_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(flatten)]
    pub runner: RunnerArgs,
}

/// Options forwarded to the in-editor test runner.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct RunnerArgs {
    /// Only run tests matching this pattern.
    #[arg(long, short = 'g', value_name = "PATTERN")]
    pub grep: Option<String>,

    /// Only run tests containing this string.
    #[arg(long, short = 'f', value_name = "STRING")]
    pub fgrep: Option<String>,

    /// Invert --grep / --fgrep matches.
    #[arg(long)]
    pub invert: bool,

    /// Test timeout in milliseconds.
    #[arg(long, short = 't', value_name = "MS")]
    pub timeout: Option<u64>,

    /// "Slow" test threshold in milliseconds.
    #[arg(long, short = 's', value_name = "MS")]
    pub slow: Option<u64>,

    /// Retry failed tests this many times.
    #[arg(long, value_name = "N")]
    pub retries: Option<u32>,

    /// Reporter to use.
    #[arg(long, short = 'R', value_name = "NAME")]
    pub reporter: Option<String>,

    /// Fail if exclusive tests (`.only`) are present.
    #[arg(long)]
    pub forbid_only: bool,
}

impl RunnerArgs {
    /// Options explicitly set on the command line, keyed like the runner's
    /// own option names.
    pub fn to_options(&self) -> Map<String, Value> {
        let mut opts = Map::new();
        if let Some(grep) = &self.grep {
            opts.insert("grep".into(), Value::from(grep.clone()));
        }
        if let Some(fgrep) = &self.fgrep {
            opts.insert("fgrep".into(), Value::from(fgrep.clone()));
        }
        if self.invert {
            opts.insert("invert".into(), Value::Bool(true));
        }
        if let Some(timeout) = self.timeout {
            opts.insert("timeout".into(), Value::from(timeout));
        }
        if let Some(slow) = self.slow {
            opts.insert("slow".into(), Value::from(slow));
        }
        if let Some(retries) = self.retries {
            opts.insert("retries".into(), Value::from(retries));
        }
        if let Some(reporter) = &self.reporter {
            opts.insert("reporter".into(), Value::from(reporter.clone()));
        }
        if self.forbid_only {
            opts.insert("forbidOnly".into(), Value::Bool(true));
        }
        opts
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
