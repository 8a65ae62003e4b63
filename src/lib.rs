// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod fs;
pub mod logging;
pub mod platform;
pub mod resolve;
pub mod types;
pub mod watch;

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::cli::CliArgs;
use crate::config::{config_path, load_and_validate, select_enabled};
use crate::engine::{
    coverage_output_dir, run_all, ConfigPipeline, RunAllOptions, RuntimeEvent, WatchRuntime,
};
use crate::errors::Result;
use crate::fs::{FileSystem, RealFileSystem};
use crate::platform::{prepare_all, PrepareContext, PreparedRun};
use crate::watch::{spawn_watcher, WatchDefaults, WatchProfile};

/// High-level entry point used by `main.rs`. Returns the process exit code.
pub async fn run(args: CliArgs) -> Result<i32> {
    let cwd = std::env::current_dir()?;
    run_with(args, Arc::new(RealFileSystem), cwd).await
}

/// Like [`run`], with the filesystem and working directory supplied.
///
/// This wires together:
/// - config discovery and loading
/// - label selection
/// - `--list-configuration`, one-shot or watch mode
pub async fn run_with(args: CliArgs, fs: Arc<dyn FileSystem>, cwd: PathBuf) -> Result<i32> {
    let path = config_path(fs.as_ref(), args.config.as_deref(), &cwd)?;
    let config = load_and_validate(fs.as_ref(), &path)?;
    info!(path = ?config.path(), tests = config.tests().len(), "loaded configuration");

    let enabled = select_enabled(&config, &args.label)?;
    debug!(?enabled, "enabled test configurations");

    let ctx = PrepareContext {
        args: Arc::new(args),
        config: Arc::new(config),
        fs,
        cwd,
    };

    if ctx.args.list_configuration {
        let runs = prepare_all(&ctx, &enabled)?;
        println!("{}", list_configuration(&runs)?);
        return Ok(0);
    }

    let options = run_options(&ctx);

    if ctx.args.watch {
        return watch(ctx, enabled, options).await;
    }

    let runs = prepare_all(&ctx, &enabled)?;
    run_all(&runs, &options).await
}

/// Pretty JSON array of every prepared run's `describe()`.
pub fn list_configuration(runs: &[Box<dyn PreparedRun>]) -> Result<String> {
    let described: Vec<serde_json::Value> = runs.iter().map(|run| run.describe()).collect();
    Ok(serde_json::to_string_pretty(&described)?)
}

/// Aggregator options derived from the command line and configuration.
pub fn run_options(ctx: &PrepareContext) -> RunAllOptions {
    let args = &ctx.args;
    let config = &ctx.config;
    RunAllOptions {
        bail: args.bail,
        coverage_output: args
            .coverage
            .then(|| coverage_output_dir(args, config, &ctx.cwd)),
        coverage_options: config
            .coverage()
            .map(|c| c.extra.clone())
            .unwrap_or_default(),
    }
}

/// Watch mode: runs until Ctrl-C, then exits successfully.
async fn watch(ctx: PrepareContext, enabled: Vec<usize>, options: RunAllOptions) -> Result<i32> {
    let root = ctx.config.dir().to_path_buf();

    // Runtime event channel.
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    let defaults = WatchDefaults::from_args(&ctx.args, &root, options.coverage_output.as_deref());
    let profile = WatchProfile::new(&defaults)?;
    let _watcher_handle = spawn_watcher(root, profile, rt_tx.clone())?;

    // Ctrl-C → graceful shutdown.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    let pipeline = ConfigPipeline::new(ctx, enabled, options);
    WatchRuntime::new(rt_rx, pipeline).run().await?;
    Ok(0)
}
