// src/engine/pipeline.rs

//! The prepare + run pipeline a watch pass executes.

use anyhow::Context;

use crate::engine::aggregate::{run_all, RunAllOptions};
use crate::errors::Result;
use crate::platform::{self, BoxFuture, PrepareContext, PreparedRuns};

/// One pass of the watch loop, split so the prepared runs can be cached
/// between passes.
pub trait Pipeline: Send + Sync + 'static {
    /// Derive the prepared runs from scratch.
    fn prepare(&self) -> BoxFuture<'_, Result<PreparedRuns>>;

    /// Execute prepared runs and return the aggregate exit code.
    fn run(&self, runs: PreparedRuns) -> BoxFuture<'_, Result<i32>>;
}

/// Pipeline backed by a loaded configuration and the desktop platform.
#[derive(Debug, Clone)]
pub struct ConfigPipeline {
    ctx: PrepareContext,
    enabled: Vec<usize>,
    options: RunAllOptions,
}

impl ConfigPipeline {
    pub fn new(ctx: PrepareContext, enabled: Vec<usize>, options: RunAllOptions) -> Self {
        Self {
            ctx,
            enabled,
            options,
        }
    }
}

impl Pipeline for ConfigPipeline {
    fn prepare(&self) -> BoxFuture<'_, Result<PreparedRuns>> {
        let ctx = self.ctx.clone();
        let enabled = self.enabled.clone();
        Box::pin(async move {
            // Globbing and module lookup hit the filesystem synchronously.
            tokio::task::spawn_blocking(move || platform::prepare_all(&ctx, &enabled))
                .await
                .context("preparation task failed")?
        })
    }

    fn run(&self, runs: PreparedRuns) -> BoxFuture<'_, Result<i32>> {
        Box::pin(async move { run_all(&runs, &self.options).await })
    }
}
