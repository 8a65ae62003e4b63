#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use vscode_test_cli::cli::CliArgs;
use vscode_test_cli::config::ResolvedConfiguration;
use vscode_test_cli::fs::mock::MockFileSystem;
use vscode_test_cli::platform::PrepareContext;

pub use vscode_test_cli_test_utils::{init_tracing, project_fs as mock_fs};

/// Where the fake runner entry point lives in every test.
pub const RUNNER_ENTRY: &str = "/runner/runner.cjs";

/// CLI arguments with a fixed runner entry, so nothing depends on where the
/// test binary lives.
pub fn args() -> CliArgs {
    CliArgs {
        runner_entry: Some(PathBuf::from(RUNNER_ENTRY)),
        ..CliArgs::default()
    }
}

pub fn prepare_context(
    fs: MockFileSystem,
    config: ResolvedConfiguration,
    args: CliArgs,
) -> PrepareContext {
    PrepareContext {
        args: Arc::new(args),
        config: Arc::new(config),
        fs: Arc::new(fs),
        cwd: PathBuf::from("/proj"),
    }
}
