//! Shared helpers for the integration tests: tracing setup, in-memory
//! projects, configuration builders and fake runs/pipelines.

pub mod builders;
pub mod fakes;

use std::sync::Once;

use tracing_subscriber::{fmt, EnvFilter};
use vscode_test_cli::fs::mock::MockFileSystem;
use vscode_test_cli::logging::LOG_ENV_VAR;

static INIT: Once = Once::new();

/// Install a test-writer subscriber once per test binary.
///
/// The filter comes from `VSCODE_TEST_LOG` (same as the binary), then
/// `RUST_LOG`, then `info`. Captured output only shows for failing tests.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// In-memory project tree from `(absolute path, contents)` pairs. Parent
/// directories are created implicitly.
pub fn project_fs(files: &[(&str, &str)]) -> MockFileSystem {
    let fs = MockFileSystem::new();
    for (path, contents) in files {
        fs.add_file(path, contents.as_bytes());
    }
    fs
}

/// Await `f`, failing the test if it takes longer than five seconds. Under
/// a paused clock this bounds virtual time, so a stuck watch loop fails
/// instead of hanging.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(std::time::Duration::from_secs(5), f)
        .await
        .expect("timed out after 5 seconds")
}
