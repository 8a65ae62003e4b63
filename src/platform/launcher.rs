// src/platform/launcher.rs

//! Locating and launching the editor executable.
//!
//! This is only ever touched from `PreparedRun::execute`; preparing and
//! describing a run work on machines that have no editor installed at all.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use anyhow::Context;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::errors::{CliError, Result};
use crate::platform::RunOutcome;

/// Environment variable naming an explicit editor executable.
pub const EXECUTABLE_ENV_VAR: &str = "VSCODE_TEST_EXECUTABLE";

/// Where the executable should come from, resolved at preparation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutableSource {
    /// An explicit path (`useInstallation.fromPath`).
    Path(PathBuf),
    /// Search `VSCODE_TEST_EXECUTABLE`, then `PATH`, for the binary matching
    /// the requested version.
    Search { version: Option<String> },
}

/// Resolve [`ExecutableSource`] to a concrete executable.
pub fn locate_executable(source: &ExecutableSource) -> Result<PathBuf> {
    match source {
        ExecutableSource::Path(path) => {
            if path.is_file() {
                Ok(path.clone())
            } else {
                Err(CliError::ExecutableNotFound(format!(
                    "{path:?} does not exist"
                )))
            }
        }
        ExecutableSource::Search { version } => {
            if let Some(explicit) = std::env::var_os(EXECUTABLE_ENV_VAR) {
                let explicit = PathBuf::from(explicit);
                debug!(path = ?explicit, "using executable from {EXECUTABLE_ENV_VAR}");
                return locate_executable(&ExecutableSource::Path(explicit));
            }

            let name = binary_name(version.as_deref());
            search_path(name).ok_or_else(|| {
                CliError::ExecutableNotFound(format!(
                    "`{name}` is not on PATH; set {EXECUTABLE_ENV_VAR} or `useInstallation.fromPath`"
                ))
            })
        }
    }
}

fn binary_name(version: Option<&str>) -> &'static str {
    match version {
        Some(v) if v == "insiders" || v.ends_with("-insider") => "code-insiders",
        _ => "code",
    }
}

fn search_path(name: &str) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    let candidates: &[&str] = if cfg!(windows) { &[".cmd", ".exe"] } else { &[""] };

    std::env::split_paths(&path_var).find_map(|dir| {
        candidates
            .iter()
            .map(|suffix| dir.join(format!("{name}{suffix}")))
            .find(|p| p.is_file())
    })
}

/// Launch the editor with `args` and `env` and wait for it to exit.
///
/// `env` entries with a `None` value are removed from the inherited
/// environment. Output is inherited so test results reach the terminal.
pub async fn launch(
    executable: &Path,
    args: &[String],
    env: &BTreeMap<String, Option<String>>,
) -> Result<RunOutcome> {
    info!(executable = ?executable, ?args, "launching editor");

    let mut cmd = Command::new(executable);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .kill_on_drop(true);
    apply_env(&mut cmd, env);

    let status = cmd
        .status()
        .await
        .with_context(|| format!("spawning {:?}", executable))?;

    match status.code() {
        Some(code) => {
            info!(exit_code = code, "editor exited");
            Ok(RunOutcome::from_exit_code(code))
        }
        None => Err(CliError::Other(anyhow::anyhow!(
            "{:?} was terminated before reporting a result ({status})",
            executable
        ))),
    }
}

/// Install extensions through the editor's own CLI, one
/// `--install-extension` flag per entry. Output is captured and only shown
/// if the installer fails.
pub async fn install_extensions(executable: &Path, extensions: &[String]) -> Result<()> {
    if extensions.is_empty() {
        return Ok(());
    }
    info!(?extensions, "installing extensions");

    let mut cmd = Command::new(executable);
    for ext in extensions {
        cmd.arg("--install-extension").arg(ext);
    }
    cmd.stdin(Stdio::null()).env_remove("ELECTRON_RUN_AS_NODE");

    let output = cmd
        .output()
        .await
        .with_context(|| format!("spawning {:?} to install extensions", executable))?;

    if output.status.success() {
        debug!("extension install finished");
        return Ok(());
    }

    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    warn!(code = ?output.status.code(), "extension install failed");
    Err(CliError::ExtensionInstall {
        code: output.status.code(),
        output: text.trim_end().to_string(),
    })
}

fn apply_env(cmd: &mut Command, env: &BTreeMap<String, Option<String>>) {
    for (key, value) in env {
        match value {
            Some(v) => {
                cmd.env(key, v);
            }
            None => {
                cmd.env_remove(key);
            }
        }
    }
}
