// src/platform/desktop.rs

//! Desktop editor platform.

use std::collections::BTreeMap;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::validate::is_valid_version;
use crate::config::{Installation, TestConfiguration};
use crate::errors::{CliError, Result};
use crate::fs::FileSystem;
use crate::platform::extensions::{merge_extensions, read_extension_dependencies};
use crate::platform::launcher::{self, ExecutableSource};
use crate::platform::{BoxFuture, PrepareContext, PreparedRun, RunContext, RunOutcome};
use crate::resolve::{gather_files, resolve_against, resolve_module};
use crate::types::{OneOrMany, PlatformKind};

/// Environment variable carrying the serialized [`RunnerEnvOptions`].
pub const OPTIONS_ENV_VAR: &str = "VSCODE_TEST_OPTIONS";
/// Environment variable telling the runtime where to write raw coverage.
pub const COVERAGE_ENV_VAR: &str = "NODE_V8_COVERAGE";
/// Always removed so the editor binary starts as an editor.
pub const RUN_AS_NODE_ENV_VAR: &str = "ELECTRON_RUN_AS_NODE";
/// File name of the in-editor runner entry point, looked up next to the
/// running executable when not given explicitly.
pub const DEFAULT_RUNNER_ENTRY: &str = "runner.cjs";

/// JSON document handed to the in-editor runner through
/// [`OPTIONS_ENV_VAR`]. The shape is a contract with the runner entry point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunnerEnvOptions {
    pub mocha_opts: Map<String, Value>,
    pub color_default: bool,
    pub preload: Vec<String>,
    pub files: Vec<String>,
}

/// Snapshot produced by `--list-configuration`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesktopRunDescription {
    pub path: PathBuf,
    pub config: TestConfiguration,
    pub extension_tests_path: PathBuf,
    pub extension_development_path: Vec<PathBuf>,
    pub env: BTreeMap<String, Option<String>>,
}

/// Arguments and environment for one launch of the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    pub args: Vec<String>,
    pub env: BTreeMap<String, Option<String>>,
}

/// Which extension lists feed the pre-launch install.
#[derive(Debug, Clone, Default)]
struct InstallPlan {
    include_dependencies: bool,
    configured: Vec<String>,
    requested: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DesktopPlatform;

impl DesktopPlatform {
    pub fn kind(&self) -> PlatformKind {
        PlatformKind::Desktop
    }

    /// Claim `test` if it targets the desktop (or names no platform) and
    /// build its prepared run.
    pub fn prepare(
        &self,
        ctx: &PrepareContext,
        index: usize,
        test: &TestConfiguration,
    ) -> Result<Option<PreparedDesktopRun>> {
        match test.platform() {
            None => {}
            Some(Ok(kind)) if kind == self.kind() => {}
            Some(_) => return Ok(None),
        }

        let args = &ctx.args;
        let config = &ctx.config;
        let dir = config.dir();
        let fs = ctx.fs.as_ref();

        // Work on a private copy; the shared configuration is never mutated.
        let mut test = test.clone();

        let mut launch_args = test.launch_args.take().unwrap_or_default();
        if let Some(folder) = &test.workspace_folder {
            launch_args.push(path_string(&config.resolve_path(folder)));
        }
        test.launch_args = Some(launch_args);

        if !args.run.is_empty() {
            let run: Vec<String> = args
                .run
                .iter()
                .map(|p| path_string(&resolve_against(&ctx.cwd, p)))
                .collect();
            test.files = OneOrMany::Many(run);
        }

        let preload = test
            .preload()
            .iter()
            .chain(args.file.iter())
            .map(|module| resolve_module(fs, dir, module).map(|p| path_string(&p)))
            .collect::<Result<Vec<_>>>()?;

        let files = gather_files(fs, dir, &test.files.to_vec(), &args.ignore)?;
        debug!(
            run = %test.display_name(index),
            count = files.len(),
            "gathered test files"
        );

        let mut mocha_opts = test
            .runner_options
            .as_ref()
            .map(|o| o.extra.clone())
            .unwrap_or_default();
        mocha_opts.extend(args.runner.to_options());

        let options = RunnerEnvOptions {
            mocha_opts,
            color_default: std::io::stdout().is_terminal(),
            preload,
            files: files.iter().map(|p| path_string(p)).collect(),
        };

        let mut env = test.env.clone().unwrap_or_default();
        env.insert(OPTIONS_ENV_VAR.to_string(), Some(serde_json::to_string(&options)?));
        env.insert(RUN_AS_NODE_ENV_VAR.to_string(), None);

        let extension_development_path = match &test.extension_development_path {
            Some(paths) => paths.to_vec().iter().map(|p| config.resolve_path(p)).collect(),
            None => vec![dir.to_path_buf()],
        };

        let version = args.code_version.clone().or_else(|| test.version.clone());
        if let Some(v) = version.as_deref() {
            if !is_valid_version(v) {
                return Err(CliError::InvalidConfig(format!(
                    "invalid VS Code version \"{v}\" (expected \"stable\", \"insiders\" or X.Y.Z)"
                )));
            }
        }

        let executable = match &test.use_installation {
            Some(Installation::FromPath(p)) => ExecutableSource::Path(config.resolve_path(p)),
            _ => ExecutableSource::Search { version },
        };

        let install = InstallPlan {
            include_dependencies: !(args.skip_extension_dependencies
                || test.skip_extension_dependencies.unwrap_or(false)),
            configured: test.install_extensions.clone().unwrap_or_default(),
            requested: args.install_extensions.clone(),
        };

        Ok(Some(PreparedDesktopRun {
            name: test.display_name(index),
            config_path: config.path().to_path_buf(),
            extension_tests_path: runner_entry(args),
            extension_development_path,
            env,
            executable,
            install,
            test,
            fs: Arc::clone(&ctx.fs),
        }))
    }
}

/// Runner entry point: `--runner-entry` / `VSCODE_TEST_RUNNER_ENTRY`, else
/// [`DEFAULT_RUNNER_ENTRY`] next to the running executable.
fn runner_entry(args: &CliArgs) -> PathBuf {
    if let Some(entry) = &args.runner_entry {
        return entry.clone();
    }
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(DEFAULT_RUNNER_ENTRY)))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_RUNNER_ENTRY))
}

fn path_string(p: &Path) -> String {
    p.to_string_lossy().into_owned()
}

/// A desktop test configuration, frozen and ready to launch.
#[derive(Debug)]
pub struct PreparedDesktopRun {
    name: String,
    config_path: PathBuf,
    test: TestConfiguration,
    extension_tests_path: PathBuf,
    extension_development_path: Vec<PathBuf>,
    env: BTreeMap<String, Option<String>>,
    executable: ExecutableSource,
    install: InstallPlan,
    fs: Arc<dyn FileSystem>,
}

impl PreparedDesktopRun {
    /// The per-run test configuration after CLI overrides were applied.
    pub fn test(&self) -> &TestConfiguration {
        &self.test
    }

    pub fn description(&self) -> DesktopRunDescription {
        DesktopRunDescription {
            path: self.config_path.clone(),
            config: self.test.clone(),
            extension_tests_path: self.extension_tests_path.clone(),
            extension_development_path: self.extension_development_path.clone(),
            env: self.env.clone(),
        }
    }

    /// Arguments and environment `execute` will launch the editor with.
    pub fn launch_plan(&self, ctx: &RunContext) -> LaunchPlan {
        let mut args = self.test.launch_args.clone().unwrap_or_default();
        args.extend(
            self.extension_development_path
                .iter()
                .map(|p| format!("--extensionDevelopmentPath={}", path_string(p))),
        );
        args.push(format!(
            "--extensionTestsPath={}",
            path_string(&self.extension_tests_path)
        ));

        let mut env = self.env.clone();
        if let Some(dir) = &ctx.coverage_dir {
            env.insert(COVERAGE_ENV_VAR.to_string(), Some(path_string(dir)));
        }

        LaunchPlan { args, env }
    }

    /// Extensions to install before launching, merged from the development
    /// extensions' manifests, the configuration and the command line.
    pub fn extensions_to_install(&self) -> Vec<String> {
        let dependencies = if self.install.include_dependencies {
            read_extension_dependencies(self.fs.as_ref(), self.extension_development_path.as_slice())
        } else {
            Vec::new()
        };
        merge_extensions([
            dependencies,
            self.install.configured.clone(),
            self.install.requested.clone(),
        ])
    }
}

impl PreparedRun for PreparedDesktopRun {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute<'a>(&'a self, ctx: &'a RunContext) -> BoxFuture<'a, Result<RunOutcome>> {
        Box::pin(async move {
            info!(run = %self.name, "running test configuration");

            let executable = launcher::locate_executable(&self.executable)?;

            let extensions = self.extensions_to_install();
            if !extensions.is_empty() {
                launcher::install_extensions(&executable, &extensions).await?;
            }

            let plan = self.launch_plan(ctx);
            let outcome = launcher::launch(&executable, &plan.args, &plan.env).await?;
            info!(run = %self.name, exit_code = outcome.exit_code(), "test configuration finished");
            Ok(outcome)
        })
    }

    fn describe(&self) -> Value {
        serde_json::to_value(self.description()).unwrap_or(Value::Null)
    }
}
