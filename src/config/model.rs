// src/config/model.rs

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::resolve::resolve_against;
use crate::types::{OneOrMany, PlatformKind};

/// Top-level configuration as read from a JSON or TOML file.
///
/// Three shapes are accepted:
///
/// ```json
/// { "tests": [{ "label": "unit", "files": "out/test/**/*.test.js" }],
///   "coverage": { "output": "coverage" } }
/// ```
///
/// a bare array of test configurations, or a single test configuration.
///
/// Variant order matters: derived structs also deserialize from sequences,
/// so `Many` has to claim arrays before `Multi` sees them.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawConfigFile {
    Many(Vec<TestConfiguration>),
    Multi(MultiConfig),
    Single(TestConfiguration),
}

/// The `{ tests: [...], coverage: {...} }` shape.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiConfig {
    pub tests: OneOrMany<TestConfiguration>,

    #[serde(default)]
    pub coverage: Option<CoverageConfig>,
}

impl RawConfigFile {
    /// Flatten the accepted shapes into `(tests, coverage)`.
    pub fn into_parts(self) -> (Vec<TestConfiguration>, Option<CoverageConfig>) {
        match self {
            RawConfigFile::Multi(m) => (m.tests.to_vec(), m.coverage),
            RawConfigFile::Many(tests) => (tests, None),
            RawConfigFile::Single(test) => (vec![test], None),
        }
    }
}

/// One named unit of testing.
///
/// Every relative path in here is authored relative to the configuration
/// file's directory, never the process working directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestConfiguration {
    /// Optional label used by `--label`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Test files: literal paths or glob patterns.
    pub files: OneOrMany<String>,

    /// Target platform; defaults to desktop.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,

    /// `stable`, `insiders` or a concrete version such as `1.85.0`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Extension(s) under test. Defaults to the config directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension_development_path: Option<OneOrMany<String>>,

    /// Folder or workspace file to open.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_folder: Option<String>,

    /// Extra arguments for the editor binary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub launch_args: Option<Vec<String>>,

    /// Environment overrides; `null` removes a variable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<BTreeMap<String, Option<String>>>,

    /// Options for the in-editor test runner.
    #[serde(default, rename = "mocha", skip_serializing_if = "Option::is_none")]
    pub runner_options: Option<RunnerOptions>,

    /// Use an existing installation instead of a downloaded one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_installation: Option<Installation>,

    /// Download settings, passed through to the launcher untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download: Option<Value>,

    /// Extensions to install before this configuration runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_extensions: Option<Vec<String>>,

    /// Don't install the extension's declared `extensionDependencies`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_extension_dependencies: Option<bool>,
}

impl TestConfiguration {
    /// Declared platform, `None` when the field is absent. An unknown name
    /// is `Some(Err(name))` so that the resolver can report it.
    pub fn platform(&self) -> Option<std::result::Result<PlatformKind, String>> {
        self.platform.as_deref().map(str::parse)
    }

    /// Human-readable name: the label if present, otherwise the index.
    pub fn display_name(&self, index: usize) -> String {
        match &self.label {
            Some(label) => format!("\"{label}\""),
            None => format!("#{index}"),
        }
    }

    pub fn preload(&self) -> Vec<String> {
        self.runner_options
            .as_ref()
            .and_then(|o| o.preload.as_ref())
            .map(OneOrMany::to_vec)
            .unwrap_or_default()
    }
}

/// Runner options. `preload` is interpreted here; all other keys are passed
/// through to the runner untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunnerOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preload: Option<OneOrMany<String>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Installation {
    /// Absolute (or config-relative) path to an installed executable.
    FromPath(String),
    /// Use whatever `code` is on the machine's PATH.
    FromMachine(bool),
}

/// `coverage` section.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageConfig {
    /// Output directory, relative to the config directory.
    #[serde(default)]
    pub output: Option<String>,

    /// Remaining keys (reporters, include/exclude) belong to the report
    /// writer and are kept only to be listed in the manifest.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Loaded, validated configuration file.
#[derive(Debug, Clone)]
pub struct ResolvedConfiguration {
    tests: Vec<TestConfiguration>,
    coverage: Option<CoverageConfig>,
    path: PathBuf,
    dir: PathBuf,
}

impl ResolvedConfiguration {
    /// Construct without validation. Used by `validate::resolve` once
    /// checks have passed and by test builders.
    pub fn new_unchecked(
        tests: Vec<TestConfiguration>,
        coverage: Option<CoverageConfig>,
        path: PathBuf,
    ) -> Self {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Self {
            tests,
            coverage,
            path,
            dir,
        }
    }

    /// Test configurations in execution order.
    pub fn tests(&self) -> &[TestConfiguration] {
        &self.tests
    }

    pub fn coverage(&self) -> Option<&CoverageConfig> {
        self.coverage.as_ref()
    }

    /// Absolute path of the configuration file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory every relative path in the configuration is resolved against.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Resolve a config-relative path against [`Self::dir`].
    pub fn resolve_path(&self, p: impl AsRef<Path>) -> PathBuf {
        resolve_against(&self.dir, p)
    }
}
