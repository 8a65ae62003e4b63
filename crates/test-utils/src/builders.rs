#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde_json::Value;
use vscode_test_cli::config::{CoverageConfig, ResolvedConfiguration, RunnerOptions, TestConfiguration};
use vscode_test_cli::types::OneOrMany;

/// Builder for `ResolvedConfiguration` to simplify test setup.
pub struct ConfigBuilder {
    path: PathBuf,
    tests: Vec<TestConfiguration>,
    coverage: Option<CoverageConfig>,
}

impl ConfigBuilder {
    /// `path` is the configuration file; its parent is the config dir.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            tests: Vec::new(),
            coverage: None,
        }
    }

    pub fn with_test(mut self, test: TestConfiguration) -> Self {
        self.tests.push(test);
        self
    }

    pub fn with_coverage_output(mut self, output: &str) -> Self {
        self.coverage
            .get_or_insert_with(CoverageConfig::default)
            .output = Some(output.to_string());
        self
    }

    pub fn build(self) -> ResolvedConfiguration {
        ResolvedConfiguration::new_unchecked(self.tests, self.coverage, self.path)
    }
}

/// Builder for `TestConfiguration`.
pub struct TestConfigBuilder {
    test: TestConfiguration,
}

impl TestConfigBuilder {
    pub fn new(files: &str) -> Self {
        Self {
            test: TestConfiguration {
                files: OneOrMany::One(files.to_string()),
                ..TestConfiguration::default()
            },
        }
    }

    pub fn label(mut self, label: &str) -> Self {
        self.test.label = Some(label.to_string());
        self
    }

    pub fn files(mut self, files: &[&str]) -> Self {
        self.test.files = OneOrMany::Many(files.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn platform(mut self, platform: &str) -> Self {
        self.test.platform = Some(platform.to_string());
        self
    }

    pub fn version(mut self, version: &str) -> Self {
        self.test.version = Some(version.to_string());
        self
    }

    pub fn workspace_folder(mut self, folder: &str) -> Self {
        self.test.workspace_folder = Some(folder.to_string());
        self
    }

    pub fn extension_development_path(mut self, paths: &[&str]) -> Self {
        self.test.extension_development_path =
            Some(OneOrMany::Many(paths.iter().map(|s| s.to_string()).collect()));
        self
    }

    pub fn launch_arg(mut self, arg: &str) -> Self {
        self.test
            .launch_args
            .get_or_insert_with(Vec::new)
            .push(arg.to_string());
        self
    }

    pub fn env(mut self, key: &str, value: Option<&str>) -> Self {
        self.test
            .env
            .get_or_insert_with(BTreeMap::new)
            .insert(key.to_string(), value.map(str::to_string));
        self
    }

    pub fn runner_option(mut self, key: &str, value: Value) -> Self {
        self.test
            .runner_options
            .get_or_insert_with(RunnerOptions::default)
            .extra
            .insert(key.to_string(), value);
        self
    }

    pub fn preload(mut self, modules: &[&str]) -> Self {
        self.test
            .runner_options
            .get_or_insert_with(RunnerOptions::default)
            .preload = Some(OneOrMany::Many(modules.iter().map(|s| s.to_string()).collect()));
        self
    }

    pub fn install_extension(mut self, id: &str) -> Self {
        self.test
            .install_extensions
            .get_or_insert_with(Vec::new)
            .push(id.to_string());
        self
    }

    pub fn skip_extension_dependencies(mut self, val: bool) -> Self {
        self.test.skip_extension_dependencies = Some(val);
        self
    }

    pub fn build(self) -> TestConfiguration {
        self.test
    }
}
