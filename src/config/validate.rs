// src/config/validate.rs

use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::model::{RawConfigFile, ResolvedConfiguration, TestConfiguration};
use crate::errors::{CliError, Result};

/// Validate a raw configuration and attach the file path it was read from.
///
/// This checks:
/// - there is at least one test configuration
/// - every configuration names at least one non-empty `files` entry
/// - `version` is `stable`, `insiders` or `X.Y.Z[-insider]`
/// - the coverage output directory, if given, is non-empty
pub fn resolve(raw: RawConfigFile, path: PathBuf) -> Result<ResolvedConfiguration> {
    let (tests, coverage) = raw.into_parts();

    ensure_has_tests(&tests)?;
    for (index, test) in tests.iter().enumerate() {
        validate_files(index, test)?;
        validate_version(index, test)?;
    }

    if let Some(output) = coverage.as_ref().and_then(|c| c.output.as_deref()) {
        if output.trim().is_empty() {
            return Err(CliError::InvalidConfig(
                "coverage.output must not be empty".to_string(),
            ));
        }
    }

    Ok(ResolvedConfiguration::new_unchecked(tests, coverage, path))
}

fn ensure_has_tests(tests: &[TestConfiguration]) -> Result<()> {
    if tests.is_empty() {
        return Err(CliError::InvalidConfig(
            "config must contain at least one test configuration".to_string(),
        ));
    }
    Ok(())
}

fn validate_files(index: usize, test: &TestConfiguration) -> Result<()> {
    let files = test.files.to_vec();
    if files.is_empty() {
        return Err(CliError::InvalidConfig(format!(
            "test configuration {} has no `files`",
            test.display_name(index)
        )));
    }
    if files.iter().any(|f| f.trim().is_empty()) {
        return Err(CliError::InvalidConfig(format!(
            "test configuration {} has an empty entry in `files`",
            test.display_name(index)
        )));
    }
    Ok(())
}

fn validate_version(index: usize, test: &TestConfiguration) -> Result<()> {
    let Some(version) = test.version.as_deref() else {
        return Ok(());
    };
    if is_valid_version(version) {
        return Ok(());
    }
    Err(CliError::InvalidConfig(format!(
        "test configuration {} has invalid version \"{version}\" (expected \"stable\", \"insiders\" or X.Y.Z)",
        test.display_name(index)
    )))
}

/// `stable`, `insiders`, or a release number with an optional `-insider`.
static VERSION_SELECTOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(stable|insiders|\d+\.\d+\.\d+(-insider)?)$").expect("version selector regex")
});

/// Whether `version` is a selector the launcher understands.
pub fn is_valid_version(version: &str) -> bool {
    VERSION_SELECTOR.is_match(version)
}
