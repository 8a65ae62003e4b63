// src/config/loader.rs

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{RawConfigFile, ResolvedConfiguration};
use crate::config::validate::resolve;
use crate::errors::{CliError, Result};
use crate::fs::FileSystem;

/// Base name of the configuration file looked up by [`discover_config`].
pub const CONFIG_BASE_NAME: &str = ".vscode-test";

/// Extensions tried, in order, for each directory during discovery.
pub const CONFIG_EXTENSIONS: &[&str] = &["json", "toml"];

/// Supported on-disk formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(ConfigFormat::Json),
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Ok(ConfigFormat::Toml),
            _ => Err(CliError::UnknownConfigExtension(path.to_path_buf())),
        }
    }
}

/// Load a configuration file from a given path and return the raw shape.
///
/// This only performs deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(fs: &dyn FileSystem, path: &Path) -> Result<RawConfigFile> {
    let format = ConfigFormat::from_path(path)?;
    let contents = fs.read_to_string(path)?;

    let config = match format {
        ConfigFormat::Json => serde_json::from_str(&contents)?,
        ConfigFormat::Toml => toml::from_str(&contents)?,
    };

    Ok(config)
}

/// Load a configuration file from path and run validation.
///
/// The path is made absolute first so that [`ResolvedConfiguration::dir`]
/// is stable no matter where the process was started from.
pub fn load_and_validate(fs: &dyn FileSystem, path: &Path) -> Result<ResolvedConfiguration> {
    let path = fs
        .canonicalize(path)
        .map_err(|_| CliError::ConfigFileMissing(path.to_path_buf()))?;
    debug!(?path, "loading configuration");
    let raw = load_from_path(fs, &path)?;
    resolve(raw, path)
}

/// Search `start` and each of its ancestors for `.vscode-test.<ext>`.
///
/// The first directory containing a match wins; within a directory,
/// extensions are tried in [`CONFIG_EXTENSIONS`] order.
pub fn discover_config(fs: &dyn FileSystem, start: &Path) -> Result<PathBuf> {
    for dir in start.ancestors() {
        for ext in CONFIG_EXTENSIONS {
            let candidate = dir.join(format!("{CONFIG_BASE_NAME}.{ext}"));
            if fs.is_file(&candidate) {
                debug!(?candidate, "found configuration file");
                return Ok(candidate);
            }
        }
    }

    Err(CliError::ConfigNotFound {
        base: CONFIG_BASE_NAME.to_string(),
        start: start.to_path_buf(),
    })
}

/// Determine which configuration file to use: an explicit `--config` path
/// (relative to `cwd`) or the result of [`discover_config`].
pub fn config_path(fs: &dyn FileSystem, explicit: Option<&Path>, cwd: &Path) -> Result<PathBuf> {
    match explicit {
        Some(p) if p.is_absolute() => Ok(p.to_path_buf()),
        Some(p) => Ok(cwd.join(p)),
        None => discover_config(fs, cwd),
    }
}
