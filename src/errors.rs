// src/errors.rs

//! Crate-wide error type.
//!
//! Variants other than the transparent wrappers are "user-expected": they are
//! reported as a single line without a backtrace. Everything else is printed
//! with its full diagnostic chain.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(
        "could not find a {base} configuration file in {start:?} or any parent directory; pass one explicitly with --config"
    )]
    ConfigNotFound { base: String, start: PathBuf },

    #[error("config file {0:?} does not exist")]
    ConfigFileMissing(PathBuf),

    #[error("unknown config file extension for {0:?} (expected .json or .toml)")]
    UnknownConfigExtension(PathBuf),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("could not resolve module \"{module}\" in {dir:?}{hint}")]
    ModuleNotFound {
        module: String,
        dir: PathBuf,
        hint: &'static str,
    },

    #[error("could not find a configuration with label \"{0}\"")]
    LabelNotFound(String),

    #[error("no platform could run test configuration {0}")]
    NoPlatform(String),

    #[error("failed to install extensions (exit code {code:?}):\n{output}")]
    ExtensionInstall { code: Option<i32>, output: String },

    #[error("could not locate a VS Code executable: {0}")]
    ExecutableNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CliError {
    /// Whether this error is an expected, user-facing failure that should be
    /// reported without diagnostic detail.
    pub fn is_user_facing(&self) -> bool {
        !matches!(
            self,
            CliError::Io(_) | CliError::Json(_) | CliError::Toml(_) | CliError::Other(_)
        )
    }

    /// Text shown to the user: the message alone for user-facing errors,
    /// the full cause chain (and backtrace, if captured) otherwise.
    pub fn render(&self) -> String {
        if self.is_user_facing() {
            return self.to_string();
        }
        if let CliError::Other(err) = self {
            return format!("{err:?}");
        }

        let mut out = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            out.push_str(&format!("\n\nCaused by:\n    {cause}"));
            source = cause.source();
        }
        out
    }
}

pub type Result<T> = std::result::Result<T, CliError>;
