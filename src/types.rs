use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A config value that may be written either as a single item or as a list,
/// e.g. `"files": "out/**/*.test.js"` or `"files": ["a.js", "b.js"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T: Clone> OneOrMany<T> {
    pub fn to_vec(&self) -> Vec<T> {
        match self {
            OneOrMany::One(v) => vec![v.clone()],
            OneOrMany::Many(vs) => vs.clone(),
        }
    }
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        OneOrMany::Many(Vec::new())
    }
}

impl<T> From<Vec<T>> for OneOrMany<T> {
    fn from(v: Vec<T>) -> Self {
        OneOrMany::Many(v)
    }
}

/// Platform a test configuration targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlatformKind {
    #[default]
    Desktop,
}

impl fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformKind::Desktop => f.write_str("desktop"),
        }
    }
}

impl FromStr for PlatformKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "desktop" => Ok(PlatformKind::Desktop),
            other => Err(format!("invalid platform: {other} (expected \"desktop\")")),
        }
    }
}

/// How a filesystem change affects prepared runs.
///
/// - `Content`: an existing file's contents changed. File lists and options
///   derived at preparation time are still valid.
/// - `Structural`: a file was added, removed or renamed. Prepared runs must
///   be rebuilt because glob expansion may now yield a different file list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Content,
    Structural,
}
