// src/platform/extensions.rs

//! Extension dependency merging.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::fs::FileSystem;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExtensionManifest {
    #[serde(default)]
    extension_dependencies: Vec<String>,
}

/// Identifier used to de-duplicate extensions: everything before `@`,
/// case-insensitive.
pub fn extension_key(ext: &str) -> String {
    ext.split('@').next().unwrap_or(ext).trim().to_lowercase()
}

/// Union of several extension lists, keyed by [`extension_key`]. The first
/// occurrence (and therefore its version qualifier) wins; order is
/// preserved.
pub fn merge_extensions<I, L>(lists: I) -> Vec<String>
where
    I: IntoIterator<Item = L>,
    L: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    for list in lists {
        for ext in list {
            if ext.trim().is_empty() {
                continue;
            }
            if seen.insert(extension_key(&ext)) {
                merged.push(ext);
            }
        }
    }
    merged
}

/// Read `extensionDependencies` from each development path's
/// `package.json`. Missing or unreadable manifests contribute nothing.
pub fn read_extension_dependencies(fs: &dyn FileSystem, dev_paths: &[impl AsRef<Path>]) -> Vec<String> {
    let mut deps = Vec::new();
    for dev_path in dev_paths {
        let manifest_path = dev_path.as_ref().join("package.json");
        if !fs.is_file(&manifest_path) {
            debug!(path = ?manifest_path, "no extension manifest");
            continue;
        }

        let manifest = fs
            .read_to_string(&manifest_path)
            .map_err(|e| e.to_string())
            .and_then(|s| serde_json::from_str::<ExtensionManifest>(&s).map_err(|e| e.to_string()));

        match manifest {
            Ok(m) => deps.extend(m.extension_dependencies),
            Err(err) => warn!(path = ?manifest_path, error = %err, "could not read extension manifest"),
        }
    }
    deps
}
