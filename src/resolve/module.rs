// src/resolve/module.rs

//! CommonJS-style module resolution.
//!
//! Only the classic algorithm is implemented: exact file, `<name>.js`,
//! `package.json#main`, `index.js`, and a `node_modules` walk for bare
//! specifiers. Package `exports` maps and other extensions are deliberately
//! not consulted, matching what the in-editor loader will do with the path.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::errors::{CliError, Result};
use crate::fs::FileSystem;
use crate::resolve::{normalize_path, resolve_against};

#[derive(Debug, Deserialize)]
struct PackageMain {
    #[serde(default)]
    main: Option<String>,
}

/// Resolve `request` relative to `base_dir`.
pub fn resolve_module(fs: &dyn FileSystem, base_dir: &Path, request: &str) -> Result<PathBuf> {
    let relative = is_path_request(request);

    let resolved = if relative {
        let candidate = resolve_against(base_dir, request);
        load_as_file(fs, &candidate).or_else(|| load_as_directory(fs, &candidate))
    } else {
        load_node_modules(fs, base_dir, request)
    };

    match resolved {
        Some(path) => {
            debug!(module = request, ?path, "resolved preload module");
            Ok(path)
        }
        None => Err(CliError::ModuleNotFound {
            module: request.to_string(),
            dir: base_dir.to_path_buf(),
            hint: if relative {
                ""
            } else {
                ". Make sure it's installed as a dependency"
            },
        }),
    }
}

/// `./x`, `../x`, `.`, `..` and absolute paths are resolved as paths;
/// everything else is a package name.
fn is_path_request(request: &str) -> bool {
    request == "."
        || request == ".."
        || request.starts_with("./")
        || request.starts_with("../")
        || Path::new(request).is_absolute()
}

fn load_as_file(fs: &dyn FileSystem, candidate: &Path) -> Option<PathBuf> {
    if fs.is_file(candidate) {
        return Some(candidate.to_path_buf());
    }
    let with_js = append_extension(candidate, "js");
    if fs.is_file(&with_js) {
        return Some(with_js);
    }
    None
}

fn load_index(fs: &dyn FileSystem, dir: &Path) -> Option<PathBuf> {
    let index = dir.join("index.js");
    fs.is_file(&index).then_some(index)
}

fn load_as_directory(fs: &dyn FileSystem, dir: &Path) -> Option<PathBuf> {
    if !fs.is_dir(dir) {
        return None;
    }

    let manifest = dir.join("package.json");
    if fs.is_file(&manifest) {
        let main = fs
            .read_to_string(&manifest)
            .ok()
            .and_then(|s| serde_json::from_str::<PackageMain>(&s).ok())
            .and_then(|p| p.main);
        if let Some(main) = main {
            let main_path = normalize_path(&dir.join(main));
            if let Some(found) = load_as_file(fs, &main_path).or_else(|| load_index(fs, &main_path)) {
                return Some(found);
            }
        }
    }

    load_index(fs, dir)
}

fn load_node_modules(fs: &dyn FileSystem, base_dir: &Path, request: &str) -> Option<PathBuf> {
    for dir in base_dir.ancestors() {
        if dir.file_name().is_some_and(|n| n == "node_modules") {
            continue;
        }
        let candidate = dir.join("node_modules").join(request);
        if let Some(found) = load_as_file(fs, &candidate).or_else(|| load_as_directory(fs, &candidate)) {
            return Some(found);
        }
    }
    None
}

fn append_extension(path: &Path, ext: &str) -> PathBuf {
    let mut s = path.as_os_str().to_owned();
    s.push(".");
    s.push(ext);
    PathBuf::from(s)
}
