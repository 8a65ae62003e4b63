// src/resolve/mod.rs

//! Path resolution performed while preparing a run.
//!
//! - [`module`] resolves preload module requests the way a plain CommonJS
//!   `require` would, relative to the configuration directory.
//! - [`files`] expands `files` globs into the concrete test-file list.

pub mod files;
pub mod module;

use std::path::{Component, Path, PathBuf};

use crate::fs::FileSystem;

pub use files::gather_files;
pub use module::resolve_module;

/// Lexically normalize a path: drop `.` components and fold `..` into the
/// preceding component. Does not touch the filesystem.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(out.components().next_back(), Some(Component::Normal(_)))
                    && out.pop();
                if !popped && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Resolve `p` against `base` (unless already absolute) and normalize.
pub fn resolve_against(base: &Path, p: impl AsRef<Path>) -> PathBuf {
    let p = p.as_ref();
    if p.is_absolute() {
        normalize_path(p)
    } else {
        normalize_path(&base.join(p))
    }
}

/// `path` relative to `root` with forward slashes, or `None` if it does not
/// live under `root`.
///
/// A plain prefix strip is tried first; if that fails both sides are
/// canonicalized through `fs` (symlinked temp dirs, `/private/var` on macOS).
pub fn relative_path(fs: &dyn FileSystem, root: &Path, path: &Path) -> Option<String> {
    let to_slashes = |rel: &Path| rel.to_string_lossy().replace('\\', "/");

    if let Ok(rel) = path.strip_prefix(root) {
        return Some(to_slashes(rel));
    }

    let root = fs.canonicalize(root).ok()?;
    let path = fs.canonicalize(path).ok()?;
    path.strip_prefix(&root).ok().map(to_slashes)
}
