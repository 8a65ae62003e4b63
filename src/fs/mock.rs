// src/fs/mock.rs

use super::FileSystem;
use anyhow::{anyhow, Result};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File(Vec<u8>),
    Dir(Vec<String>), // List of child names
}

/// In-memory filesystem used by tests.
///
/// Parent directories are created implicitly by [`MockFileSystem::add_file`].
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    files: Arc<Mutex<HashMap<PathBuf, MockEntry>>>,
    symlinks: Arc<Mutex<HashSet<PathBuf>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        let mut files = HashMap::new();
        files.insert(PathBuf::from("."), MockEntry::Dir(Vec::new()));
        files.insert(PathBuf::from("/"), MockEntry::Dir(Vec::new()));

        Self {
            files: Arc::new(Mutex::new(files)),
            symlinks: Arc::default(),
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<PathBuf, MockEntry>> {
        self.files.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let path = path.as_ref().to_path_buf();
        let mut files = self.entries();
        files.insert(path.clone(), MockEntry::File(content.into()));
        if let Some(parent) = path.parent() {
            link_child(&mut files, normalize_parent(parent), &path);
        }
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut files = self.entries();
        ensure_dir_entry(&mut files, path.as_ref());
    }

    /// Mark an existing entry as a symbolic link. Its contents stay
    /// reachable; only [`FileSystem::is_symlink`] changes.
    pub fn mark_symlink(&self, path: impl AsRef<Path>) {
        self.symlinks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(path.as_ref().to_path_buf());
    }

    /// Remove a file and unlink it from its parent directory.
    pub fn remove_file(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let mut files = self.entries();
        files.remove(path);
        if let (Some(parent), Some(name)) = (path.parent(), path.file_name()) {
            let name = name.to_string_lossy();
            if let Some(MockEntry::Dir(children)) = files.get_mut(normalize_parent(parent)) {
                children.retain(|c| c.as_str() != &*name);
            }
        }
    }
}

fn normalize_parent(parent: &Path) -> &Path {
    if parent.as_os_str().is_empty() {
        Path::new(".")
    } else {
        parent
    }
}

fn link_child(files: &mut HashMap<PathBuf, MockEntry>, parent: &Path, child: &Path) {
    ensure_dir_entry(files, parent);
    if let Some(MockEntry::Dir(children)) = files.get_mut(parent) {
        if let Some(name) = child.file_name().and_then(|n| n.to_str()) {
            if !children.iter().any(|c| c == name) {
                children.push(name.to_string());
            }
        }
    }
}

fn ensure_dir_entry(files: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
    if files.contains_key(path) {
        return;
    }
    files.insert(path.to_path_buf(), MockEntry::Dir(Vec::new()));
    if let Some(parent) = path.parent() {
        let parent = normalize_parent(parent);
        if parent != path {
            link_child(files, parent, path);
        }
    }
}

impl FileSystem for MockFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        let files = self.entries();
        match files.get(path) {
            Some(MockEntry::File(content)) => {
                String::from_utf8(content.clone()).map_err(|e| anyhow!("Invalid UTF-8: {}", e))
            }
            Some(MockEntry::Dir(_)) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        self.entries().contains_key(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        matches!(self.entries().get(path), Some(MockEntry::File(_)))
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.entries().get(path), Some(MockEntry::Dir(_)))
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        // Paths in tests are already absolute; only existence is checked.
        if self.exists(path) {
            Ok(path.to_path_buf())
        } else {
            Err(anyhow!("File not found: {:?}", path))
        }
    }

    fn is_symlink(&self, path: &Path) -> bool {
        self.symlinks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains(path)
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let files = self.entries();
        match files.get(path) {
            Some(MockEntry::Dir(children)) => {
                let mut entries: Vec<PathBuf> = children.iter().map(|name| path.join(name)).collect();
                entries.sort();
                Ok(entries)
            }
            _ => Err(anyhow!("Not a directory or not found: {:?}", path)),
        }
    }
}
