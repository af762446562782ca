use std::fs;
use std::path::{Component, Path, PathBuf};
use anyhow::{Context, Result};

/// Resolve `.` and `..` segments without touching the filesystem
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Display form of `path` relative to `base`, falling back to the cleaned path
pub fn clean_relative(base: &Path, path: &Path) -> PathBuf {
    let base = normalize(base);
    let path = normalize(path);
    match path.strip_prefix(&base) {
        Ok(relative) => relative.to_path_buf(),
        Err(_) => path,
    }
}

/// Remove a directory tree or a single file, doing nothing when it is already gone
pub fn remove_if_exists(path: &Path) -> Result<()> {
    let Ok(metadata) = fs::symlink_metadata(path) else {
        return Ok(());
    };
    if metadata.is_dir() {
        fs::remove_dir_all(path)
            .with_context(|| format!("Failed to remove directory: {}", path.display()))
    } else {
        fs::remove_file(path)
            .with_context(|| format!("Failed to remove file: {}", path.display()))
    }
}
