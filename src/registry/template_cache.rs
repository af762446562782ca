use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::registry::manifest::ResolvedVersion;
use crate::shared::utils::paths::remove_if_exists;
use crate::shared::utils::process::{git_clone, ProcessRunner};

/// Local clone of the templates repository
pub struct TemplateCache<'r> {
    root: PathBuf,
    runner: &'r dyn ProcessRunner,
}

impl<'r> TemplateCache<'r> {
    pub fn new(root: impl Into<PathBuf>, runner: &'r dyn ProcessRunner) -> Self {
        Self { root: root.into(), runner }
    }

    /// The clone is unusable when the root or one of its required subfolders is missing
    pub fn needs_clone(root: &Path) -> bool {
        ["default", "common"]
            .iter()
            .any(|sub| !root.join(sub).is_dir())
    }

    /// Replace the cache with a fresh clone of `repo_url`
    pub fn refresh(&self, repo_url: &str) -> Result<()> {
        info!(repo = repo_url, dir = %self.root.display(), "cloning templates repository");

        remove_if_exists(&self.root)?;
        if let Some(parent) = self.root.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        git_clone(self.runner, repo_url, &self.root)
            .context("Failed to clone templates repository")?;
        strip_clone(&self.root, &[".git", "README.md"])
    }

    pub fn version_dir(&self, template: &str, version: &str) -> PathBuf {
        self.root.join(template).join(version)
    }

    /// Clone one template version unless it is already cached.
    ///
    /// Returns the directory holding the version and whether it was freshly cloned.
    pub fn checkout(&self, template: &str, resolved: &ResolvedVersion) -> Result<(PathBuf, bool)> {
        let dir = self.version_dir(template, &resolved.version);
        if dir.exists() {
            debug!(dir = %dir.display(), "template version already cached");
            return Ok((dir, false));
        }

        info!(template, version = %resolved.version, "cloning template version");
        git_clone(self.runner, &resolved.url, &dir)
            .with_context(|| format!("Failed to clone template {}@{}", template, resolved.version))?;
        strip_clone(&dir, &[".git"])?;

        Ok((dir, true))
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join("templates.json")
    }

    /// Persist the registry document exactly as given
    pub fn write_manifest(&self, text: &str) -> Result<()> {
        let path = self.manifest_path();
        fs::create_dir_all(&self.root)
            .with_context(|| format!("Failed to create directory: {}", self.root.display()))?;
        fs::write(&path, text)
            .with_context(|| format!("Failed to write template list: {}", path.display()))
    }
}

/// Remove version-control metadata and incidental files from a fresh clone
fn strip_clone(dir: &Path, names: &[&str]) -> Result<()> {
    for name in names {
        let path = dir.join(name);
        if path.is_dir() {
            fs::remove_dir_all(&path)
                .with_context(|| format!("Failed to remove directory: {}", path.display()))?;
        } else if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove file: {}", path.display()))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::utils::process::testing::RecordingRunner;
    use tempfile::TempDir;

    #[test]
    fn test_needs_clone() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("templates");
        assert!(TemplateCache::needs_clone(&root));

        fs::create_dir_all(root.join("default")).unwrap();
        assert!(TemplateCache::needs_clone(&root));

        fs::create_dir_all(root.join("common")).unwrap();
        assert!(!TemplateCache::needs_clone(&root));
    }

    #[test]
    fn test_refresh_replaces_cache_and_strips_metadata() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("templates");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("stale.txt"), "old").unwrap();

        let runner = RecordingRunner::with_clone_files(&[
            (".git/HEAD", "ref"),
            ("README.md", "# templates"),
            ("default/package.json", "{}"),
            ("common/.keep", ""),
        ]);
        let cache = TemplateCache::new(&root, &runner);
        cache.refresh("https://example.com/templates.git").unwrap();

        assert!(!root.join("stale.txt").exists());
        assert!(!root.join(".git").exists());
        assert!(!root.join("README.md").exists());
        assert!(root.join("default/package.json").exists());
        assert!(!TemplateCache::needs_clone(&root));
    }

    #[test]
    fn test_checkout_skips_cached_version() {
        let temp_dir = TempDir::new().unwrap();
        let runner = RecordingRunner::with_clone_files(&[(".git/HEAD", "ref"), ("index.ts", "")]);
        let cache = TemplateCache::new(temp_dir.path(), &runner);
        let resolved = ResolvedVersion {
            version: "1.0.0".to_string(),
            url: "https://example.com/api.git".to_string(),
        };

        let (dir, cloned) = cache.checkout("api", &resolved).unwrap();
        assert!(cloned);
        assert_eq!(dir, temp_dir.path().join("api/1.0.0"));
        assert!(dir.join("index.ts").exists());
        assert!(!dir.join(".git").exists());

        let (_, cloned) = cache.checkout("api", &resolved).unwrap();
        assert!(!cloned);
        assert_eq!(runner.calls.borrow().len(), 1);
    }

    #[test]
    fn test_clone_failure_propagates() {
        let temp_dir = TempDir::new().unwrap();
        let runner = RecordingRunner {
            fail_program: Some("git".to_string()),
            ..RecordingRunner::default()
        };
        let cache = TemplateCache::new(temp_dir.path().join("templates"), &runner);
        assert!(cache.refresh("https://example.com/templates.git").is_err());
    }

    #[test]
    fn test_write_manifest_is_verbatim() {
        let temp_dir = TempDir::new().unwrap();
        let runner = RecordingRunner::default();
        let cache = TemplateCache::new(temp_dir.path().join("templates"), &runner);
        let text = "{\n  \"api\": {\n    \"versions\": []\n  }\n}";

        cache.write_manifest(text).unwrap();
        assert_eq!(fs::read_to_string(cache.manifest_path()).unwrap(), text);
    }
}
