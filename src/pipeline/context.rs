use std::path::{Path, PathBuf};

use crate::registry::manifest::{Manifest, ResolvedVersion};

/// State accumulated while creating a project.
///
/// Tasks of the `new` pipeline read and write these fields in order:
/// the manifest task fills `manifest` and `manifest_text`, the resolver fills
/// `selected`, the checkout task moves `template_dir` to the resolved version
/// and staging fills `project_dir`.
#[derive(Debug, Clone)]
pub struct ProjectContext {
    pub tool_version: String,
    pub templates_dir: PathBuf,
    pub template: Option<String>,
    pub target: String,
    pub template_dir: PathBuf,
    pub manifest: Option<Manifest>,
    pub manifest_text: Option<String>,
    pub selected: Option<ResolvedVersion>,
    pub project_dir: Option<PathBuf>,
}

impl ProjectContext {
    pub fn new(
        tool_version: impl Into<String>,
        templates_dir: impl Into<PathBuf>,
        target: impl Into<String>,
        template: Option<String>,
    ) -> Self {
        let templates_dir = templates_dir.into();
        Self {
            tool_version: tool_version.into(),
            template_dir: templates_dir.join("default"),
            templates_dir,
            template,
            target: target.into(),
            manifest: None,
            manifest_text: None,
            selected: None,
            project_dir: None,
        }
    }

    pub fn wants_template(&self) -> bool {
        self.template.is_some()
    }
}

/// Files written by a `generate` run
#[derive(Debug, Clone, Default)]
pub struct ComponentContext {
    pub written: Vec<PathBuf>,
}

/// Paths used by the `build` pipeline
#[derive(Debug, Clone)]
pub struct BuildContext {
    pub project_root: PathBuf,
    pub root_dir: PathBuf,
    pub out_dir: PathBuf,
    pub project: PathBuf,
}

impl BuildContext {
    pub fn for_project(root: &Path) -> Self {
        Self {
            project_root: root.to_path_buf(),
            root_dir: root.join("src"),
            out_dir: root.join("dist"),
            project: root.join("tsconfig.json"),
        }
    }
}
