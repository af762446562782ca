use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::shared::utils::process::CommandSpec;

pub const REGISTRY_URL: &str = "https://raw.githubusercontent.com/mayajs/templates/master/templates.json";
pub const TEMPLATES_REPO: &str = "https://github.com/mayajs/templates.git";
pub const DEFAULT_PORT: u16 = 3333;

const CONFIG_ENV: &str = "MAYA_CONFIG";
const REGISTRY_ENV: &str = "MAYA_REGISTRY_URL";
const TEMPLATES_DIR_ENV: &str = "MAYA_TEMPLATES_DIR";

/// User configuration, read from `config.yml` in the maya config directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub registry_url: Option<String>,
    pub templates_repo: Option<String>,
    pub templates_dir: Option<PathBuf>,
    pub package_manager: Option<CommandSettings>,
    pub serve: Option<CommandSettings>,
    pub build: Option<CommandSettings>,
    pub default_port: Option<u16>,
}

/// An external program with its leading arguments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSettings {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandSettings {
    fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    pub fn to_spec(&self) -> CommandSpec {
        CommandSpec::new(&self.program).args(self.args.iter().cloned())
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("io", "mayajs", "maya")
}

impl Settings {
    /// Load from `MAYA_CONFIG` or the default location, then apply environment overrides
    pub fn load() -> Result<Self> {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .or_else(|| project_dirs().map(|d| d.config_dir().join("config.yml")));

        let settings = match path {
            Some(path) if path.exists() => Self::from_path(&path)?,
            _ => Self::default(),
        };

        Ok(settings.with_env(|key| std::env::var(key).ok()))
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "reading settings");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse settings: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).context("Invalid settings YAML")
    }

    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(REGISTRY_ENV) {
            self.registry_url = Some(url);
        }
        if let Some(dir) = lookup(TEMPLATES_DIR_ENV) {
            self.templates_dir = Some(PathBuf::from(dir));
        }
        self
    }

    pub fn registry_url(&self) -> &str {
        self.registry_url.as_deref().unwrap_or(REGISTRY_URL)
    }

    pub fn templates_repo(&self) -> &str {
        self.templates_repo.as_deref().unwrap_or(TEMPLATES_REPO)
    }

    pub fn templates_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.templates_dir {
            return Ok(dir.clone());
        }
        project_dirs()
            .map(|d| d.cache_dir().join("templates"))
            .context("Could not determine a cache directory; set MAYA_TEMPLATES_DIR")
    }

    pub fn package_manager(&self) -> CommandSettings {
        self.package_manager
            .clone()
            .unwrap_or_else(|| CommandSettings::new("npm", &["i", "--error"]))
    }

    pub fn serve_command(&self) -> CommandSettings {
        self.serve
            .clone()
            .unwrap_or_else(|| CommandSettings::new("npx", &["ts-node", "src/index.ts"]))
    }

    pub fn build_command(&self) -> CommandSettings {
        self.build
            .clone()
            .unwrap_or_else(|| CommandSettings::new("npx", &["tsc"]))
    }

    pub fn default_port(&self) -> u16 {
        self.default_port.unwrap_or(DEFAULT_PORT)
    }
}
