use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, warn};

use crate::registry::manifest::{Manifest, ResolvedVersion};

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Template name doesn't exist: {template}")]
    TemplateNotFound { template: String },

    #[error("Invalid version '{value}': expected major.minor")]
    InvalidVersion { value: String },

    #[error("Failed to refresh the template list")]
    Refresh(#[source] anyhow::Error),
}

/// The `major.minor` part of a version string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Compatibility {
    pub major: u64,
    pub minor: u64,
}

impl FromStr for Compatibility {
    type Err = ResolveError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        fn component(part: Option<&str>) -> Option<u64> {
            part?.trim().parse().ok()
        }

        let mut parts = value.split('.');
        match (component(parts.next()), component(parts.next())) {
            (Some(major), Some(minor)) => Ok(Self { major, minor }),
            _ => Err(ResolveError::InvalidVersion { value: value.to_string() }),
        }
    }
}

impl Compatibility {
    /// Both components must be at least the tool's. They are compared independently.
    pub fn accepts(&self, tool: &Compatibility) -> bool {
        self.major >= tool.major && self.minor >= tool.minor
    }
}

/// First record, in manifest order, compatible with `tool`.
///
/// Scanning stops at the first hit even if a later record would also match.
pub fn find_compatible(manifest: &Manifest, template: &str, tool: &Compatibility) -> Option<ResolvedVersion> {
    manifest
        .versions(template)?
        .iter()
        .find(|record| match record.cli_compatibility.parse::<Compatibility>() {
            Ok(declared) => declared.accepts(tool),
            Err(_) => {
                debug!(version = %record.version, cli = %record.cli_compatibility, "ignoring unparseable record");
                false
            }
        })
        .map(ResolvedVersion::from)
}

/// Resolve `template` for the running tool version.
///
/// When nothing matches, `refresh` runs once before the failure is returned so the
/// next invocation sees an up to date template list.
pub fn resolve<F>(
    manifest: &Manifest,
    template: &str,
    tool_version: &str,
    refresh: F,
) -> Result<ResolvedVersion, ResolveError>
where
    F: FnOnce() -> anyhow::Result<()>,
{
    let tool = tool_version.parse::<Compatibility>()?;

    if let Some(resolved) = find_compatible(manifest, template, &tool) {
        debug!(template, version = %resolved.version, "resolved template version");
        return Ok(resolved);
    }

    warn!(
        template,
        tool_version,
        available = ?manifest.template_names(),
        "no compatible template version, refreshing template list"
    );
    refresh().map_err(ResolveError::Refresh)?;

    Err(ResolveError::TemplateNotFound { template: template.to_string() })
}
