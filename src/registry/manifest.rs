use std::collections::BTreeMap;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Registry document: template name -> published versions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    templates: BTreeMap<String, TemplateEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateEntry {
    #[serde(default)]
    pub versions: Vec<VersionRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    pub version: String,
    /// Oldest `major.minor` of the CLI this version works with
    #[serde(rename = "cli")]
    pub cli_compatibility: String,
    #[serde(rename = "url")]
    pub source_url: String,
}

/// Version picked for a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVersion {
    pub version: String,
    pub url: String,
}

impl From<&VersionRecord> for ResolvedVersion {
    fn from(record: &VersionRecord) -> Self {
        Self {
            version: record.version.clone(),
            url: record.source_url.clone(),
        }
    }
}

impl Manifest {
    /// Parse a fetched registry body.
    ///
    /// Returns the typed manifest together with the pretty-printed document, which is
    /// what gets written to the local cache.
    pub fn parse_document(body: &str) -> Result<(Self, String)> {
        let value: serde_json::Value = serde_json::from_str(body)
            .context("Failed to parse template registry document")?;
        let text = serde_json::to_string_pretty(&value)
            .context("Failed to serialize template registry document")?;
        let manifest = serde_json::from_value(value)
            .context("Template registry document has an unexpected shape")?;
        Ok((manifest, text))
    }

    pub fn versions(&self, template: &str) -> Option<&[VersionRecord]> {
        self.templates.get(template).map(|entry| entry.versions.as_slice())
    }

    pub fn template_names(&self) -> Vec<&str> {
        self.templates.keys().map(String::as_str).collect()
    }

    #[cfg(test)]
    pub fn insert(&mut self, template: impl Into<String>, versions: Vec<VersionRecord>) {
        self.templates.insert(template.into(), TemplateEntry { versions });
    }
}
