use std::fs;
use std::path::Path;
use anyhow::{Context, Result};
use ignore::WalkBuilder;
use regex::{NoExpand, Regex};
use tracing::{debug, info};

use crate::shared::utils::paths::remove_if_exists;

/// Values written into a freshly copied template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitutions {
    pub project_name: String,
    pub version: String,
    pub package_name: String,
}

impl Substitutions {
    /// Derive the substitutions from the target directory the user asked for
    pub fn for_target(target: &str, tool_version: &str) -> Self {
        let dir_name = Path::new(target)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| target.to_string());

        Self {
            project_name: project_display_name(&dir_name),
            version: tool_version.to_string(),
            package_name: dir_name.to_lowercase(),
        }
    }
}

/// `my_cool-app` -> `My-Cool-App`
pub fn project_display_name(name: &str) -> String {
    name.split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

/// Copy `template_dir` over `project_dir` and fill in the project placeholders.
///
/// An existing `project_dir` is deleted first. Nothing is rolled back on failure.
pub fn stage_project(template_dir: &Path, project_dir: &Path, substitutions: &Substitutions) -> Result<()> {
    info!(
        template = %template_dir.display(),
        project = %project_dir.display(),
        "staging project"
    );
    replace_dir(template_dir, project_dir)?;
    apply_substitutions(project_dir, substitutions)
}

/// Make `destination` an exact copy of `source`
pub fn replace_dir(source: &Path, destination: &Path) -> Result<()> {
    if !source.is_dir() {
        anyhow::bail!("Template directory not found: {}", source.display());
    }
    remove_if_exists(destination)?;

    let walker = WalkBuilder::new(source)
        .standard_filters(false)
        .follow_links(false)
        .build();

    for entry in walker {
        let entry = entry.context("Failed to read template entry")?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .context("Template entry outside template directory")?;
        let target = destination.join(relative);

        if entry.file_type().map_or(false, |t| t.is_dir()) {
            fs::create_dir_all(&target)
                .with_context(|| format!("Failed to create directory: {}", target.display()))?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }
            fs::copy(entry.path(), &target)
                .with_context(|| format!("Failed to copy file: {}", entry.path().display()))?;
        }
    }

    Ok(())
}

/// Rewrite README.md and package.json of a staged project
pub fn apply_substitutions(project_dir: &Path, substitutions: &Substitutions) -> Result<()> {
    let readme = project_dir.join("README.md");
    if readme.exists() {
        rewrite(&readme, |text| substitute_readme(text, substitutions))?;
    }

    let package_json = project_dir.join("package.json");
    if package_json.exists() {
        rewrite(&package_json, |text| substitute_package_json(text, substitutions))?;
    }

    Ok(())
}

fn rewrite<F>(path: &Path, edit: F) -> Result<()>
where
    F: FnOnce(&str) -> Result<String>,
{
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let updated = edit(&content)?;
    if updated != content {
        debug!(file = %path.display(), "substituted placeholders");
        fs::write(path, updated)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    Ok(())
}

fn escape_replacement(value: &str) -> String {
    value.replace('$', "$$")
}

/// Apply `edit` to each `\n`-separated line on its own, so no match spans a line break
fn each_line<F>(text: &str, edit: F) -> String
where
    F: Fn(&str) -> String,
{
    text.split('\n').map(edit).collect::<Vec<_>>().join("\n")
}

/// Every ` MayaJS` / `"MayaJS` inside a line gets the project name inserted before it
fn substitute_brand(text: &str, project_name: &str) -> Result<String> {
    let re = Regex::new(r#"([\s|"])(MayaJS)"#)
        .context("Failed to create regex for project name")?;
    let replacement = format!("${{1}}{} ${{2}}", escape_replacement(project_name));
    Ok(each_line(text, |line| re.replace_all(line, replacement.as_str()).into_owned()))
}

fn substitute_readme(text: &str, substitutions: &Substitutions) -> Result<String> {
    let text = substitute_brand(text, &substitutions.project_name)?;
    let re = Regex::new(r"(version)")
        .context("Failed to create regex for version")?;
    let replacement = format!("${{1}} {}", escape_replacement(&substitutions.version));
    Ok(each_line(&text, |line| re.replace_all(line, replacement.as_str()).into_owned()))
}

fn substitute_package_json(text: &str, substitutions: &Substitutions) -> Result<String> {
    let text = substitute_brand(text, &substitutions.project_name)?;
    let re = Regex::new(r#""mayajs""#)
        .context("Failed to create regex for package name")?;
    let replacement = format!("\"{}\"", substitutions.package_name);
    // first occurrence on each line
    Ok(each_line(&text, |line| re.replace(line, NoExpand(&replacement)).into_owned()))
}
