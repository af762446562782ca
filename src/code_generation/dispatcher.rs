use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{bail, Context, Result};
use tracing::debug;

use crate::code_generation::renderer;
use crate::pipeline::context::ComponentContext;
use crate::pipeline::{Pipeline, Task};
use crate::shared::utils::paths::clean_relative;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    Route,
    Controller,
    Service,
    Model,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 4] = [
        ComponentKind::Route,
        ComponentKind::Controller,
        ComponentKind::Service,
        ComponentKind::Model,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentKind::Route => "route",
            ComponentKind::Controller => "controller",
            ComponentKind::Service => "service",
            ComponentKind::Model => "model",
        }
    }

    /// Matched on the first letter only, so `r`, `route` and `routes` are all a route
    pub fn parse(arg: &str) -> Option<Self> {
        let first = arg.trim().chars().next()?.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().starts_with(first))
    }

    /// Files one request of this kind produces
    pub fn files(&self) -> &'static [FileKind] {
        match self {
            ComponentKind::Route => &[FileKind::Controller, FileKind::Service],
            ComponentKind::Controller => &[FileKind::Controller],
            ComponentKind::Service => &[FileKind::Service],
            ComponentKind::Model => &[FileKind::Model],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    Mongo,
    Sql,
}

impl SchemaKind {
    pub const ALL: [SchemaKind; 2] = [SchemaKind::Mongo, SchemaKind::Sql];

    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaKind::Mongo => "mongo",
            SchemaKind::Sql => "sql",
        }
    }

    pub fn parse(arg: &str) -> Option<Self> {
        let arg = arg.trim().to_lowercase();
        Self::ALL.into_iter().find(|schema| schema.as_str() == arg)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Controller,
    Service,
    Model,
}

impl FileKind {
    pub fn suffix(&self) -> &'static str {
        match self {
            FileKind::Controller => "controller",
            FileKind::Service => "service",
            FileKind::Model => "model",
        }
    }
}

/// Raw `generate` arguments, possibly incomplete
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentArgs {
    pub kind: Option<String>,
    pub path: String,
    pub schema: Option<String>,
}

/// A fully specified generation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentRequest {
    pub kind: ComponentKind,
    pub directory: String,
    pub name: String,
    pub schema: Option<SchemaKind>,
}

/// A choice only the operator can make
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Question {
    Component,
    Schema,
}

impl Question {
    pub fn message(&self) -> &'static str {
        match self {
            Question::Component => "Choose a component to generate",
            Question::Schema => "Choose a schema",
        }
    }

    pub fn choices(&self) -> Vec<&'static str> {
        match self {
            Question::Component => ComponentKind::ALL.iter().map(|k| k.as_str()).collect(),
            Question::Schema => SchemaKind::ALL.iter().map(|s| s.as_str()).collect(),
        }
    }

    /// Store the operator's answer so the next dispatch can proceed
    pub fn answer(&self, args: &mut ComponentArgs, choice: &str) {
        match self {
            Question::Component => args.kind = Some(choice.to_string()),
            Question::Schema => args.schema = Some(choice.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Ready(ComponentRequest),
    NeedsInput(Question),
}

/// Turn raw arguments into a request, or say which answer is still missing
pub fn dispatch(args: &ComponentArgs) -> Result<Dispatch> {
    let (directory, name) = split_path(&args.path)?;

    let Some(kind) = args.kind.as_deref().and_then(ComponentKind::parse) else {
        debug!(kind = ?args.kind, "component kind needs operator input");
        return Ok(Dispatch::NeedsInput(Question::Component));
    };

    let schema = if kind == ComponentKind::Model {
        match args.schema.as_deref().and_then(SchemaKind::parse) {
            Some(schema) => Some(schema),
            None => return Ok(Dispatch::NeedsInput(Question::Schema)),
        }
    } else {
        None
    };

    Ok(Dispatch::Ready(ComponentRequest { kind, directory, name, schema }))
}

/// `api/users` -> (`api`, `users`). Both separators are accepted.
pub fn split_path(path: &str) -> Result<(String, String)> {
    let segments: Vec<&str> = path
        .split(|c| c == '/' || c == '\\')
        .filter(|s| !s.is_empty())
        .collect();

    let Some((name, parents)) = segments.split_last() else {
        bail!("Component path is empty: '{}'", path);
    };

    Ok((parents.join("/"), name.to_string()))
}

/// One file to write for a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationTask {
    pub file: FileKind,
    pub path: PathBuf,
    pub title: String,
}

impl ComponentRequest {
    /// Route controllers wire in the service generated alongside them
    pub fn imports_service(&self) -> bool {
        self.kind == ComponentKind::Route
    }

    pub fn file_path(&self, root: &Path, file: FileKind) -> PathBuf {
        let mut path = root.join("src");
        if !self.directory.is_empty() {
            path.push(&self.directory);
        }
        path.join(format!("{}.{}.ts", self.name, file.suffix()))
    }

    pub fn plan(&self, root: &Path) -> Vec<GenerationTask> {
        self.kind
            .files()
            .iter()
            .map(|&file| {
                let path = self.file_path(root, file);
                let title = format!("create {}", clean_relative(root, &path).display());
                GenerationTask { file, path, title }
            })
            .collect()
    }

    /// Pipeline writing every planned file. Existing files are skipped, not overwritten.
    pub fn pipeline<'a>(&'a self, root: &Path) -> Pipeline<'a, ComponentContext> {
        let mut pipeline = Pipeline::new();

        for task in self.plan(root) {
            let GenerationTask { file, path, title } = task;
            pipeline.push(Task::new(title, move |ctx: &mut ComponentContext, control| {
                if path.exists() {
                    control.skip("file already exists");
                    return Ok(());
                }

                let content = renderer::render(file, self)?;
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)
                        .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
                }
                fs::write(&path, content)
                    .with_context(|| format!("Failed to create file: {}", path.display()))?;
                ctx.written.push(path.clone());
                Ok(())
            }));
        }

        pipeline
    }
}
