use std::path::Path;
use clap::{Arg, ArgAction, ArgMatches, Command};
use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cli::command::{serve, shared};
use crate::cli::TOOL_VERSION;
use crate::pipeline::context::ProjectContext;
use crate::pipeline::{Pipeline, Task};
use crate::project_management::config::Settings;
use crate::project_management::staging::{stage_project, Substitutions};
use crate::registry::resolver::resolve;
use crate::registry::{HttpManifestSource, Manifest, ManifestSource, TemplateCache};
use crate::shared::utils::paint::yellow;
use crate::shared::utils::process::{ProcessRunner, SystemRunner};

pub fn spec() -> Command {
    Command::new("new")
        .about("Create a new MayaJS project")
        .long_about(
            "Create a new project in <directory> from the MayaJS templates.\n\
            \n\
            Without --template the default template of the templates repository is used. With --template \
            the template list is downloaded and the first version compatible with \
            this CLI is cloned.\n\
            \n\
            An existing <directory> is deleted and replaced."
        )
        .arg(
            Arg::new("directory")
                .help("Directory to create the project in")
                .value_name("DIRECTORY")
                .required(true)
        )
        .arg(
            Arg::new("template")
                .short('t')
                .long("template")
                .help("Template name from the registry")
                .value_name("NAME")
        )
        .arg(
            Arg::new("no-serve")
                .long("no-serve")
                .help("Do not start the development server afterwards")
                .action(ArgAction::SetTrue)
        )
}

pub fn action(matches: &ArgMatches) -> Result<()> {
    let directory = matches
        .get_one::<String>("directory")
        .context("Missing project directory")?;
    let template = matches.get_one::<String>("template").cloned();

    let settings = Settings::load()?;
    let cwd = shared::working_directory()?;
    let runner = SystemRunner;
    let source = HttpManifestSource::new(settings.registry_url());

    let mut ctx = ProjectContext::new(TOOL_VERSION, settings.templates_dir()?, directory, template);
    let pipeline = project_pipeline(&settings, &cwd, &runner, &source);

    let report = pipeline
        .run(&mut ctx, shared::progress(matches).as_mut())
        .map_err(shared::pipeline_failed)?;
    debug!(tasks = ?report.executed(), "project pipeline finished");

    let project_dir = ctx
        .project_dir
        .context("Project directory was not staged")?;
    println!("[Success] Project created in {}", project_dir.display());

    if matches.get_flag("no-serve") {
        return Ok(());
    }

    println!("{}", yellow("[maya] Running your project for the first time..."));
    serve::run_server(&project_dir, settings.default_port(), &settings, &runner)
}

/// Steps of `maya new`, in order
pub fn project_pipeline<'a>(
    settings: &'a Settings,
    cwd: &'a Path,
    runner: &'a dyn ProcessRunner,
    source: &'a dyn ManifestSource,
) -> Pipeline<'a, ProjectContext> {
    let mut pipeline = Pipeline::new();

    pipeline.push(
        Task::new(
            "Downloading files for creating your MayaJS project...",
            move |ctx: &mut ProjectContext, _| {
                TemplateCache::new(&ctx.templates_dir, runner).refresh(settings.templates_repo())
            },
        )
        .enabled_when(|ctx| TemplateCache::needs_clone(&ctx.templates_dir)),
    );

    pipeline.push(
        Task::new("Updating template list...", move |ctx: &mut ProjectContext, _| {
            let body = source.fetch()?;
            let (manifest, text) = Manifest::parse_document(&body)?;
            TemplateCache::new(&ctx.templates_dir, runner).write_manifest(&text)?;
            ctx.manifest = Some(manifest);
            ctx.manifest_text = Some(text);
            Ok(())
        })
        .enabled_when(ProjectContext::wants_template),
    );

    pipeline.push(
        Task::new("Searching template list...", move |ctx: &mut ProjectContext, _| {
            let template = ctx.template.as_deref().context("No template requested")?;
            let manifest = ctx.manifest.as_ref().context("Template list was not downloaded")?;
            let text = ctx.manifest_text.as_deref().unwrap_or_default();
            let cache = TemplateCache::new(&ctx.templates_dir, runner);

            let selected = resolve(manifest, template, &ctx.tool_version, || cache.write_manifest(text))?;
            info!(template, version = %selected.version, "selected template version");
            ctx.selected = Some(selected);
            Ok(())
        })
        .enabled_when(ProjectContext::wants_template),
    );

    pipeline.push(
        Task::new(
            "Downloading template files for your project...",
            move |ctx: &mut ProjectContext, control| {
                let template = ctx.template.clone().context("No template requested")?;
                let selected = ctx.selected.clone().context("No template version selected")?;

                let (dir, cloned) = TemplateCache::new(&ctx.templates_dir, runner).checkout(&template, &selected)?;
                ctx.template_dir = dir;
                if !cloned {
                    control.skip(format!("{}@{} already downloaded", template, selected.version));
                }
                Ok(())
            },
        )
        .enabled_when(ProjectContext::wants_template),
    );

    pipeline.push(Task::new(
        "Preparing project files and directories...",
        move |ctx: &mut ProjectContext, _| {
            let project_dir = cwd.join(&ctx.target);
            // set before copying, a failed copy still leaves a partial project here
            ctx.project_dir = Some(project_dir.clone());
            let substitutions = Substitutions::for_target(&ctx.target, &ctx.tool_version);
            stage_project(&ctx.template_dir, &project_dir, &substitutions)
        },
    ));

    pipeline.push(Task::new(
        "Installing project dependencies...",
        move |ctx: &mut ProjectContext, _| {
            let project_dir = ctx.project_dir.as_deref().context("Project directory was not staged")?;
            let spec = settings.package_manager().to_spec().current_dir(project_dir);
            runner.run(&spec).context("Failed to install project dependencies")?;
            Ok(())
        },
    ));

    pipeline
}
