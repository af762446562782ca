use clap::{ArgMatches, Command};
use anyhow::{Context, Result};

use crate::cli::command::shared;
use crate::pipeline::context::BuildContext;
use crate::pipeline::{Pipeline, Task};
use crate::project_management::config::Settings;
use crate::shared::utils::paths::remove_if_exists;
use crate::shared::utils::process::{ProcessRunner, SystemRunner};

pub fn spec() -> Command {
    Command::new("build")
        .about("Compile the project in the current directory into dist/")
}

pub fn action(matches: &ArgMatches) -> Result<()> {
    let settings = Settings::load()?;
    let cwd = shared::working_directory()?;
    let mut ctx = BuildContext::for_project(&cwd);

    build_pipeline(&settings, &SystemRunner)
        .run(&mut ctx, shared::progress(matches).as_mut())
        .map_err(shared::pipeline_failed)?;

    println!("[Success] Build written to {}", ctx.out_dir.display());
    Ok(())
}

pub fn build_pipeline<'a>(settings: &'a Settings, runner: &'a dyn ProcessRunner) -> Pipeline<'a, BuildContext> {
    let mut pipeline = Pipeline::new();

    pipeline
        .push(Task::new("Clean dist folder", |ctx: &mut BuildContext, _| {
            remove_if_exists(&ctx.out_dir)
        }))
        .push(Task::new("Build project", move |ctx: &mut BuildContext, _| {
            let spec = settings
                .build_command()
                .to_spec()
                .arg("--project")
                .arg(ctx.project.to_string_lossy())
                .arg("--rootDir")
                .arg(ctx.root_dir.to_string_lossy())
                .arg("--outDir")
                .arg(ctx.out_dir.to_string_lossy())
                .args(["--experimentalDecorators", "--emitDecoratorMetadata", "--target", "ES5", "--esModuleInterop"])
                .current_dir(&ctx.project_root);
            runner.run(&spec).context("TypeScript compilation failed")?;
            Ok(())
        }));

    pipeline
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use crate::pipeline::Silent;
    use crate::shared::utils::process::testing::RecordingRunner;

    #[test]
    fn test_build_cleans_then_compiles() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("dist/stale")).unwrap();
        let runner = RecordingRunner::default();
        let settings = Settings::default();
        let mut ctx = BuildContext::for_project(temp_dir.path());

        build_pipeline(&settings, &runner).run(&mut ctx, &mut Silent).unwrap();

        assert!(!temp_dir.path().join("dist").exists());
        let calls = runner.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].program, "npx");
        assert_eq!(calls[0].args[0], "tsc");
        assert!(calls[0].args.contains(&"--emitDecoratorMetadata".to_string()));
        assert_eq!(calls[0].cwd.as_deref(), Some(temp_dir.path()));
    }

    #[test]
    fn test_compile_failure_reports_task() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let runner = RecordingRunner {
            fail_program: Some("npx".to_string()),
            ..RecordingRunner::default()
        };
        let settings = Settings::default();
        let mut ctx = BuildContext::for_project(temp_dir.path());

        let err = build_pipeline(&settings, &runner).run(&mut ctx, &mut Silent).unwrap_err();
        assert_eq!(err.position, 1);
    }
}
