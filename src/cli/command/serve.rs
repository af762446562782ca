use std::path::Path;
use clap::{Arg, ArgMatches, Command};
use anyhow::{Context, Result};
use tracing::info;

use crate::cli::command::shared;
use crate::project_management::config::Settings;
use crate::shared::utils::paths::remove_if_exists;
use crate::shared::utils::process::{ProcessRunner, SystemRunner};

pub fn spec() -> Command {
    Command::new("serve")
        .visible_alias("run")
        .about("Start the development server")
        .long_about(
            "Remove dist/ and start the development server for the project in the \
            current directory. The port is passed to the server as PORT."
        )
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .help("Port to listen on (default 3333)")
                .value_name("PORT")
                .value_parser(clap::value_parser!(u16))
        )
}

pub fn action(matches: &ArgMatches) -> Result<()> {
    let settings = Settings::load()?;
    let port = matches
        .get_one::<u16>("port")
        .copied()
        .unwrap_or_else(|| settings.default_port());
    let cwd = shared::working_directory()?;

    run_server(&cwd, port, &settings, &SystemRunner)
}

/// Clean the output directory, then run the dev server until it exits
pub fn run_server(project_dir: &Path, port: u16, settings: &Settings, runner: &dyn ProcessRunner) -> Result<()> {
    remove_if_exists(&project_dir.join("dist"))?;

    let spec = settings
        .serve_command()
        .to_spec()
        .current_dir(project_dir)
        .env("PORT", port.to_string())
        .interactive();

    info!(port, dir = %project_dir.display(), "starting development server");
    runner.run(&spec).context("Development server stopped with an error")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use crate::shared::utils::process::testing::RecordingRunner;

    #[test]
    fn test_run_server_cleans_dist_and_passes_port() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("dist/old")).unwrap();
        let runner = RecordingRunner::default();

        run_server(temp_dir.path(), 4000, &Settings::default(), &runner).unwrap();

        assert!(!temp_dir.path().join("dist").exists());
        let calls = runner.calls.borrow();
        assert_eq!(calls[0].command_line(), "npx ts-node src/index.ts");
        assert_eq!(calls[0].envs, vec![("PORT".to_string(), "4000".to_string())]);
        assert_eq!(calls[0].cwd.as_deref(), Some(temp_dir.path()));
        assert!(calls[0].interactive);
    }

    #[test]
    fn test_server_failure_is_reported() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let runner = RecordingRunner {
            fail_program: Some("npx".to_string()),
            ..RecordingRunner::default()
        };
        assert!(run_server(temp_dir.path(), 3333, &Settings::default(), &runner).is_err());
    }
}
