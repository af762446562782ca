use std::path::PathBuf;
use anyhow::{Context, Result};
use clap::ArgMatches;
use inquire::Select;
use tracing::error;

use crate::code_generation::Question;
use crate::pipeline::{ConsoleProgress, PipelineError, Progress, Silent};

/// Directory the command was invoked from. Captured once and passed down explicitly.
pub fn working_directory() -> Result<PathBuf> {
    std::env::current_dir().context("Failed to determine the current directory")
}

/// Ask the operator to pick one of the question's choices
pub fn ask(question: Question) -> Result<String> {
    let choices = question.choices();
    let selected = Select::new(question.message(), choices)
        .prompt()
        .context("Selection cancelled")?;
    Ok(selected.to_string())
}

/// Task progress printer; `--quiet` silences it
pub fn progress(matches: &ArgMatches) -> Box<dyn Progress> {
    if matches.get_flag("quiet") {
        Box::new(Silent)
    } else {
        Box::new(ConsoleProgress)
    }
}

/// Log a failed pipeline on the error channel and hand it back as a command error
pub fn pipeline_failed(err: PipelineError) -> anyhow::Error {
    error!(task = %err.title, cause = %format!("{:#}", err.source), "pipeline aborted");
    err.into()
}
