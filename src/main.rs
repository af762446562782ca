mod cli;
mod code_generation;
mod pipeline;
mod project_management;
mod registry;
mod shared;

use anyhow::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::cli::{build_cli, command};

fn main() -> Result<()> {
    let matches = build_cli().get_matches();

    init_tracing(matches.get_count("verbose"), matches.get_flag("quiet"));

    match matches.subcommand() {
        Some(("new", sub_matches)) => {
            command::new::action(sub_matches)
        }
        Some(("generate", sub_matches)) => {
            command::generate::action(sub_matches)
        }
        Some(("serve", sub_matches)) => {
            command::serve::action(sub_matches)
        }
        Some(("build", sub_matches)) => {
            command::build::action(sub_matches)
        }
        Some(("completion", sub_matches)) => {
            command::completion::action(sub_matches)
        }
        _ => unreachable!()
    }
}

/// Logs go to stderr so they never mix with task progress on stdout
fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
