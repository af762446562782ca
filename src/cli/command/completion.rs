use clap::{Command, Arg, ArgMatches, ValueEnum};
use clap_complete::{generate, Generator, Shell};
use anyhow::{Context, Result};
use std::io;

use crate::cli::build_cli;

#[derive(Debug, Clone, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

impl From<CompletionShell> for Shell {
    fn from(shell: CompletionShell) -> Self {
        match shell {
            CompletionShell::Bash => Shell::Bash,
            CompletionShell::Zsh => Shell::Zsh,
            CompletionShell::Fish => Shell::Fish,
            CompletionShell::PowerShell => Shell::PowerShell,
            CompletionShell::Elvish => Shell::Elvish,
        }
    }
}

pub fn spec() -> Command {
    Command::new("completion")
        .about("Generate shell completion scripts")
        .long_about(
            "Generate shell completion scripts for maya.\n\n\
            Installation examples:\n  \
            Bash:       maya completion bash > /usr/local/etc/bash_completion.d/maya\n  \
            Zsh:        maya completion zsh > ~/.zsh/completion/_maya\n  \
            Fish:       maya completion fish > ~/.config/fish/completions/maya.fish\n  \
            PowerShell: maya completion powershell > maya.ps1"
        )
        .arg(
            Arg::new("shell")
                .help("Shell type to generate completion for")
                .value_parser(clap::value_parser!(CompletionShell))
                .required(true)
        )
}

pub fn action(matches: &ArgMatches) -> Result<()> {
    let shell = matches
        .get_one::<CompletionShell>("shell")
        .context("Shell argument is required")?;

    let mut cmd = build_cli();
    let bin_name = cmd.get_name().to_string();
    write_completions(Shell::from(shell.clone()), &mut cmd, bin_name, &mut io::stdout());

    Ok(())
}

fn write_completions<G: Generator>(gen: G, cmd: &mut Command, bin_name: String, out: &mut dyn io::Write) {
    generate(gen, cmd, bin_name, out);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bash_completion_lists_subcommands() {
        let mut cmd = build_cli();
        let mut out = Vec::new();
        write_completions(Shell::Bash, &mut cmd, "maya".to_string(), &mut out);

        let script = String::from_utf8(out).unwrap();
        assert!(script.contains("generate"));
        assert!(script.contains("serve"));
    }
}
