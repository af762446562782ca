pub mod command;

use clap::{Arg, ArgAction, Command};

pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Full command tree, shared by `main` and shell completion generation
pub fn build_cli() -> Command {
    Command::new("maya")
        .about(format!("Maya v{} - Scaffold, generate, serve and build MayaJS projects", TOOL_VERSION))
        .long_about(
            "Maya creates new MayaJS projects from the published template registry, \
            generates routes, controllers, services and models inside an existing \
            project, and drives the development server and the TypeScript build."
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Increase log verbosity (-v debug, -vv trace)")
                .action(ArgAction::Count)
                .global(true)
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only log errors")
                .action(ArgAction::SetTrue)
                .global(true)
        )
        .subcommand(command::new::spec())
        .subcommand(command::generate::spec())
        .subcommand(command::serve::spec())
        .subcommand(command::build::spec())
        .subcommand(command::completion::spec())
        .version(TOOL_VERSION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code_generation::{dispatch, Dispatch, Question};

    #[test]
    fn test_cli_is_well_formed() {
        build_cli().debug_assert();
    }

    #[test]
    fn test_generate_alias_and_options() {
        let matches = build_cli()
            .try_get_matches_from(["maya", "g", "r", "api/users"])
            .unwrap();
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "generate");
        assert_eq!(sub.get_one::<String>("component").unwrap(), "r");
        assert_eq!(sub.get_one::<String>("path").unwrap(), "api/users");
    }

    #[test]
    fn test_serve_port() {
        let matches = build_cli()
            .try_get_matches_from(["maya", "serve", "--port", "4000", "-v"])
            .unwrap();
        let (_, sub) = matches.subcommand().unwrap();
        assert_eq!(sub.get_one::<u16>("port"), Some(&4000));
        assert_eq!(sub.get_count("verbose"), 1);
    }

    #[test]
    fn test_unknown_schema_is_asked_for() {
        let matches = build_cli()
            .try_get_matches_from(["maya", "generate", "model", "users", "--schema", "oracle"])
            .unwrap();
        let (_, sub) = matches.subcommand().unwrap();
        assert_eq!(sub.get_one::<String>("schema").unwrap(), "oracle");

        let args = command::generate::component_args(sub).unwrap();
        assert_eq!(
            dispatch(&args).unwrap(),
            Dispatch::NeedsInput(Question::Schema)
        );
    }
}
