use clap::{Arg, ArgMatches, Command};
use anyhow::{Context, Result};
use tracing::debug;

use crate::cli::command::shared;
use crate::code_generation::{dispatch, ComponentArgs, ComponentRequest, Dispatch, Question};
use crate::pipeline::context::ComponentContext;

pub fn spec() -> Command {
    Command::new("generate")
        .visible_alias("g")
        .about("Generate a route, controller, service or model")
        .long_about(
            "Generate source files inside the current project's src/ directory.\n\
            \n\
            <COMPONENT> is route, controller, service or model, matched on its first letter \
            (r, c, s, m). Anything else opens an interactive choice.\n\
            <PATH> is `[directory/]name`, e.g. `api/users` writes \
            src/api/users.controller.ts.\n\
            \n\
            A route creates both a controller and a service. Models need --schema; \
            without it you are asked."
        )
        .arg(
            Arg::new("component")
                .help("Component kind: route, controller, service or model")
                .value_name("COMPONENT")
                .required(true)
        )
        .arg(
            Arg::new("path")
                .help("Target path under src/, ending with the component name")
                .value_name("PATH")
                .required(true)
        )
        .arg(
            Arg::new("schema")
                .short('s')
                .long("schema")
                .value_name("SCHEMA")
                .help("Schema flavour for models: mongo or sql. Anything else is asked for")
        )
}

pub fn action(matches: &ArgMatches) -> Result<()> {
    let mut args = component_args(matches)?;
    let request = resolve_request(&mut args, shared::ask)?;
    debug!(?request, "generating component");

    let cwd = shared::working_directory()?;
    let mut ctx = ComponentContext::default();
    request
        .pipeline(&cwd)
        .run(&mut ctx, shared::progress(matches).as_mut())
        .map_err(shared::pipeline_failed)?;

    println!("[Success] {} file(s) created.", ctx.written.len());
    Ok(())
}

pub fn component_args(matches: &ArgMatches) -> Result<ComponentArgs> {
    Ok(ComponentArgs {
        kind: matches.get_one::<String>("component").cloned(),
        path: matches
            .get_one::<String>("path")
            .cloned()
            .context("Missing component path")?,
        schema: matches.get_one::<String>("schema").cloned(),
    })
}

/// Dispatch until the request is complete, asking `ask` for each missing answer
pub fn resolve_request<F>(args: &mut ComponentArgs, mut ask: F) -> Result<ComponentRequest>
where
    F: FnMut(Question) -> Result<String>,
{
    loop {
        match dispatch(args)? {
            Dispatch::Ready(request) => return Ok(request),
            Dispatch::NeedsInput(question) => {
                let choice = ask(question)?;
                question.answer(args, &choice);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code_generation::dispatcher::{ComponentKind, SchemaKind};

    #[test]
    fn test_complete_arguments_never_prompt() {
        let mut args = ComponentArgs {
            kind: Some("r".to_string()),
            path: "api/users".to_string(),
            schema: None,
        };
        let request = resolve_request(&mut args, |q| panic!("unexpected question {:?}", q)).unwrap();
        assert_eq!(request.kind, ComponentKind::Route);
        assert_eq!(request.name, "users");
    }

    #[test]
    fn test_prompts_for_kind_then_schema() {
        let mut args = ComponentArgs {
            kind: Some("thing".to_string()),
            path: "users".to_string(),
            schema: None,
        };
        let mut asked = Vec::new();
        let request = resolve_request(&mut args, |q| {
            asked.push(q);
            Ok(match q {
                Question::Component => "model".to_string(),
                Question::Schema => "sql".to_string(),
            })
        })
        .unwrap();

        assert_eq!(asked, vec![Question::Component, Question::Schema]);
        assert_eq!(request.schema, Some(SchemaKind::Sql));
    }

    #[test]
    fn test_cancelled_prompt_is_an_error() {
        let mut args = ComponentArgs {
            kind: None,
            path: "users".to_string(),
            schema: None,
        };
        assert!(resolve_request(&mut args, |_| anyhow::bail!("Selection cancelled")).is_err());
    }
}
