use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use thiserror::Error;
use tracing::debug;

/// External command to spawn. The working directory is always explicit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub envs: Vec<(String, String)>,
    pub interactive: bool,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            envs: Vec::new(),
            interactive: false,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// Let the child use the terminal directly instead of capturing its output
    pub fn interactive(mut self) -> Self {
        self.interactive = true;
        self
    }

    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Failed to start `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("`{command}` exited with {code}: {stderr}")]
    Failed {
        command: String,
        code: String,
        stderr: String,
    },
}

/// Spawns external commands and waits for them to exit
pub trait ProcessRunner {
    fn run(&self, spec: &CommandSpec) -> Result<(), ProcessError>;
}

/// Runs commands on the host
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> Result<(), ProcessError> {
        let command_line = spec.command_line();
        debug!(command = %command_line, cwd = ?spec.cwd, "spawning");

        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args);
        if let Some(dir) = &spec.cwd {
            cmd.current_dir(dir);
        }
        for (key, value) in &spec.envs {
            cmd.env(key, value);
        }

        let spawn_error = |source| ProcessError::Spawn {
            command: command_line.clone(),
            source,
        };

        let (status, stderr) = if spec.interactive {
            let status = cmd.status().map_err(spawn_error)?;
            (status, String::new())
        } else {
            let output = cmd.stdin(Stdio::null()).output().map_err(spawn_error)?;
            (output.status, String::from_utf8_lossy(&output.stderr).trim().to_string())
        };

        if !status.success() {
            return Err(ProcessError::Failed {
                command: command_line,
                code: status
                    .code()
                    .map_or_else(|| "signal".to_string(), |c| c.to_string()),
                stderr,
            });
        }

        Ok(())
    }
}

/// `git clone <url> <destination>`
pub fn git_clone(runner: &dyn ProcessRunner, url: &str, destination: &Path) -> Result<(), ProcessError> {
    let spec = CommandSpec::new("git")
        .arg("clone")
        .arg(url)
        .arg(destination.to_string_lossy());
    runner.run(&spec)
}


#[cfg(test)]
mod tests {
    use super::*;
    use super::testing::RecordingRunner;

    #[test]
    fn test_command_line() {
        let spec = CommandSpec::new("npm").args(["i", "--error"]).current_dir("/tmp/app");
        assert_eq!(spec.command_line(), "npm i --error");
        assert_eq!(spec.cwd, Some(PathBuf::from("/tmp/app")));
    }

    #[test]
    fn test_git_clone_arguments() {
        let runner = RecordingRunner::default();
        git_clone(&runner, "https://example.com/t.git", Path::new("/tmp/t")).unwrap();

        let calls = runner.calls.borrow();
        assert_eq!(calls[0].program, "git");
        assert_eq!(calls[0].args, vec!["clone", "https://example.com/t.git", "/tmp/t"]);
    }

    #[test]
    fn test_system_runner_reports_exit_code() {
        let err = SystemRunner
            .run(&CommandSpec::new("sh").args(["-c", "echo nope >&2; exit 3"]))
            .unwrap_err();
        match err {
            ProcessError::Failed { code, stderr, .. } => {
                assert_eq!(code, "3");
                assert_eq!(stderr, "nope");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_system_runner_missing_program() {
        let err = SystemRunner
            .run(&CommandSpec::new("definitely-not-a-real-program-xyz"))
            .unwrap_err();
        assert!(matches!(err, ProcessError::Spawn { .. }));
    }

    #[test]
    fn test_system_runner_uses_explicit_cwd() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        SystemRunner
            .run(&CommandSpec::new("sh").args(["-c", "touch marker"]).current_dir(temp_dir.path()))
            .unwrap();
        assert!(temp_dir.path().join("marker").exists());
    }
}
