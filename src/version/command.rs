//! Child process execution for resolvers backed by local tools

#[cfg(test)]
use mockall::automock;

use tracing::debug;

use crate::version::error::ResolveError;

/// Captured result of a finished child process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when the process was killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Turns a non-zero exit into [`ResolveError::Subprocess`]
    pub fn into_success(self, command: &str) -> Result<Self, ResolveError> {
        if self.success() {
            return Ok(self);
        }
        Err(ResolveError::Subprocess {
            command: command.to_string(),
            status: self
                .code
                .map_or_else(|| "signal".to_string(), |code| format!("exit code {code}")),
            stderr: self.stderr.trim().to_string(),
        })
    }
}

/// Runs a program to completion and captures its output
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs `program` with `args`. A non-zero exit is not an error here;
    /// callers decide via [`CommandOutput::into_success`].
    async fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput, ResolveError>;
}

/// [`CommandRunner`] that spawns real processes
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemCommandRunner;

#[async_trait::async_trait]
impl CommandRunner for SystemCommandRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput, ResolveError> {
        let command = display_command(program, args);
        debug!("Running {}", command);

        let output = tokio::process::Command::new(program)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| ResolveError::Subprocess {
                command: command.clone(),
                status: "spawn failure".to_string(),
                stderr: e.to_string(),
            })?;

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Human readable command line for error messages
pub fn display_command(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}
