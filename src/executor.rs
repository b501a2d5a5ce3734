//! Privileged command execution
//!
//! Every tool call goes through a [`PrivilegedRunner`]. The production runner,
//! [`ElevatedRunner`], builds `sudo -S -p '' sh -c "<tool> <quoted args>"`
//! and feeds it an empty stdin, so a password prompt fails immediately instead
//! of hanging an unattended run.

use crate::config::{AliasConfig, ElevationMode, ElevationSettings};
use crate::error::{AliasError, AliasResult};
use crate::quote::quote_args;
use async_trait::async_trait;
use std::borrow::Cow;
use std::fmt;
use std::io;
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;
use tracing::debug;

/// A tool name plus its ordered arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandInvocation {
    pub fn new<S: Into<String>>(program: S) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
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

    /// The single line handed to the shell
    pub fn shell_line(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, quote_args(&self.args))
        }
    }
}

impl fmt::Display for CommandInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.shell_line())
    }
}

/// How the subprocess ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitState {
    Success,
    /// Exited with a non-zero code
    Exited(i32),
    /// Killed before it could report a code
    Signaled,
}

impl ExitState {
    pub fn from_status(status: ExitStatus) -> Self {
        if status.success() {
            return ExitState::Success;
        }
        match status.code() {
            Some(code) => ExitState::Exited(code),
            None => ExitState::Signaled,
        }
    }

    pub fn success(&self) -> bool {
        matches!(self, ExitState::Success)
    }

    pub fn code(&self) -> Option<i32> {
        match self {
            ExitState::Success => Some(0),
            ExitState::Exited(code) => Some(*code),
            ExitState::Signaled => None,
        }
    }
}

impl fmt::Display for ExitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitState::Success => write!(f, "exit status 0"),
            ExitState::Exited(code) => write!(f, "exit status {}", code),
            ExitState::Signaled => write!(f, "terminated by signal"),
        }
    }
}

/// Captured output of one invocation
///
/// `output` is stdout followed by stderr. It is kept intact on failure since
/// classification works off exactly this text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub status: ExitState,
    pub output: Vec<u8>,
}

impl CommandResult {
    pub fn new<B: Into<Vec<u8>>>(status: ExitState, output: B) -> Self {
        Self {
            status,
            output: output.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.status.success()
    }

    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.output)
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.text().contains(needle)
    }

    /// Trimmed output, or the exit state when the tool said nothing
    pub fn detail(&self) -> String {
        let text = self.text();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            self.status.to_string()
        } else {
            trimmed.to_string()
        }
    }
}

/// Runs one command with elevated privilege
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PrivilegedRunner: Send + Sync {
    /// Run `invocation` to completion.
    ///
    /// A non-zero exit is `Ok` with the output preserved; `Err` means nothing
    /// ran at all.
    async fn run(&self, invocation: &CommandInvocation) -> AliasResult<CommandResult>;
}

/// Production runner: `sudo -S -p '' sh -c "<line>"` with empty stdin
#[derive(Debug, Clone)]
pub struct ElevatedRunner {
    mode: ElevationMode,
    helper: String,
    shell: String,
}

impl ElevatedRunner {
    pub fn new(settings: &ElevationSettings, shell: &str) -> Self {
        Self {
            mode: settings.mode,
            helper: settings.helper.clone(),
            shell: shell.to_string(),
        }
    }

    pub fn from_config(config: &AliasConfig) -> Self {
        Self::new(&config.elevation, &config.tools.shell)
    }

    fn uses_helper(&self) -> bool {
        match self.mode {
            ElevationMode::Sudo => true,
            ElevationMode::None => false,
            ElevationMode::Auto => !is_root(),
        }
    }

    /// Program and argv actually spawned for `invocation`
    pub fn command_line(&self, invocation: &CommandInvocation) -> (String, Vec<String>) {
        let line = invocation.shell_line();
        if self.uses_helper() {
            let args = vec![
                "-S".to_string(),
                "-p".to_string(),
                String::new(),
                self.shell.clone(),
                "-c".to_string(),
                line,
            ];
            (self.helper.clone(), args)
        } else {
            (self.shell.clone(), vec!["-c".to_string(), line])
        }
    }

    fn launch_error(
        &self,
        program: &str,
        invocation: &CommandInvocation,
        e: io::Error,
    ) -> AliasError {
        if self.uses_helper() && e.kind() == io::ErrorKind::NotFound {
            return AliasError::ElevationUnavailable {
                helper: program.to_string(),
            };
        }
        AliasError::SpawnFailed {
            cmd: invocation.shell_line(),
            reason: e.to_string(),
        }
    }
}

#[async_trait]
impl PrivilegedRunner for ElevatedRunner {
    async fn run(&self, invocation: &CommandInvocation) -> AliasResult<CommandResult> {
        let (program, args) = self.command_line(invocation);
        debug!("command: {} {:?}", program, args);

        // Stdin is empty: a password prompt sees EOF and fails fast
        let output = Command::new(&program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| self.launch_error(&program, invocation, e))?;

        let mut combined = output.stdout;
        combined.extend_from_slice(&output.stderr);

        let result = CommandResult::new(ExitState::from_status(output.status), combined);
        debug!("'{}' finished: {}", invocation, result.status);
        if !result.output.is_empty() {
            debug!("command output:\n{}", result.text());
        }

        Ok(result)
    }
}

/// Check if the current process is running as root
fn is_root() -> bool {
    unsafe { libc::geteuid() == 0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn runner(mode: ElevationMode, helper: &str) -> ElevatedRunner {
        let settings = ElevationSettings {
            mode,
            helper: helper.to_string(),
        };
        ElevatedRunner::new(&settings, "sh")
    }

    #[test]
    fn test_shell_line() {
        let inv = CommandInvocation::new("ip").args(["address", "add", "10.0.0.1/32", "dev", "lo"]);
        assert_eq!(inv.shell_line(), "ip address add 10.0.0.1/32 dev lo");

        let inv = CommandInvocation::new("echo").arg("two words");
        assert_eq!(inv.to_string(), "echo 'two words'");

        assert_eq!(CommandInvocation::new("true").shell_line(), "true");
    }

    #[test]
    fn test_sudo_command_line() {
        let inv = CommandInvocation::new("ip").args(["address", "show", "dev", "lo"]);
        let (program, args) = runner(ElevationMode::Sudo, "sudo").command_line(&inv);

        assert_eq!(program, "sudo");
        assert_eq!(args, vec!["-S", "-p", "", "sh", "-c", "ip address show dev lo"]);
    }

    #[test]
    fn test_direct_command_line() {
        let inv = CommandInvocation::new("ping").args(["-c", "1", "-w", "1", "10.0.0.1"]);
        let (program, args) = runner(ElevationMode::None, "sudo").command_line(&inv);

        assert_eq!(program, "sh");
        assert_eq!(args, vec!["-c", "ping -c 1 -w 1 10.0.0.1"]);
    }

    #[test]
    fn test_exit_state() {
        assert!(ExitState::Success.success());
        assert_eq!(ExitState::Exited(1).code(), Some(1));
        assert_eq!(ExitState::Signaled.code(), None);
        assert_eq!(ExitState::Exited(2).to_string(), "exit status 2");
    }

    #[test]
    fn test_result_detail() {
        let result = CommandResult::new(ExitState::Exited(2), "  RTNETLINK answers: File exists\n");
        assert!(result.contains("File exists"));
        assert_eq!(result.detail(), "RTNETLINK answers: File exists");

        let silent = CommandResult::new(ExitState::Exited(2), "");
        assert_eq!(silent.detail(), "exit status 2");
    }

    #[tokio::test]
    async fn test_direct_run_captures_output() {
        let inv = CommandInvocation::new("printf").arg("hello");
        let result = runner(ElevationMode::None, "sudo").run(&inv).await.unwrap();

        assert!(result.success());
        assert_eq!(result.text(), "hello");
    }

    #[tokio::test]
    async fn test_failure_keeps_output() {
        let inv = CommandInvocation::new("echo").args(["oops", "1>&2;", "exit", "3"]);
        let result = runner(ElevationMode::None, "sudo").run(&inv).await.unwrap();

        assert_eq!(result.status, ExitState::Exited(3));
        assert!(result.contains("oops"));
    }

    #[tokio::test]
    async fn test_stdin_is_empty() {
        let r = runner(ElevationMode::None, "sudo");

        let inv = CommandInvocation::new("cat");
        let result = tokio::time::timeout(Duration::from_secs(5), r.run(&inv))
            .await
            .expect("cat waited on stdin")
            .unwrap();
        assert!(result.success());
        assert!(result.output.is_empty());

        let inv = CommandInvocation::new("read").args(["line", "||", "echo", "eof"]);
        let result = tokio::time::timeout(Duration::from_secs(5), r.run(&inv))
            .await
            .expect("read waited on stdin")
            .unwrap();
        assert_eq!(result.text().trim(), "eof");
    }

    #[tokio::test]
    async fn test_missing_helper() {
        let inv = CommandInvocation::new("true");
        let err = runner(ElevationMode::Sudo, "/nonexistent/loalias-helper")
            .run(&inv)
            .await
            .unwrap_err();

        assert!(matches!(err, AliasError::ElevationUnavailable { .. }));
    }
}
