//! External process execution.
//!
//! Every toolchain call (dotnet publish, docker build/tag/push/login, ditto)
//! goes through [`CommandRunner`] so the pipeline can be driven by a scripted
//! runner in tests. Calls are blocking from the pipeline's point of view: each
//! one is awaited to completion before the next stage starts.

use std::fmt;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

use crate::cli::Reporter;
use crate::error::{ReleaseError, Result};

/// Default timeout for short tool invocations.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// A fully described process invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
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

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    pub fn time_limit(&self) -> Duration {
        self.timeout
    }

    /// Value following `flag` in the argument list, if present.
    pub fn flag_value(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.contains(' ') {
                write!(f, " \"{arg}\"")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// How a finished process exited.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommandOutcome {
    /// Exit code; `None` when the process was terminated by a signal.
    pub code: Option<i32>,
}

impl CommandOutcome {
    pub const SUCCESS: Self = Self { code: Some(0) };

    pub fn failure(code: i32) -> Self {
        Self { code: Some(code) }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<std::process::ExitStatus> for CommandOutcome {
    fn from(status: std::process::ExitStatus) -> Self {
        Self {
            code: status.code(),
        }
    }
}

/// Abstracts process execution so the toolchain can be swapped or scripted.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run to completion, streaming stdout/stderr lines to the reporter.
    ///
    /// A non-zero exit is returned as an outcome, not an error; errors mean the
    /// process could not be spawned, waited on, or exceeded its timeout.
    async fn run(&self, invocation: &Invocation, reporter: &dyn Reporter)
    -> Result<CommandOutcome>;

    /// Run with inherited stdio so the child can talk to the terminal.
    async fn run_interactive(&self, invocation: &Invocation) -> Result<CommandOutcome>;
}

/// Production runner backed by `tokio::process`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioCommandRunner;

impl TokioCommandRunner {
    fn command(invocation: &Invocation) -> Command {
        let mut cmd = Command::new(invocation.program());
        cmd.args(invocation.arguments()).kill_on_drop(true);
        cmd
    }

    fn timed_out(invocation: &Invocation) -> ReleaseError {
        let limit = invocation.time_limit();
        let secs = limit.as_secs();
        ReleaseError::ExecutionFailed {
            command: invocation.to_string(),
            reason: if secs >= 120 {
                format!("timed out after {} minutes", secs / 60)
            } else if secs >= 1 {
                format!("timed out after {secs} seconds")
            } else {
                format!("timed out after {} ms", limit.as_millis())
            },
        }
    }
}

impl CommandRunner for TokioCommandRunner {
    async fn run(
        &self,
        invocation: &Invocation,
        reporter: &dyn Reporter,
    ) -> Result<CommandOutcome> {
        log::debug!("Running: {invocation}");

        let mut child = Self::command(invocation)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ReleaseError::ExecutionFailed {
                command: invocation.to_string(),
                reason: e.to_string(),
            })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let streamed = async {
            tokio::join!(
                async {
                    if let Some(stdout) = stdout {
                        let mut lines = BufReader::new(stdout).lines();
                        while let Ok(Some(line)) = lines.next_line().await {
                            reporter.indent(&line);
                        }
                    }
                },
                async {
                    if let Some(stderr) = stderr {
                        let mut lines = BufReader::new(stderr).lines();
                        while let Ok(Some(line)) = lines.next_line().await {
                            reporter.indent(&line);
                        }
                    }
                }
            );
            child.wait().await
        };

        let finished = tokio::time::timeout(invocation.time_limit(), streamed).await;

        match finished {
            Ok(Ok(status)) => Ok(status.into()),
            Ok(Err(e)) => Err(ReleaseError::ExecutionFailed {
                command: invocation.to_string(),
                reason: e.to_string(),
            }),
            Err(_elapsed) => {
                reporter.warn(&format!("{} timed out, terminating", invocation.program()));
                if let Err(e) = child.kill().await {
                    log::warn!("Failed to kill {}: {e}", invocation.program());
                }
                Err(Self::timed_out(invocation))
            }
        }
    }

    async fn run_interactive(&self, invocation: &Invocation) -> Result<CommandOutcome> {
        log::debug!("Running interactively: {invocation}");

        let mut child = Self::command(invocation)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| ReleaseError::ExecutionFailed {
                command: invocation.to_string(),
                reason: e.to_string(),
            })?;

        match tokio::time::timeout(invocation.time_limit(), child.wait()).await {
            Ok(Ok(status)) => Ok(status.into()),
            Ok(Err(e)) => Err(ReleaseError::ExecutionFailed {
                command: invocation.to_string(),
                reason: e.to_string(),
            }),
            Err(_elapsed) => {
                if let Err(e) = child.kill().await {
                    log::warn!("Failed to kill {}: {e}", invocation.program());
                }
                Err(Self::timed_out(invocation))
            }
        }
    }
}
