//! Check command execution.
//!
//! [`CommandExecutor`] is the seam between scoring and real processes:
//! it takes a command string and reports how the process exited. The shell
//! implementation runs commands in a working directory with all output
//! discarded; tests substitute [`crate::fakes::ScriptedExecutor`].

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Instant;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

/// How a check process terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitOutcome {
    /// Exit code, `None` when the process was killed by a signal.
    pub code: Option<i32>,
    pub duration_ms: u64,
}

impl ExitOutcome {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs a check command to completion.
///
/// `Err` means the process could not be run at all (spawn failure);
/// a process that ran and exited nonzero is `Ok`.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn execute(&self, command: &str) -> std::io::Result<ExitOutcome>;
}

/// Executes commands through the platform shell.
#[derive(Debug, Clone, Default)]
pub struct ShellExecutor {
    /// Directory commands run in; the process working directory when unset.
    work_dir: Option<PathBuf>,
}

impl ShellExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_dir(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: Some(work_dir.into()),
        }
    }

    fn command(&self, command: &str) -> Command {
        let mut cmd = if cfg!(windows) {
            let mut c = Command::new("cmd");
            c.arg("/C").arg(command);
            c
        } else {
            let mut c = Command::new("sh");
            c.arg("-c").arg(command);
            c
        };
        if let Some(dir) = &self.work_dir {
            cmd.current_dir(dir);
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        cmd
    }
}

#[async_trait]
impl CommandExecutor for ShellExecutor {
    async fn execute(&self, command: &str) -> std::io::Result<ExitOutcome> {
        let start = Instant::now();
        let status = self.command(command).status().await?;
        let outcome = ExitOutcome {
            code: status.code(),
            duration_ms: start.elapsed().as_millis() as u64,
        };
        debug!(command = %command, exit_code = ?outcome.code, duration_ms = outcome.duration_ms, "Check finished");
        Ok(outcome)
    }
}
