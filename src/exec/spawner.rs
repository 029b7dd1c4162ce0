// src/exec/spawner.rs

//! Pluggable process spawner abstraction.
//!
//! The runner talks to a `ProcessSpawner` instead of `tokio::process`
//! directly, so tests can swap in a fake that records spawns and lets the
//! test decide when (and how) each child exits.
//!
//! Exit notifications flow over an [`ExitSender`] supplied per spawn. Each
//! spawned process produces exactly one [`ExitReport`] on it.

use std::fmt;
use std::path::{Path, PathBuf};

use tokio::sync::mpsc;

use crate::env::ChildEnv;
use crate::errors::Result;

/// OS process identifier.
pub type Pid = u32;

/// Exit code reported for processes terminated by a signal.
pub const SIGNALED_EXIT_CODE: i32 = -1;

/// Completion notification for one child process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitReport {
    pub pid: Pid,
    pub code: i32,
}

pub type ExitSender = mpsc::UnboundedSender<ExitReport>;
pub type ExitReceiver = mpsc::UnboundedReceiver<ExitReport>;

/// Everything needed to launch one child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    pub env: ChildEnv,
}

impl CommandSpec {
    pub fn new<I, S>(program: impl Into<String>, args: I, cwd: impl AsRef<Path>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: cwd.as_ref().to_path_buf(),
            env: ChildEnv::new(),
        }
    }

    /// Run a user-provided command line through the platform shell.
    pub fn shell(line: &str, cwd: impl AsRef<Path>) -> Self {
        if cfg!(windows) {
            Self::new("cmd", ["/C", line], cwd)
        } else {
            Self::new("sh", ["-c", line], cwd)
        }
    }

    pub fn with_env(mut self, env: ChildEnv) -> Self {
        self.env = env;
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Trait abstracting how child processes are launched and interrupted.
///
/// Production code uses [`super::TokioSpawner`].
pub trait ProcessSpawner: Send {
    /// Launch `spec` immediately and return its pid without waiting.
    ///
    /// The child inherits the terminal's stdio. When it terminates, for any
    /// reason, exactly one [`ExitReport`] is sent on `on_exit`.
    fn spawn(&mut self, spec: &CommandSpec, on_exit: ExitSender) -> Result<Pid>;

    /// Ask the process `pid` to terminate gracefully.
    ///
    /// Returns once the request has been delivered, not once the process has
    /// exited; the exit still arrives as an [`ExitReport`]. Unknown pids are
    /// ignored.
    fn interrupt(&mut self, pid: Pid) -> Result<()>;
}
