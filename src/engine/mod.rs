// src/engine/mod.rs

//! Process orchestration engine.
//!
//! This module ties together:
//! - pre-build hooks (`beforeDevCommand` / `beforeBuildCommand`)
//! - integration-code regeneration
//! - index document / inlined-asset resolution
//! - one or more compiler invocations, strictly one child at a time
//!
//! The pure exit classification lives in [`classify`]; the async shell that
//! owns the child process is [`runner::Runner`].

use crate::exec::Pid;

/// What the tracked child was started for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Interactive `cargo run`.
    Dev { exit_on_panic: bool },
    /// One-shot release build or bundle.
    Build,
}

/// The single child process the runner currently owns.
///
/// `generation` increases with every compiler spawn; together with `pid` it
/// identifies which spawn an exit report belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveChild {
    pub pid: Pid,
    pub generation: u64,
    pub mode: RunMode,
}

/// How waiting on the tracked child ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildExit {
    /// Exited with code 0.
    Success,
    /// Dev-mode panic tolerated because `exitOnPanic` is false.
    ToleratedCrash,
    /// Exited after a graceful stop.
    Stopped,
    /// There was no child to wait for.
    Idle,
}

pub mod args;
pub mod assets;
pub mod classify;
pub mod runner;

pub use classify::{classify, ExitClass, PANIC_EXIT_CODE};
pub use runner::{Runner, RunnerState};
