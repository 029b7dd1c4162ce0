// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`spawner`] provides the `ProcessSpawner` trait, `CommandSpec` and the
//!   exit-report types the runner consumes.
//! - [`process`] is the `tokio::process` implementation used in production.

pub mod process;
pub mod spawner;

pub use process::TokioSpawner;
pub use spawner::{
    CommandSpec, ExitReceiver, ExitReport, ExitSender, Pid, ProcessSpawner, SIGNALED_EXIT_CODE,
};
