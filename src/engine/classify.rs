// src/engine/classify.rs

//! Pure exit classification.
//!
//! Given an exit report and a snapshot of the runner state, decide what the
//! exit means. No IO, no Tokio, so the whole table is unit-testable.

use crate::engine::{ActiveChild, RunMode};
use crate::exec::ExitReport;

/// Exit code produced by a Rust binary that panicked.
pub const PANIC_EXIT_CODE: i32 = 101;

/// Meaning of an exit report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitClass {
    /// Report for a pid that is not the tracked child. Dropped silently.
    Stale,
    /// The tracked child exited after a graceful stop was requested.
    Stopped,
    /// Clean exit (code 0).
    Success,
    /// Dev-mode panic while `exitOnPanic` is false.
    ToleratedCrash,
    /// Any other nonzero code.
    Failure(i32),
}

impl ExitClass {
    /// Whether the tracked child is gone after this report.
    pub fn ends_child(self) -> bool {
        !matches!(self, ExitClass::Stale)
    }
}

/// Classify `report` against the currently tracked child.
///
/// Identity is checked first: a report from a superseded generation can
/// neither complete a pending stop nor fail the current operation.
pub fn classify(report: ExitReport, active: Option<ActiveChild>, pending_stop: bool) -> ExitClass {
    let Some(active) = active else {
        return ExitClass::Stale;
    };
    if report.pid != active.pid {
        return ExitClass::Stale;
    }
    if pending_stop {
        return ExitClass::Stopped;
    }

    match (report.code, active.mode) {
        (0, _) => ExitClass::Success,
        (PANIC_EXIT_CODE, RunMode::Dev { exit_on_panic: false }) => ExitClass::ToleratedCrash,
        (code, _) => ExitClass::Failure(code),
    }
}
