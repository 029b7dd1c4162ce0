#![cfg(unix)]

mod common;
use crate::common::{init_tracing, with_timeout, TestResult};

use tokio::sync::mpsc;

use tauri_runner::env::{ChildEnv, TAURI_DIR_VAR};
use tauri_runner::exec::{CommandSpec, ExitReport, ProcessSpawner, TokioSpawner, SIGNALED_EXIT_CODE};

#[tokio::test]
async fn test_exit_code_is_reported_once() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let mut spawner = TokioSpawner::new();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let pid = spawner.spawn(&CommandSpec::shell("exit 3", dir.path()), tx)?;
    let report = with_timeout(rx.recv()).await.ok_or("no exit report")?;

    assert_eq!(report, ExitReport { pid, code: 3 });
    // Sender is dropped after the single report.
    assert!(with_timeout(rx.recv()).await.is_none());
    Ok(())
}

#[tokio::test]
async fn test_child_env_is_passed_through() -> TestResult {
    let dir = tempfile::tempdir()?;
    let mut spawner = TokioSpawner::new();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let mut env = ChildEnv::new();
    env.set(TAURI_DIR_VAR, "/expected/tauri/dir");
    let spec = CommandSpec::shell(r#"test "$TAURI_DIR" = "/expected/tauri/dir""#, dir.path())
        .with_env(env);

    spawner.spawn(&spec, tx)?;
    let report = with_timeout(rx.recv()).await.ok_or("no exit report")?;

    assert_eq!(report.code, 0);
    Ok(())
}

#[tokio::test]
async fn test_interrupt_terminates_and_reports_signal_exit() -> TestResult {
    let dir = tempfile::tempdir()?;
    let mut spawner = TokioSpawner::new();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let pid = spawner.spawn(&CommandSpec::new("sleep", ["30"], dir.path()), tx)?;

    spawner.interrupt(pid)?;
    let report = with_timeout(rx.recv()).await.ok_or("no exit report")?;

    assert_eq!(report, ExitReport { pid, code: SIGNALED_EXIT_CODE });
    // Interrupting again after the exit is a no-op.
    spawner.interrupt(pid)?;
    Ok(())
}

#[tokio::test]
async fn test_interrupting_unknown_pid_is_a_noop() -> TestResult {
    let mut spawner = TokioSpawner::new();
    spawner.interrupt(4_000_000)?;
    Ok(())
}

#[tokio::test]
async fn test_missing_program_fails_to_spawn() -> TestResult {
    let dir = tempfile::tempdir()?;
    let mut spawner = TokioSpawner::new();
    let (tx, _rx) = mpsc::unbounded_channel();

    let result = spawner.spawn(
        &CommandSpec::new("definitely-not-a-real-program-xyz", Vec::<String>::new(), dir.path()),
        tx,
    );

    assert!(result.is_err());
    Ok(())
}
