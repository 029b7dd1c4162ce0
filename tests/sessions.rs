mod common;
use crate::common::{init_tracing, with_timeout, TestResult};

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::sync::mpsc;

use tauri_runner::api::{build_session, dev_session, SessionEnd};
use tauri_runner::config::{ConfigOverride, Ctx};
use tauri_runner::engine::Runner;
use tauri_runner::errors::RunnerError;
use tauri_runner::exec::SIGNALED_EXIT_CODE;
use tauri_runner::fs::RealFileSystem;
use tauri_runner::shutdown::{cleanup, until_shutdown, Guarded};
use tauri_runner_test_utils::{
    default_tooling_config, manual_shutdown, FakeSpawner, ProjectFixture, ShutdownTrigger,
    FIRST_PID,
};

fn runner_for(spawner: &FakeSpawner) -> Runner<FakeSpawner> {
    Runner::new(spawner.clone(), Arc::new(RealFileSystem))
}

/// Default project with one `build` key set.
fn project_with_build_key(key: &str, value: &str) -> Result<ProjectFixture, Box<dyn std::error::Error>> {
    let mut config = default_tooling_config();
    config["build"][key] = json!(value);
    Ok(ProjectFixture::with_tooling_config(&config)?)
}

/// Request shutdown after `delay`, from another task.
fn trigger_after(trigger: ShutdownTrigger, delay: Duration) {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        trigger.trigger();
    });
}

#[tokio::test]
async fn test_until_shutdown_passes_through_completed_work() {
    let (mut shutdown, _trigger) = manual_shutdown();

    let out = with_timeout(until_shutdown(&mut shutdown, async { 7 })).await;

    assert_eq!(out, Guarded::Completed(7));
}

#[tokio::test]
async fn test_until_shutdown_interrupts_pending_work() {
    let (mut shutdown, trigger) = manual_shutdown();
    trigger.trigger();

    let out = with_timeout(until_shutdown(&mut shutdown, std::future::pending::<()>())).await;

    assert_eq!(out, Guarded::ShutdownRequested);
}

#[tokio::test]
async fn test_cleanup_without_child_does_nothing() -> TestResult {
    let spawner = FakeSpawner::new();
    let mut runner = runner_for(&spawner);

    with_timeout(cleanup(&mut runner)).await?;

    assert!(spawner.interrupts().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_shutdown_during_build_stops_the_compiler() -> TestResult {
    init_tracing();
    let project = ProjectFixture::new()?;
    let resolved = project.resolve(&ConfigOverride::default())?;

    let spawner = FakeSpawner::new();
    spawner.script_running();
    let mut runner = runner_for(&spawner);
    let (mut shutdown, trigger) = manual_shutdown();
    trigger_after(trigger, Duration::from_millis(50));

    let end = with_timeout(build_session(&mut runner, &mut shutdown, &resolved)).await?;

    assert_eq!(end, SessionEnd::Interrupted);
    let cargo = spawner.spawns_of("cargo");
    assert_eq!(cargo.len(), 1);
    assert_eq!(spawner.interrupts(), [cargo[0].pid]);
    assert!(spawner.running().is_empty());
    assert!(!runner.is_running());
    Ok(())
}

#[tokio::test]
async fn test_build_session_completes() -> TestResult {
    let project = ProjectFixture::new()?;
    let resolved = project.resolve(&ConfigOverride::default())?;

    let spawner = FakeSpawner::new();
    spawner.script_exit(0);
    let mut runner = runner_for(&spawner);
    let (mut shutdown, _trigger) = manual_shutdown();

    let end = with_timeout(build_session(&mut runner, &mut shutdown, &resolved)).await?;

    assert_eq!(end, SessionEnd::Completed);
    assert!(spawner.interrupts().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_dev_session_ends_when_app_exits_cleanly() -> TestResult {
    let project = ProjectFixture::new()?;

    let spawner = FakeSpawner::new();
    spawner.script_exit(0);
    let mut runner = runner_for(&spawner);
    let (mut shutdown, _trigger) = manual_shutdown();

    let end = with_timeout(dev_session(
        &mut runner,
        &mut shutdown,
        || project.resolve(&ConfigOverride::default()),
        None,
    ))
    .await?;

    assert_eq!(end, SessionEnd::Completed);
    Ok(())
}

#[tokio::test]
async fn test_dev_session_propagates_compiler_failure() -> TestResult {
    let project = ProjectFixture::new()?;

    let spawner = FakeSpawner::new();
    spawner.script_exit(1);
    let mut runner = runner_for(&spawner);
    let (mut shutdown, _trigger) = manual_shutdown();

    let result = with_timeout(dev_session(
        &mut runner,
        &mut shutdown,
        || project.resolve(&ConfigOverride::default()),
        None,
    ))
    .await;

    assert!(matches!(result, Err(RunnerError::CompilerFailure { code: 1 })));
    Ok(())
}

#[tokio::test]
async fn test_dev_session_shutdown_stops_running_app() -> TestResult {
    let project = ProjectFixture::new()?;

    let spawner = FakeSpawner::new();
    let mut runner = runner_for(&spawner);
    let (mut shutdown, trigger) = manual_shutdown();
    trigger_after(trigger, Duration::from_millis(50));

    let end = with_timeout(dev_session(
        &mut runner,
        &mut shutdown,
        || project.resolve(&ConfigOverride::default()),
        None,
    ))
    .await?;

    assert_eq!(end, SessionEnd::Interrupted);
    assert_eq!(spawner.interrupts().len(), 1);
    assert!(spawner.running().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_dev_session_survives_tolerated_panic() -> TestResult {
    let project = ProjectFixture::new()?;
    let overrides = ConfigOverride::with_ctx(Ctx {
        exit_on_panic: Some(false),
        ..Ctx::default()
    });

    let spawner = FakeSpawner::new();
    spawner.script_exit(101);
    let mut runner = runner_for(&spawner);
    let (mut shutdown, trigger) = manual_shutdown();
    trigger_after(trigger, Duration::from_millis(50));

    let end = with_timeout(dev_session(
        &mut runner,
        &mut shutdown,
        || project.resolve(&overrides),
        None,
    ))
    .await?;

    // Still alive until shutdown; nothing left to stop by then.
    assert_eq!(end, SessionEnd::Interrupted);
    assert!(spawner.interrupts().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_dev_session_reload_restarts_app() -> TestResult {
    let project = ProjectFixture::new()?;

    let spawner = FakeSpawner::new();
    let mut runner = runner_for(&spawner);
    let (mut shutdown, trigger) = manual_shutdown();
    let (reload_tx, reload_rx) = mpsc::unbounded_channel::<PathBuf>();

    reload_tx.send(project.tooling_config_path())?;
    trigger_after(trigger, Duration::from_millis(100));

    let end = with_timeout(dev_session(
        &mut runner,
        &mut shutdown,
        || project.resolve(&ConfigOverride::default()),
        Some(reload_rx),
    ))
    .await?;

    assert_eq!(end, SessionEnd::Interrupted);
    let cargo: Vec<_> = spawner.spawns_of("cargo").iter().map(|s| s.pid).collect();
    assert_eq!(cargo.len(), 2);
    assert_eq!(spawner.interrupts(), cargo);
    Ok(())
}

#[tokio::test]
async fn test_dev_session_reload_with_broken_config_is_fatal() -> TestResult {
    let project = ProjectFixture::new()?;

    let spawner = FakeSpawner::new();
    let mut runner = runner_for(&spawner);
    let (mut shutdown, _trigger) = manual_shutdown();
    let (reload_tx, reload_rx) = mpsc::unbounded_channel::<PathBuf>();

    let mut calls = 0;
    let result = {
        let resolve = || {
            calls += 1;
            if calls == 1 {
                project.resolve(&ConfigOverride::default())
            } else {
                Err(RunnerError::config("broken"))
            }
        };
        reload_tx.send(project.tooling_config_path())?;
        with_timeout(dev_session(&mut runner, &mut shutdown, resolve, Some(reload_rx))).await
    };

    assert!(matches!(result, Err(RunnerError::Config(_))));
    assert_eq!(calls, 2);
    Ok(())
}

#[tokio::test]
async fn test_dev_session_fails_when_before_dev_command_fails_after_tolerated_panic() -> TestResult {
    init_tracing();
    let project = project_with_build_key("beforeDevCommand", "npm run dev")?;
    let overrides = ConfigOverride::with_ctx(Ctx {
        exit_on_panic: Some(false),
        ..Ctx::default()
    });

    let spawner = FakeSpawner::new();
    spawner.script_running().script_exit(101);
    let hook_pid = FIRST_PID;
    let mut runner = runner_for(&spawner);
    let (mut shutdown, trigger) = manual_shutdown();

    let handle = spawner.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.finish(hook_pid, 1);
    });
    trigger_after(trigger, Duration::from_millis(300));

    let result = with_timeout(dev_session(
        &mut runner,
        &mut shutdown,
        || project.resolve(&overrides),
        None,
    ))
    .await;

    match result {
        Err(RunnerError::PreludeCommand { command, code }) => {
            assert_eq!(command, "npm run dev");
            assert_eq!(code, 1);
        }
        other => panic!("expected PreludeCommand error, got {other:?}"),
    }
    assert!(spawner.interrupts().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_dev_session_ignores_repeated_shutdown_during_cleanup() -> TestResult {
    init_tracing();
    let project = ProjectFixture::new()?;

    let spawner = FakeSpawner::new();
    spawner.set_exit_on_interrupt(false);
    let mut runner = runner_for(&spawner);
    let (mut shutdown, trigger) = manual_shutdown();

    let handle = spawner.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        for _ in 0..3 {
            trigger.trigger();
        }
        // Cleanup is now waiting on the interrupted child.
        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.finish(FIRST_PID, SIGNALED_EXIT_CODE);
    });

    let end = with_timeout(dev_session(
        &mut runner,
        &mut shutdown,
        || project.resolve(&ConfigOverride::default()),
        None,
    ))
    .await?;

    assert_eq!(end, SessionEnd::Interrupted);
    assert_eq!(spawner.interrupts(), [FIRST_PID]);
    assert!(spawner.running().is_empty());
    assert!(!runner.is_running());
    Ok(())
}

#[tokio::test]
async fn test_shutdown_during_before_build_command_interrupts_it() -> TestResult {
    init_tracing();
    let project = project_with_build_key("beforeBuildCommand", "npm run build")?;
    let resolved = project.resolve(&ConfigOverride::default())?;

    let spawner = FakeSpawner::new();
    spawner.script_running();
    let mut runner = runner_for(&spawner);
    let (mut shutdown, trigger) = manual_shutdown();
    trigger_after(trigger, Duration::from_millis(50));

    let end = with_timeout(build_session(&mut runner, &mut shutdown, &resolved)).await?;

    assert_eq!(end, SessionEnd::Interrupted);
    assert!(spawner.spawns_of("cargo").is_empty());
    assert_eq!(spawner.interrupts(), [FIRST_PID]);
    assert!(spawner.running().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_dev_session_shutdown_interrupts_before_dev_command() -> TestResult {
    let project = project_with_build_key("beforeDevCommand", "npm run dev")?;

    let spawner = FakeSpawner::new();
    let mut runner = runner_for(&spawner);
    let (mut shutdown, trigger) = manual_shutdown();
    trigger_after(trigger, Duration::from_millis(50));

    let end = with_timeout(dev_session(
        &mut runner,
        &mut shutdown,
        || project.resolve(&ConfigOverride::default()),
        None,
    ))
    .await?;

    assert_eq!(end, SessionEnd::Interrupted);
    let hook_pid = FIRST_PID;
    let cargo = spawner.spawns_of("cargo");
    assert_eq!(cargo.len(), 1);
    // Compiler first, then the hook.
    assert_eq!(spawner.interrupts(), [cargo[0].pid, hook_pid]);
    assert!(spawner.running().is_empty());
    assert!(!runner.state().dev_hook_pending());
    Ok(())
}
