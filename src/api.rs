// src/api.rs

//! Programmatic entry points behind the `build` and `dev` subcommands.
//!
//! The `*_session` functions are generic over the spawner and the shutdown
//! source so integration tests can drive them with fakes. [`build`] and
//! [`dev`] wire in the real filesystem, `TokioSpawner` and OS signals.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::config::{resolve_config, AppPaths, ConfigOverride, ConfigResolver, ResolvedConfig};
use crate::engine::{ChildExit, Runner};
use crate::errors::{Result, RunnerError};
use crate::exec::{ProcessSpawner, TokioSpawner};
use crate::fs::{FileSystem, RealFileSystem};
use crate::shutdown::{cleanup, until_shutdown, Guarded, OsShutdownSignal, ShutdownSignal};
use crate::watch::spawn_config_watcher;

/// How a session ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The workflow ran to completion (build done, or the dev app closed).
    Completed,
    /// Shutdown was requested; the active child was stopped first.
    Interrupted,
}

enum DevEvent {
    Exited(Result<ChildExit>),
    Reload(PathBuf),
    Shutdown,
}

/// Run one build, stopping the child cleanly if shutdown is requested.
pub async fn build_session<P, S>(
    runner: &mut Runner<P>,
    shutdown: &mut S,
    resolved: &ResolvedConfig,
) -> Result<SessionEnd>
where
    P: ProcessSpawner,
    S: ShutdownSignal + ?Sized,
{
    match until_shutdown(shutdown, runner.build(resolved)).await {
        Guarded::Completed(result) => {
            result?;
            info!("build finished");
            Ok(SessionEnd::Completed)
        }
        Guarded::ShutdownRequested => {
            cleanup(runner).await?;
            Ok(SessionEnd::Interrupted)
        }
    }
}

/// Run the dev app until it exits, fails, or shutdown is requested.
///
/// `resolve` is called once up front and again for every reload request
/// received on `reloads`. A reload restarts the app with the fresh config.
pub async fn dev_session<P, S, F>(
    runner: &mut Runner<P>,
    shutdown: &mut S,
    mut resolve: F,
    mut reloads: Option<mpsc::UnboundedReceiver<PathBuf>>,
) -> Result<SessionEnd>
where
    P: ProcessSpawner,
    S: ShutdownSignal + ?Sized,
    F: FnMut() -> Result<ResolvedConfig>,
{
    let resolved = resolve()?;
    if let Some(end) = start_dev(runner, shutdown, &resolved).await? {
        return Ok(end);
    }

    loop {
        let busy = runner.is_busy();
        let event = tokio::select! {
            exit = runner.wait(), if busy => DevEvent::Exited(exit),
            Some(path) = next_reload(&mut reloads) => DevEvent::Reload(path),
            _ = shutdown.requested() => DevEvent::Shutdown,
        };

        match event {
            DevEvent::Exited(Ok(ChildExit::Success)) => {
                info!("Cargo process was killed. Exiting...");
                runner.interrupt_hooks()?;
                return Ok(SessionEnd::Completed);
            }
            DevEvent::Exited(Ok(ChildExit::ToleratedCrash)) => {
                info!("app crashed; waiting for a config change or shutdown");
            }
            DevEvent::Exited(Ok(exit)) => {
                debug!(?exit, "dev child ended");
            }
            DevEvent::Exited(Err(e)) => return Err(e),
            DevEvent::Reload(path) => {
                info!(path = %path.display(), "config changed; restarting app");
                let resolved = resolve()?;
                if let Some(end) = start_dev(runner, shutdown, &resolved).await? {
                    return Ok(end);
                }
            }
            DevEvent::Shutdown => {
                cleanup(runner).await?;
                return Ok(SessionEnd::Interrupted);
            }
        }
    }
}

/// `run()` guarded by shutdown. `Some` means the session is over.
async fn start_dev<P, S>(
    runner: &mut Runner<P>,
    shutdown: &mut S,
    resolved: &ResolvedConfig,
) -> Result<Option<SessionEnd>>
where
    P: ProcessSpawner,
    S: ShutdownSignal + ?Sized,
{
    match until_shutdown(shutdown, runner.run(resolved)).await {
        Guarded::Completed(pid) => {
            let pid = pid?;
            info!(pid, dev_path = %resolved.config.build.dev_path, "app started");
            Ok(None)
        }
        Guarded::ShutdownRequested => {
            cleanup(runner).await?;
            Ok(Some(SessionEnd::Interrupted))
        }
    }
}

async fn next_reload(reloads: &mut Option<mpsc::UnboundedReceiver<PathBuf>>) -> Option<PathBuf> {
    match reloads {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

/// `tauri-runner build`: resolve the config from the current directory and
/// build every requested target.
///
/// `ctx.prod` defaults to `true` unless the caller set it.
pub async fn build(mut overrides: ConfigOverride) -> Result<SessionEnd> {
    let mut shutdown = OsShutdownSignal::install()?;
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let cwd = std::env::current_dir()?;

    overrides.ctx.prod.get_or_insert(true);
    let resolved = resolve_config(fs.as_ref(), &cwd, &overrides)?;

    let mut runner = Runner::new(TokioSpawner::new(), Arc::clone(&fs));
    build_session(&mut runner, &mut shutdown, &resolved).await
}

/// `tauri-runner dev`: start the app and, when `watch` is set, restart it
/// whenever the tooling config changes.
pub async fn dev(overrides: ConfigOverride, watch: bool) -> Result<SessionEnd> {
    let mut shutdown = OsShutdownSignal::install()?;
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let cwd = std::env::current_dir()?;
    let paths = AppPaths::discover(fs.as_ref(), &cwd)?;

    let (_watcher, reloads) = if watch {
        let (handle, rx) = spawn_config_watcher(paths.tooling_config_path())
            .map_err(RunnerError::Other)?;
        (Some(handle), Some(rx))
    } else {
        (None, None)
    };

    let resolver = ConfigResolver::new(fs.as_ref(), paths);
    let mut runner = Runner::new(TokioSpawner::new(), Arc::clone(&fs));
    dev_session(
        &mut runner,
        &mut shutdown,
        || resolver.resolve(&overrides),
        reloads,
    )
    .await
}
