// src/shutdown.rs

//! OS shutdown signals and guarded execution.
//!
//! - [`ShutdownSignal`] is the injected subscription: "resolve when shutdown
//!   is requested". The OS implementation listens for SIGINT, SIGTERM and
//!   SIGHUP (Ctrl+C elsewhere); tests use a manually triggered one.
//! - [`until_shutdown`] races an operation against the signal.
//! - [`cleanup`] is the single cleanup hook: stop the active child, wait
//!   for it to exit, then interrupt any hook command still running.
//!
//! The signal is not polled while cleanup runs, so additional signals
//! arriving during cleanup do not start a second one.

use std::future::Future;
use std::pin::Pin;

use anyhow::Context;
use tracing::{debug, info};

use crate::engine::Runner;
use crate::errors::Result;
use crate::exec::ProcessSpawner;

/// Source of shutdown requests.
pub trait ShutdownSignal: Send {
    /// Resolves the next time shutdown is requested.
    fn requested(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;
}

/// Listens for real OS termination signals.
#[derive(Debug)]
pub struct OsShutdownSignal {
    #[cfg(unix)]
    interrupt: tokio::signal::unix::Signal,
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
    #[cfg(unix)]
    hangup: tokio::signal::unix::Signal,
}

impl OsShutdownSignal {
    /// Register the signal handlers.
    ///
    /// Call this before spawning any child so a signal arriving during
    /// startup is not lost.
    #[cfg(unix)]
    pub fn install() -> Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        let interrupt = signal(SignalKind::interrupt()).context("installing SIGINT handler")?;
        let terminate = signal(SignalKind::terminate()).context("installing SIGTERM handler")?;
        let hangup = signal(SignalKind::hangup()).context("installing SIGHUP handler")?;
        debug!("shutdown signal handlers installed");

        Ok(Self {
            interrupt,
            terminate,
            hangup,
        })
    }

    #[cfg(not(unix))]
    pub fn install() -> Result<Self> {
        debug!("shutdown signal handler installed (ctrl-c)");
        Ok(Self {})
    }
}

impl ShutdownSignal for OsShutdownSignal {
    #[cfg(unix)]
    fn requested(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            tokio::select! {
                _ = self.interrupt.recv() => info!(signal = "SIGINT", "shutdown requested"),
                _ = self.terminate.recv() => info!(signal = "SIGTERM", "shutdown requested"),
                _ = self.hangup.recv() => info!(signal = "SIGHUP", "shutdown requested"),
            }
        })
    }

    #[cfg(not(unix))]
    fn requested(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!(signal = "ctrl-c", "shutdown requested"),
                Err(e) => {
                    tracing::warn!("failed to listen for Ctrl+C: {e}");
                    std::future::pending::<()>().await;
                }
            }
        })
    }
}

/// Result of racing an operation against shutdown.
#[derive(Debug, PartialEq, Eq)]
pub enum Guarded<T> {
    Completed(T),
    ShutdownRequested,
}

/// Drive `fut` to completion unless shutdown is requested first.
///
/// On shutdown `fut` is dropped before this returns, releasing anything it
/// borrowed (typically the runner) for [`cleanup`].
pub async fn until_shutdown<S, F>(shutdown: &mut S, fut: F) -> Guarded<F::Output>
where
    S: ShutdownSignal + ?Sized,
    F: Future,
{
    tokio::select! {
        out = fut => Guarded::Completed(out),
        _ = shutdown.requested() => Guarded::ShutdownRequested,
    }
}

/// Stop the runner's active child (if any) and wait for it to exit, then
/// interrupt leftover hook commands.
pub async fn cleanup<P: ProcessSpawner>(runner: &mut Runner<P>) -> Result<()> {
    if runner.is_running() {
        runner.stop().await?;
    }
    runner.interrupt_hooks()?;
    info!("cleanup finished");
    Ok(())
}
