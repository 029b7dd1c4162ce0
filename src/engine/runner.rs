// src/engine/runner.rs

use std::fmt;
use std::sync::Arc;

use anyhow::anyhow;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::config::ResolvedConfig;
use crate::engine::args::{build_args, dev_args, split_targets, COMPILER_PROGRAM};
use crate::engine::assets::{join_assets, resolve_index};
use crate::engine::classify::{classify, ExitClass};
use crate::engine::{ActiveChild, ChildExit, RunMode};
use crate::entry::{EntryGenerator, TemplateEntryGenerator};
use crate::env::INLINED_ASSETS_VAR;
use crate::errors::{Result, RunnerError};
use crate::exec::{CommandSpec, ExitReceiver, ExitReport, ExitSender, Pid, ProcessSpawner};
use crate::fs::FileSystem;

/// A `beforeDevCommand` / `beforeBuildCommand` child.
#[derive(Debug, Clone, PartialEq, Eq)]
struct HookChild {
    pid: Pid,
    command: String,
}

/// Mutable orchestration state, one per CLI invocation.
#[derive(Debug, Default)]
pub struct RunnerState {
    active: Option<ActiveChild>,
    dev_path: Option<String>,
    ran_before_dev_command: bool,
    pending_stop: bool,
    generation: u64,
    /// Detached `beforeDevCommand`, until its exit is observed.
    dev_hook: Option<HookChild>,
    /// `beforeBuildCommand` while it is being awaited.
    build_hook: Option<HookChild>,
}

impl RunnerState {
    /// Pid of the tracked compiler child, if any.
    pub fn pid(&self) -> Option<Pid> {
        self.active.map(|a| a.pid)
    }

    pub fn active(&self) -> Option<ActiveChild> {
        self.active
    }

    /// Dev path of the current (or most recent) dev child.
    pub fn dev_path(&self) -> Option<&str> {
        self.dev_path.as_deref()
    }

    pub fn ran_before_dev_command(&self) -> bool {
        self.ran_before_dev_command
    }

    pub fn pending_stop(&self) -> bool {
        self.pending_stop
    }

    /// `true` until the exit of the detached `beforeDevCommand` is observed.
    pub fn dev_hook_pending(&self) -> bool {
        self.dev_hook.is_some()
    }

    /// Number of compiler processes spawned so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

enum WaitEvent {
    Compiler(ExitReport),
    Hook(ExitReport),
}

/// Owns at most one compiler child and drives `dev` / `build` workflows.
///
/// All state changes happen on the task that owns the runner; exit reports
/// and shutdown requests are observed only when one of its async operations
/// is being polled, so there is no locking.
pub struct Runner<P: ProcessSpawner> {
    spawner: P,
    fs: Arc<dyn FileSystem>,
    generator: Arc<dyn EntryGenerator>,
    state: RunnerState,
    exit_tx: ExitSender,
    exit_rx: ExitReceiver,
    hook_tx: ExitSender,
    hook_rx: ExitReceiver,
}

impl<P: ProcessSpawner> fmt::Debug for Runner<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runner")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<P: ProcessSpawner> Runner<P> {
    pub fn new(spawner: P, fs: Arc<dyn FileSystem>) -> Self {
        let generator: Arc<dyn EntryGenerator> =
            Arc::new(TemplateEntryGenerator::new(Arc::clone(&fs)));
        let (exit_tx, exit_rx) = mpsc::unbounded_channel();
        let (hook_tx, hook_rx) = mpsc::unbounded_channel();

        Self {
            spawner,
            fs,
            generator,
            state: RunnerState::default(),
            exit_tx,
            exit_rx,
            hook_tx,
            hook_rx,
        }
    }

    /// Replace the integration-code generator.
    pub fn with_entry_generator(mut self, generator: Arc<dyn EntryGenerator>) -> Self {
        self.generator = generator;
        self
    }

    pub fn state(&self) -> &RunnerState {
        &self.state
    }

    /// `true` while a compiler child is tracked.
    pub fn is_running(&self) -> bool {
        self.state.active.is_some()
    }

    /// `true` while [`Runner::wait`] has something to wait for: the compiler
    /// child or the detached `beforeDevCommand`.
    pub fn is_busy(&self) -> bool {
        self.state.active.is_some() || self.state.dev_hook.is_some()
    }

    /// Start (or restart) the dev app.
    ///
    /// Returns as soon as the compiler child is spawned; use [`Runner::wait`]
    /// to observe how it ends. A running child is always stopped first.
    pub async fn run(&mut self, resolved: &ResolvedConfig) -> Result<Pid> {
        let cfg = &resolved.config;
        let dev_path = cfg.build.dev_path.clone();

        if let Some(active) = self.state.active {
            if self.state.dev_path.as_deref() != Some(dev_path.as_str()) {
                info!(pid = active.pid, dev_path = %dev_path, "dev path changed; stopping the running app");
            } else {
                info!(pid = active.pid, "restarting the running app");
            }
            self.stop().await?;
        }

        if !self.state.ran_before_dev_command {
            if let Some(command) = cfg.build.before_dev_command.as_deref() {
                self.state.ran_before_dev_command = true;
                info!(command, "running beforeDevCommand");
                let spec = CommandSpec::shell(command, resolved.paths.app_dir())
                    .with_env(resolved.env.clone());
                let pid = self.spawner.spawn(&spec, self.hook_tx.clone())?;
                self.state.dev_hook = Some(HookChild {
                    pid,
                    command: command.to_string(),
                });
            }
        }

        self.generator.generate(resolved.paths.tauri_dir(), cfg)?;

        let mut env = resolved.env.clone();
        env.set(INLINED_ASSETS_VAR, "");

        self.state.dev_path = Some(dev_path);

        let spec = CommandSpec::new(COMPILER_PROGRAM, dev_args(), resolved.paths.tauri_dir())
            .with_env(env);
        self.spawn_compiler(
            &spec,
            RunMode::Dev {
                exit_on_panic: cfg.ctx.exit_on_panic(),
            },
        )
    }

    /// Build (and optionally bundle) once per requested target, serially.
    ///
    /// The first failing target aborts the remaining ones.
    pub async fn build(&mut self, resolved: &ResolvedConfig) -> Result<()> {
        let cfg = &resolved.config;
        let tauri_dir = resolved.paths.tauri_dir();

        if self.state.active.is_some() {
            self.stop().await?;
        }

        if let Some(command) = cfg.build.before_build_command.as_deref() {
            self.run_hook(command, resolved).await?;
        }

        self.generator.generate(tauri_dir, cfg)?;

        let index = resolve_index(
            self.fs.as_ref(),
            cfg.build.dist_dir_path(),
            cfg.tauri.inliner.active,
        )?;
        let mut env = resolved.env.clone();
        env.set(INLINED_ASSETS_VAR, join_assets(&index.inlined_assets));

        for target in split_targets(cfg.ctx.target.as_deref()) {
            let spec = CommandSpec::new(
                COMPILER_PROGRAM,
                build_args(cfg, target.as_deref()),
                tauri_dir,
            )
            .with_env(env.clone());

            info!(target = target.as_deref().unwrap_or("host"), "starting build");
            self.spawn_compiler(&spec, RunMode::Build)?;

            match self.wait().await? {
                ChildExit::Success | ChildExit::ToleratedCrash => {}
                ChildExit::Stopped | ChildExit::Idle => {
                    info!("build stopped before completion");
                    return Ok(());
                }
            }
        }

        Ok(())
    }

    /// Wait for the tracked child to exit and classify the exit.
    ///
    /// Stale reports from superseded children are skipped. A failing
    /// `beforeDevCommand` surfaces here as [`RunnerError::PreludeCommand`],
    /// also when no compiler child is tracked: with only the hook pending,
    /// this returns [`ChildExit::Idle`] once the hook exits cleanly.
    pub async fn wait(&mut self) -> Result<ChildExit> {
        loop {
            if !self.is_busy() {
                return Ok(ChildExit::Idle);
            }

            let event = tokio::select! {
                Some(report) = self.exit_rx.recv() => WaitEvent::Compiler(report),
                Some(report) = self.hook_rx.recv() => WaitEvent::Hook(report),
                else => return Err(anyhow!("exit report channels closed").into()),
            };

            match event {
                WaitEvent::Compiler(report) => {
                    if let Some(outcome) = self.settle(report) {
                        return outcome;
                    }
                }
                WaitEvent::Hook(report) => self.settle_hook(report)?,
            }
        }
    }

    /// Gracefully stop the tracked child, if any.
    ///
    /// Resolves once the child has actually exited. Calling this while a
    /// previous stop is still outstanding does not signal again; it only
    /// waits for the same exit.
    pub async fn stop(&mut self) -> Result<()> {
        let Some(active) = self.state.active else {
            debug!("no running process; nothing to stop");
            return Ok(());
        };

        if self.state.pending_stop {
            debug!(pid = active.pid, "stop already pending; waiting for exit");
        } else {
            info!(pid = active.pid, "Shutting down tauri process...");
            self.state.pending_stop = true;
            if let Err(e) = self.spawner.interrupt(active.pid) {
                self.state.pending_stop = false;
                return Err(e);
            }
        }

        while let Some(report) = self.exit_rx.recv().await {
            if let Some(outcome) = self.settle(report) {
                return outcome.map(|_| ());
            }
        }

        Err(anyhow!("exit report channel closed while stopping pid {}", active.pid).into())
    }

    /// Ask any hook child still running to terminate, without waiting.
    ///
    /// Their exits are no longer observed afterwards.
    pub fn interrupt_hooks(&mut self) -> Result<()> {
        let hooks = [self.state.build_hook.take(), self.state.dev_hook.take()];
        for hook in hooks.into_iter().flatten() {
            info!(pid = hook.pid, command = %hook.command, "interrupting hook command");
            self.spawner.interrupt(hook.pid)?;
        }
        Ok(())
    }

    fn spawn_compiler(&mut self, spec: &CommandSpec, mode: RunMode) -> Result<Pid> {
        let pid = self.spawner.spawn(spec, self.exit_tx.clone())?;

        self.state.generation += 1;
        self.state.active = Some(ActiveChild {
            pid,
            generation: self.state.generation,
            mode,
        });
        self.state.pending_stop = false;

        debug!(pid, generation = self.state.generation, ?mode, "tracking compiler process");
        Ok(pid)
    }

    /// Apply one compiler exit report. `None` means the report was stale.
    fn settle(&mut self, report: ExitReport) -> Option<Result<ChildExit>> {
        let class = classify(report, self.state.active, self.state.pending_stop);
        if class.ends_child() {
            self.state.active = None;
            self.state.pending_stop = false;
        }

        match class {
            ExitClass::Stale => {
                debug!(
                    pid = report.pid,
                    code = report.code,
                    "ignoring exit report from a superseded process"
                );
                None
            }
            ExitClass::Stopped => {
                info!(pid = report.pid, "process stopped");
                Some(Ok(ChildExit::Stopped))
            }
            ExitClass::Success => {
                debug!(pid = report.pid, "process exited successfully");
                Some(Ok(ChildExit::Success))
            }
            ExitClass::ToleratedCrash => {
                warn!(
                    pid = report.pid,
                    code = report.code,
                    "app panicked; not exiting because exitOnPanic is false"
                );
                Some(Ok(ChildExit::ToleratedCrash))
            }
            ExitClass::Failure(code) => {
                error!(pid = report.pid, code, "[FAIL] Cargo CLI has failed");
                Some(Err(RunnerError::CompilerFailure { code }))
            }
        }
    }

    fn settle_hook(&mut self, report: ExitReport) -> Result<()> {
        match self.state.dev_hook.take() {
            Some(hook) if hook.pid == report.pid => {
                if report.code != 0 {
                    error!(command = %hook.command, code = report.code, "beforeDevCommand failed");
                    return Err(RunnerError::PreludeCommand {
                        command: hook.command,
                        code: report.code,
                    });
                }
                debug!(command = %hook.command, "beforeDevCommand exited");
                Ok(())
            }
            other => {
                self.state.dev_hook = other;
                debug!(pid = report.pid, "ignoring exit report from an unknown hook");
                Ok(())
            }
        }
    }

    /// Run a hook to completion (used for `beforeBuildCommand`).
    async fn run_hook(&mut self, command: &str, resolved: &ResolvedConfig) -> Result<()> {
        info!(command, "running beforeBuildCommand");

        let (tx, mut rx) = mpsc::unbounded_channel();
        let spec = CommandSpec::shell(command, resolved.paths.app_dir())
            .with_env(resolved.env.clone());
        let pid = self.spawner.spawn(&spec, tx)?;
        // Stays set if this future is dropped, so cleanup can interrupt it.
        self.state.build_hook = Some(HookChild {
            pid,
            command: command.to_string(),
        });

        let report = rx.recv().await;
        self.state.build_hook = None;
        let report = report
            .ok_or_else(|| anyhow!("`{command}` (pid {pid}) ended without reporting an exit code"))?;

        if report.code != 0 {
            error!(command, code = report.code, "beforeBuildCommand failed");
            return Err(RunnerError::PreludeCommand {
                command: command.to_string(),
                code: report.code,
            });
        }

        debug!(command, "beforeBuildCommand finished");
        Ok(())
    }
}
