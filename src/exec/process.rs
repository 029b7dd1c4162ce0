// src/exec/process.rs

//! `tokio::process` backed spawner.

use std::collections::HashMap;
use std::process::{ExitStatus, Stdio};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{anyhow, Context};
use tokio::process::{Child, Command};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::exec::spawner::{
    CommandSpec, ExitReport, ExitSender, Pid, ProcessSpawner, SIGNALED_EXIT_CODE,
};

type InterruptMap = HashMap<Pid, oneshot::Sender<()>>;

/// Real spawner used in production.
///
/// Each child is supervised by its own Tokio task which waits for either the
/// natural exit or an interrupt request, and then reports the exit code.
#[derive(Debug, Clone, Default)]
pub struct TokioSpawner {
    interrupts: Arc<Mutex<InterruptMap>>,
}

impl TokioSpawner {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProcessSpawner for TokioSpawner {
    fn spawn(&mut self, spec: &CommandSpec, on_exit: ExitSender) -> Result<Pid> {
        info!(command = %spec, cwd = %spec.cwd.display(), "running command");

        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .current_dir(&spec.cwd)
            .envs(spec.env.iter())
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd
            .spawn()
            .with_context(|| format!("spawning \"{spec}\""))?;

        let pid = child
            .id()
            .ok_or_else(|| anyhow!("process \"{spec}\" exited before reporting a pid"))?;

        let (interrupt_tx, interrupt_rx) = oneshot::channel::<()>();
        lock(&self.interrupts).insert(pid, interrupt_tx);

        let interrupts = Arc::clone(&self.interrupts);
        let program = spec.program.clone();

        tokio::spawn(async move {
            let code = supervise(child, pid, interrupt_rx).await;
            lock(&interrupts).remove(&pid);

            if code != 0 {
                warn!(command = %program, pid, code, "command failed");
            } else {
                debug!(command = %program, pid, "command exited");
            }

            if on_exit.send(ExitReport { pid, code }).is_err() {
                debug!(pid, "exit report dropped; nobody is listening anymore");
            }
        });

        Ok(pid)
    }

    fn interrupt(&mut self, pid: Pid) -> Result<()> {
        match lock(&self.interrupts).remove(&pid) {
            Some(tx) => {
                if tx.send(()).is_err() {
                    debug!(pid, "process already finished while interrupting");
                }
            }
            None => debug!(pid, "no supervised process with this pid; nothing to interrupt"),
        }
        Ok(())
    }
}

/// Wait for the child, honouring at most one interrupt request.
async fn supervise(mut child: Child, pid: Pid, mut interrupt_rx: oneshot::Receiver<()>) -> i32 {
    tokio::select! {
        status = child.wait() => exit_code(pid, status),

        request = &mut interrupt_rx => {
            if request.is_ok() {
                info!(pid, "interrupting process");
                send_interrupt(&mut child, pid);
            }
            exit_code(pid, child.wait().await)
        }
    }
}

#[cfg(unix)]
fn send_interrupt(child: &mut Child, pid: Pid) {
    let Ok(raw) = libc::pid_t::try_from(pid) else {
        warn!(pid, "pid out of range for kill(2); killing instead");
        let _ = child.start_kill();
        return;
    };

    // SAFETY: kill(2) has no memory-safety preconditions; `raw` is the pid
    // of a child we still own and have not reaped.
    let rc = unsafe { libc::kill(raw, libc::SIGINT) };
    if rc != 0 {
        warn!(
            pid,
            error = %std::io::Error::last_os_error(),
            "failed to send SIGINT; killing instead"
        );
        let _ = child.start_kill();
    }
}

#[cfg(not(unix))]
fn send_interrupt(child: &mut Child, pid: Pid) {
    if let Err(e) = child.start_kill() {
        warn!(pid, error = %e, "failed to kill child process");
    }
}

fn exit_code(pid: Pid, status: std::io::Result<ExitStatus>) -> i32 {
    match status {
        Ok(status) => status.code().unwrap_or(SIGNALED_EXIT_CODE),
        Err(e) => {
            warn!(pid, error = %e, "waiting for process failed");
            SIGNALED_EXIT_CODE
        }
    }
}

fn lock(map: &Mutex<InterruptMap>) -> MutexGuard<'_, InterruptMap> {
    map.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
