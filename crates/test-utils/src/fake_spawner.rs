use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use tauri_runner::errors::{Result, RunnerError};
use tauri_runner::exec::{
    CommandSpec, ExitReport, ExitSender, Pid, ProcessSpawner, SIGNALED_EXIT_CODE,
};

/// First pid handed out by a fresh [`FakeSpawner`].
pub const FIRST_PID: Pid = 1000;

/// One recorded `spawn` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnRecord {
    pub pid: Pid,
    pub spec: CommandSpec,
}

#[derive(Debug)]
struct Inner {
    next_pid: Pid,
    spawns: Vec<SpawnRecord>,
    interrupts: Vec<Pid>,
    live: HashMap<Pid, ExitSender>,
    /// Per-spawn behaviour in spawn order: `Some(code)` exits immediately,
    /// `None` keeps running until finished or interrupted.
    script: VecDeque<Option<i32>>,
    exit_on_interrupt: bool,
    fail_spawns: bool,
}

/// A fake spawner that:
/// - records every spawn and interrupt
/// - exits scripted children right away with the scripted code
/// - keeps unscripted children "running" until `finish` or `interrupt`
///
/// Clones share state, so a test keeps one handle while the runner owns the
/// other.
#[derive(Debug, Clone)]
pub struct FakeSpawner {
    inner: Arc<Mutex<Inner>>,
}

impl Default for FakeSpawner {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeSpawner {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                next_pid: FIRST_PID,
                spawns: Vec::new(),
                interrupts: Vec::new(),
                live: HashMap::new(),
                script: VecDeque::new(),
                exit_on_interrupt: true,
                fail_spawns: false,
            })),
        }
    }

    /// The next spawn (in script order) exits immediately with `code`.
    pub fn script_exit(&self, code: i32) -> &Self {
        self.lock().script.push_back(Some(code));
        self
    }

    /// The next spawn keeps running.
    pub fn script_running(&self) -> &Self {
        self.lock().script.push_back(None);
        self
    }

    /// When `false`, interrupted children keep running until `finish`.
    pub fn set_exit_on_interrupt(&self, value: bool) {
        self.lock().exit_on_interrupt = value;
    }

    /// Make every subsequent spawn fail.
    pub fn fail_spawns(&self) {
        self.lock().fail_spawns = true;
    }

    /// Report `pid` as exited with `code`. Returns `false` if `pid` is not
    /// running.
    pub fn finish(&self, pid: Pid, code: i32) -> bool {
        let sender = self.lock().live.remove(&pid);
        match sender {
            Some(tx) => {
                let _ = tx.send(ExitReport { pid, code });
                true
            }
            None => false,
        }
    }

    /// Deliver an exit report for `pid` on the channel of the most recent
    /// spawn, whether or not `pid` is known. Simulates late reports from
    /// superseded children.
    pub fn report_stale(&self, pid: Pid, code: i32) -> bool {
        let guard = self.lock();
        let Some(last) = guard.spawns.last() else {
            return false;
        };
        match guard.live.get(&last.pid) {
            Some(tx) => tx.send(ExitReport { pid, code }).is_ok(),
            None => false,
        }
    }

    pub fn spawns(&self) -> Vec<SpawnRecord> {
        self.lock().spawns.clone()
    }

    /// Spawns whose program is `program`.
    pub fn spawns_of(&self, program: &str) -> Vec<SpawnRecord> {
        self.lock()
            .spawns
            .iter()
            .filter(|s| s.spec.program == program)
            .cloned()
            .collect()
    }

    pub fn interrupts(&self) -> Vec<Pid> {
        self.lock().interrupts.clone()
    }

    /// Pids that have not reported an exit yet.
    pub fn running(&self) -> Vec<Pid> {
        let mut pids: Vec<Pid> = self.lock().live.keys().copied().collect();
        pids.sort_unstable();
        pids
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }
}

impl ProcessSpawner for FakeSpawner {
    fn spawn(&mut self, spec: &CommandSpec, on_exit: ExitSender) -> Result<Pid> {
        let mut guard = self.lock();
        if guard.fail_spawns {
            return Err(RunnerError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("fake spawn failure for {spec}"),
            )));
        }

        let pid = guard.next_pid;
        guard.next_pid += 1;
        guard.spawns.push(SpawnRecord {
            pid,
            spec: spec.clone(),
        });

        match guard.script.pop_front().flatten() {
            Some(code) => {
                let _ = on_exit.send(ExitReport { pid, code });
            }
            None => {
                guard.live.insert(pid, on_exit);
            }
        }

        Ok(pid)
    }

    fn interrupt(&mut self, pid: Pid) -> Result<()> {
        let mut guard = self.lock();
        guard.interrupts.push(pid);
        if guard.exit_on_interrupt {
            if let Some(tx) = guard.live.remove(&pid) {
                let _ = tx.send(ExitReport {
                    pid,
                    code: SIGNALED_EXIT_CODE,
                });
            }
        }
        Ok(())
    }
}
