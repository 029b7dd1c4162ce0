// src/watch/watcher.rs

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Result};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Quiet period after the last change before a reload is requested.
pub const DEBOUNCE: Duration = Duration::from_millis(200);

/// Handle for the config watcher.
///
/// Keeps the underlying `RecommendedWatcher` alive. Dropping this handle
/// stops watching and eventually closes the reload channel.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Watch `config_path` and send its path on the returned channel each time
/// it changes (debounced).
///
/// The parent directory is watched non-recursively so that editors which
/// replace the file via rename are still observed.
pub fn spawn_config_watcher(
    config_path: impl Into<PathBuf>,
) -> Result<(WatcherHandle, mpsc::UnboundedReceiver<PathBuf>)> {
    let config_path = config_path.into();
    let config_path = config_path.canonicalize().unwrap_or(config_path);

    let dir = config_path
        .parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| anyhow!("config path {:?} has no parent directory", config_path))?;
    let file_name: OsString = config_path
        .file_name()
        .map(ToOwned::to_owned)
        .ok_or_else(|| anyhow!("config path {:?} has no file name", config_path))?;

    // Channel from the blocking notify callback into the async world.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();
    let (reload_tx, reload_rx) = mpsc::unbounded_channel::<PathBuf>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if let Err(err) = event_tx.send(event) {
                    eprintln!("tauri-runner: failed to forward notify event: {err}");
                }
            }
            Err(err) => {
                eprintln!("tauri-runner: config watch error: {err}");
            }
        },
        Config::default(),
    )?;

    watcher.watch(&dir, RecursiveMode::NonRecursive)?;
    info!(path = %config_path.display(), "watching config for changes");

    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            if !touches_config(&event, &file_name) {
                continue;
            }
            debug!(?event.kind, "config change detected");

            // Swallow the burst of follow-up events.
            loop {
                match tokio::time::timeout(DEBOUNCE, event_rx.recv()).await {
                    Ok(Some(_)) => continue,
                    Ok(None) => return,
                    Err(_) => break,
                }
            }

            if reload_tx.send(config_path.clone()).is_err() {
                warn!("reload receiver dropped; stopping config watcher");
                return;
            }
        }
        debug!("config watcher event loop finished");
    });

    Ok((WatcherHandle { _inner: watcher }, reload_rx))
}

fn touches_config(event: &Event, file_name: &OsString) -> bool {
    let relevant_kind = matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Any
    );
    relevant_kind
        && event
            .paths
            .iter()
            .any(|p| p.file_name() == Some(file_name.as_os_str()))
}
