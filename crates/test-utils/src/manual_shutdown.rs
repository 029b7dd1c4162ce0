use std::future::Future;
use std::pin::Pin;

use tauri_runner::shutdown::ShutdownSignal;
use tokio::sync::mpsc;

/// Shutdown source driven by the test instead of OS signals.
#[derive(Debug)]
pub struct ManualShutdown {
    rx: mpsc::UnboundedReceiver<()>,
}

/// Requests shutdown on the paired [`ManualShutdown`].
#[derive(Debug, Clone)]
pub struct ShutdownTrigger {
    tx: mpsc::UnboundedSender<()>,
}

pub fn manual_shutdown() -> (ManualShutdown, ShutdownTrigger) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ManualShutdown { rx }, ShutdownTrigger { tx })
}

impl ShutdownTrigger {
    /// Queue one shutdown request. Requests made before the runner polls
    /// the signal are not lost.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }
}

impl ShutdownSignal for ManualShutdown {
    fn requested(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            if self.rx.recv().await.is_none() {
                // Every trigger was dropped; shutdown can never be requested.
                std::future::pending::<()>().await;
            }
        })
    }
}
