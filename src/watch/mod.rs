// src/watch/mod.rs

//! Dev-mode config watching.
//!
//! While `dev` runs, changes to the tooling config document are turned into
//! reload requests. The watcher knows nothing about the runner; it only
//! forwards "this file changed" notifications.

pub mod watcher;

pub use watcher::{spawn_config_watcher, WatcherHandle, DEBOUNCE};
