// src/env.rs

//! Environment contract between the runner and the compiler child.
//!
//! The runner never mutates its own process environment. Instead every child
//! is spawned with the inherited environment plus the variables collected
//! here.

use std::collections::BTreeMap;

/// Distribution directory (or local dev path) the app serves from.
pub const DIST_DIR_VAR: &str = "TAURI_DIST_DIR";
/// Absolute path of the tooling directory.
pub const TAURI_DIR_VAR: &str = "TAURI_DIR";
/// Full resolved config, serialized as JSON.
pub const CONFIG_VAR: &str = "TAURI_CONFIG";
/// Pipe-delimited list of assets to inline.
pub const INLINED_ASSETS_VAR: &str = "TAURI_INLINED_ASSETS";

/// Ordered set of variables published to child processes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChildEnv {
    vars: BTreeMap<String, String>,
}

impl ChildEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}
