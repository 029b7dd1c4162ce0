// src/config/loader.rs

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::errors::{Result, RunnerError};
use crate::fs::FileSystem;

/// The parts of `package.json` the runner cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    #[serde(default)]
    pub product_name: Option<String>,
}

/// Load the project manifest (`package.json`).
pub fn load_manifest(fs: &dyn FileSystem, path: &Path) -> Result<Manifest> {
    if !fs.is_file(path) {
        return Err(RunnerError::config(format!(
            "Could not find a package.json in your app's directory ({:?}).",
            path
        )));
    }

    let contents = fs.read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| RunnerError::config(format!("parsing manifest {:?}: {e}", path)))
}

/// Load the tooling config document (`src-tauri/tauri.conf.json`) as raw JSON.
///
/// This only performs JSON parsing; merging and validation happen in the
/// resolver.
pub fn load_tooling_config(fs: &dyn FileSystem, path: &Path) -> Result<Value> {
    if !fs.is_file(path) {
        return Err(RunnerError::config(format!(
            "Could not find a tauri config (tauri.conf.json) in your app's directory ({:?}).",
            path
        )));
    }

    let contents = fs.read_to_string(path)?;
    let value: Value = serde_json::from_str(&contents)
        .map_err(|e| RunnerError::config(format!("parsing tauri config {:?}: {e}", path)))?;

    if !value.is_object() {
        return Err(RunnerError::config(format!(
            "tauri config {:?} must contain a JSON object",
            path
        )));
    }

    Ok(value)
}
