// src/config/paths.rs

//! Project root discovery and path resolution.

use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::errors::{Result, RunnerError};
use crate::fs::FileSystem;

/// Name of the native-toolchain subproject directory.
pub const TOOLING_DIR_NAME: &str = "src-tauri";
/// Tooling config document, relative to the tooling directory.
pub const TOOLING_CONFIG_FILE: &str = "tauri.conf.json";
/// Manifest document, relative to the project root.
pub const MANIFEST_FILE: &str = "package.json";

/// How many parent directories above the starting point are searched.
const MAX_PARENT_LEVELS: usize = 2;

/// Resolved project layout: the project root and its tooling directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    app_dir: PathBuf,
    tauri_dir: PathBuf,
}

impl AppPaths {
    /// Build paths for a known project root.
    pub fn from_app_dir(app_dir: impl Into<PathBuf>) -> Self {
        let app_dir = normalize(&app_dir.into());
        let tauri_dir = app_dir.join(TOOLING_DIR_NAME);
        Self { app_dir, tauri_dir }
    }

    /// Walk up from `start` (at most two parent levels) looking for
    /// `src-tauri/tauri.conf.json`.
    pub fn discover(fs: &dyn FileSystem, start: &Path) -> Result<Self> {
        let mut dir = Some(normalize(start));

        for _ in 0..=MAX_PARENT_LEVELS {
            let Some(current) = dir else { break };
            let marker = current.join(TOOLING_DIR_NAME).join(TOOLING_CONFIG_FILE);
            debug!(candidate = %marker.display(), "looking for project marker");
            if fs.is_file(&marker) {
                return Ok(Self::from_app_dir(current));
            }
            dir = current.parent().map(Path::to_path_buf);
        }

        Err(RunnerError::config(format!(
            "Couldn't recognize {:?} as a part of a Tauri project (no {}/{} found within {} parent directories)",
            start, TOOLING_DIR_NAME, TOOLING_CONFIG_FILE, MAX_PARENT_LEVELS
        )))
    }

    pub fn app_dir(&self) -> &Path {
        &self.app_dir
    }

    pub fn tauri_dir(&self) -> &Path {
        &self.tauri_dir
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.app_dir.join(MANIFEST_FILE)
    }

    pub fn tooling_config_path(&self) -> PathBuf {
        self.tauri_dir.join(TOOLING_CONFIG_FILE)
    }

    /// Resolve `path` against the project root (absolute paths pass through).
    pub fn resolve_app(&self, path: &str) -> PathBuf {
        resolve_against(&self.app_dir, path)
    }

    /// Resolve `path` against the tooling directory (absolute paths pass through).
    pub fn resolve_tauri(&self, path: &str) -> PathBuf {
        resolve_against(&self.tauri_dir, path)
    }
}

fn resolve_against(base: &Path, path: &str) -> PathBuf {
    let candidate = Path::new(path);
    if candidate.is_absolute() {
        normalize(candidate)
    } else {
        normalize(&base.join(candidate))
    }
}

/// Lexically normalize a path: drop `.` segments and fold `..` into the
/// preceding component. Does not touch the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}
