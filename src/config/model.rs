// src/config/model.rs

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fully merged and validated build configuration.
///
/// This is the typed view of `src-tauri/tauri.conf.json` after the defaults,
/// file and override layers have been merged:
///
/// ```json
/// {
///   "build": { "devPath": "../dist", "distDir": "../dist" },
///   "tauri": { "bundle": { "active": true, "targets": ["deb"] } }
/// }
/// ```
///
/// Keys we don't model are kept in the `extra` maps so the serialized config
/// handed to the compiler is complete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildConfig {
    pub build: BuildSection,
    pub tauri: TauriSection,
    #[serde(default)]
    pub ctx: Ctx,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `build` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildSection {
    /// Dev server URL (`http://` / `https://`) or a local directory.
    ///
    /// Local directories are absolute after resolution.
    pub dev_path: String,

    /// Distribution directory; always absolute after resolution.
    pub dist_dir: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before_dev_command: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before_build_command: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BuildSection {
    pub fn dist_dir_path(&self) -> &Path {
        Path::new(&self.dist_dir)
    }
}

/// `tauri` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TauriSection {
    pub embedded_server: ActiveFlag,
    pub bundle: BundleConfig,
    pub whitelist: WhitelistConfig,
    pub window: WindowConfig,
    pub security: SecurityConfig,
    pub edge: ActiveFlag,
    pub inliner: ActiveFlag,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Shared shape of `{ "active": bool }` toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveFlag {
    pub active: bool,
}

/// `tauri.bundle` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleConfig {
    pub active: bool,

    /// Bundle formats (`deb`, `msi`, `osx`, ...). `None` means "bundler default".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub targets: Option<Vec<String>>,

    #[serde(default)]
    pub osx: OsxConfig,

    #[serde(default)]
    pub deb: DebConfig,

    #[serde(default)]
    pub external_bin: Vec<String>,

    #[serde(default)]
    pub resources: Vec<String>,

    #[serde(default)]
    pub icon: Vec<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OsxConfig {
    /// License file, absolute after resolution.
    #[serde(default)]
    pub license: Option<String>,

    #[serde(default)]
    pub frameworks: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DebConfig {
    #[serde(default)]
    pub depends: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhitelistConfig {
    pub all: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub csp: String,
}

/// Invocation-specific settings (`ctx`), usually coming from CLI flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ctx {
    /// Build without `--release`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<bool>,

    /// Comma-separated list of target triples.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    /// Whether a dev-mode panic (exit code 101) ends the session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_on_panic: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prod: Option<bool>,
}

impl Ctx {
    pub fn is_debug(&self) -> bool {
        self.debug.unwrap_or(false)
    }

    /// Effective `exitOnPanic`; defaults to `true` when unset.
    pub fn exit_on_panic(&self) -> bool {
        self.exit_on_panic.unwrap_or(true)
    }
}

/// Highest-precedence configuration layer.
///
/// `ctx` is typed; `build` and `tauri` are partial JSON trees that are merged
/// field-by-field on top of the tooling config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigOverride {
    #[serde(default)]
    pub ctx: Ctx,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tauri: Option<Value>,
}

impl ConfigOverride {
    pub fn with_ctx(ctx: Ctx) -> Self {
        Self {
            ctx,
            ..Self::default()
        }
    }

    /// Render this override as a JSON layer for merging.
    pub fn to_layer(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}
