// src/config/resolver.rs

//! Turn the on-disk documents plus CLI overrides into a validated,
//! path-normalized [`BuildConfig`] and the environment the compiler reads.

use std::path::Path;

use serde_json::Value;
use tracing::{debug, info};

use crate::config::layers::{default_layer, ConfigLayers};
use crate::config::loader::{load_manifest, load_tooling_config};
use crate::config::model::{BuildConfig, ConfigOverride};
use crate::config::paths::AppPaths;
use crate::env::{ChildEnv, CONFIG_VAR, DIST_DIR_VAR, TAURI_DIR_VAR};
use crate::errors::{Result, RunnerError};
use crate::fs::FileSystem;

/// Bundle target that only exists on Windows.
const WINDOWS_ONLY_TARGET: &str = "msi";
/// Fallback license file at the project root.
const LICENSE_FILE: &str = "LICENSE";

/// Host operating system, as far as config resolution cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostOs {
    Windows,
    MacOs,
    Linux,
    Other,
}

impl HostOs {
    pub fn current() -> Self {
        match std::env::consts::OS {
            "windows" => HostOs::Windows,
            "macos" => HostOs::MacOs,
            "linux" => HostOs::Linux,
            _ => HostOs::Other,
        }
    }
}

/// Output of config resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub config: BuildConfig,
    pub paths: AppPaths,
    pub env: ChildEnv,
}

/// State of `tauri.bundle.osx.license` in the merged tree.
#[derive(Debug, Clone, PartialEq, Eq)]
enum LicenseSetting {
    /// Key absent: fall back to `<app>/LICENSE` if it exists.
    Unset,
    /// Explicit `null`: no license, no fallback.
    Disabled,
    Path(String),
}

impl LicenseSetting {
    fn from_merged(merged: &Value) -> Self {
        match merged.pointer("/tauri/bundle/osx/license") {
            None => LicenseSetting::Unset,
            Some(Value::String(s)) => LicenseSetting::Path(s.clone()),
            Some(_) => LicenseSetting::Disabled,
        }
    }
}

/// Resolves configuration for one project.
#[derive(Debug)]
pub struct ConfigResolver<'a> {
    fs: &'a dyn FileSystem,
    paths: AppPaths,
    host: HostOs,
}

impl<'a> ConfigResolver<'a> {
    pub fn new(fs: &'a dyn FileSystem, paths: AppPaths) -> Self {
        Self {
            fs,
            paths,
            host: HostOs::current(),
        }
    }

    /// Override the host OS (platform filtering is host dependent).
    pub fn with_host(mut self, host: HostOs) -> Self {
        self.host = host;
        self
    }

    pub fn paths(&self) -> &AppPaths {
        &self.paths
    }

    /// Load, merge, validate and normalize.
    pub fn resolve(&self, overrides: &ConfigOverride) -> Result<ResolvedConfig> {
        let manifest = load_manifest(self.fs, &self.paths.manifest_path())?;
        let file = load_tooling_config(self.fs, &self.paths.tooling_config_path())?;

        let layers = ConfigLayers::new(
            default_layer(manifest.product_name.as_deref()),
            file,
            overrides.to_layer()?,
        );
        let merged = layers.merged();
        let license = LicenseSetting::from_merged(&merged);

        let mut config = BuildConfig::try_from(merged)?;
        let mut env = ChildEnv::new();

        self.normalize_build_paths(&mut config, &mut env);
        self.resolve_license(&mut config, license);
        filter_targets_for_host(&mut config, self.host);

        if env.get(DIST_DIR_VAR).is_none() {
            return Err(RunnerError::config(
                "Couldn't resolve the dist dir. Make sure you have `devPath` or `distDir` under tauri.conf.json > build",
            ));
        }

        env.set(TAURI_DIR_VAR, path_string(self.paths.tauri_dir()));
        env.set(CONFIG_VAR, serde_json::to_string(&config)?);

        info!(
            dev_path = %config.build.dev_path,
            dist_dir = %config.build.dist_dir,
            "resolved tauri config"
        );

        Ok(ResolvedConfig {
            config,
            paths: self.paths.clone(),
            env,
        })
    }

    fn normalize_build_paths(&self, config: &mut BuildConfig, env: &mut ChildEnv) {
        let build = &mut config.build;

        if is_remote_dev_path(&build.dev_path) {
            debug!(dev_path = %build.dev_path, "dev path is a remote URL; leaving as-is");
        } else {
            build.dev_path = path_string(&self.paths.resolve_tauri(&build.dev_path));
            env.set(DIST_DIR_VAR, build.dev_path.clone());
        }

        build.dist_dir = path_string(&self.paths.resolve_tauri(&build.dist_dir));
        env.set(DIST_DIR_VAR, build.dist_dir.clone());
    }

    fn resolve_license(&self, config: &mut BuildConfig, setting: LicenseSetting) {
        let osx = &mut config.tauri.bundle.osx;
        osx.license = match setting {
            LicenseSetting::Path(path) => Some(path_string(&self.paths.resolve_tauri(&path))),
            LicenseSetting::Disabled => None,
            LicenseSetting::Unset => {
                let fallback = self.paths.resolve_app(LICENSE_FILE);
                if self.fs.is_file(&fallback) {
                    debug!(license = %fallback.display(), "using project LICENSE for osx bundle");
                    Some(path_string(&fallback))
                } else {
                    None
                }
            }
        };
    }
}

/// Discover the project from `cwd` and resolve its configuration.
pub fn resolve_config(
    fs: &dyn FileSystem,
    cwd: &Path,
    overrides: &ConfigOverride,
) -> Result<ResolvedConfig> {
    let paths = AppPaths::discover(fs, cwd)?;
    ConfigResolver::new(fs, paths).resolve(overrides)
}

/// `true` for dev paths served by a dev server rather than from disk.
pub fn is_remote_dev_path(dev_path: &str) -> bool {
    dev_path.starts_with("http://") || dev_path.starts_with("https://")
}

/// Drop bundle targets the host cannot produce.
pub fn filter_targets_for_host(config: &mut BuildConfig, host: HostOs) {
    if host == HostOs::Windows {
        return;
    }
    if let Some(targets) = config.tauri.bundle.targets.as_mut() {
        targets.retain(|t| t != WINDOWS_ONLY_TARGET);
    }
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
