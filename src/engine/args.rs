// src/engine/args.rs

//! Compiler argument vectors.

use crate::config::BuildConfig;

/// The native compiler driven by the runner.
pub const COMPILER_PROGRAM: &str = "cargo";
/// Cargo subcommand that produces installable bundles.
pub const BUNDLER_SUBCOMMAND: &str = "tauri-bundler";

pub const FEATURE_EMBEDDED_SERVER: &str = "embedded-server";
pub const FEATURE_NO_SERVER: &str = "no-server";

/// Arguments for the dev child.
pub fn dev_args() -> Vec<String> {
    vec!["run".to_string()]
}

/// Feature list derived from `tauri.embeddedServer.active`.
pub fn features(cfg: &BuildConfig) -> Vec<String> {
    let feature = if cfg.tauri.embedded_server.active {
        FEATURE_EMBEDDED_SERVER
    } else {
        FEATURE_NO_SERVER
    };
    vec![feature.to_string()]
}

/// Arguments for one release build, optionally for a specific target triple.
///
/// ```text
/// <build|tauri-bundler> --features <f> [--format <t>]... [--release] [--target <triple>]
/// ```
pub fn build_args(cfg: &BuildConfig, target: Option<&str>) -> Vec<String> {
    let bundle = &cfg.tauri.bundle;
    let mut args = Vec::new();

    args.push(if bundle.active { BUNDLER_SUBCOMMAND } else { "build" }.to_string());

    args.push("--features".to_string());
    args.extend(features(cfg));

    if bundle.active {
        for format in bundle.targets.iter().flatten() {
            args.push("--format".to_string());
            args.push(format.clone());
        }
    }

    if !cfg.ctx.is_debug() {
        args.push("--release".to_string());
    }

    if let Some(target) = target {
        args.push("--target".to_string());
        args.push(target.to_string());
    }

    args
}

/// Split `ctx.target` into per-build targets.
///
/// `None` (or a list with no usable entries) means a single host build,
/// represented as `[None]`.
pub fn split_targets(ctx_target: Option<&str>) -> Vec<Option<String>> {
    let targets: Vec<Option<String>> = ctx_target
        .into_iter()
        .flat_map(|s| s.split(','))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| Some(t.to_string()))
        .collect();

    if targets.is_empty() {
        vec![None]
    } else {
        targets
    }
}
