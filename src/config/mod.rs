// src/config/mod.rs

//! Configuration resolution for tauri-runner.
//!
//! Responsibilities:
//! - Locate the project root and tooling directory (`paths.rs`).
//! - Load `package.json` and `src-tauri/tauri.conf.json` (`loader.rs`).
//! - Merge defaults, file and overrides field-by-field (`layers.rs`).
//! - Validate required fields (`validate.rs`).
//! - Normalize paths, filter targets, publish the child env (`resolver.rs`).

pub mod layers;
pub mod loader;
pub mod model;
pub mod paths;
pub mod resolver;
pub mod validate;

pub use layers::{default_layer, merge_into, ConfigLayers};
pub use loader::{load_manifest, load_tooling_config, Manifest};
pub use model::{
    ActiveFlag, BuildConfig, BuildSection, BundleConfig, ConfigOverride, Ctx, TauriSection,
};
pub use paths::AppPaths;
pub use resolver::{resolve_config, ConfigResolver, HostOs, ResolvedConfig};
pub use validate::validate_required_fields;
