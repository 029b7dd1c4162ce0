use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::{json, Value};
use tempfile::TempDir;

use tauri_runner::config::{AppPaths, ConfigOverride, ConfigResolver, HostOs, ResolvedConfig};
use tauri_runner::fs::RealFileSystem;

pub const PRODUCT_NAME: &str = "fixture-app";
pub const INDEX_HTML: &str = r#"<!doctype html>
<html>
  <head>
    <link rel="stylesheet" href="./styles.css">
    <script src="https://cdn.example.com/lib.js"></script>
  </head>
  <body>
    <script src="/main.js"></script>
  </body>
</html>
"#;

/// Tooling config used by [`ProjectFixture::new`].
pub fn default_tooling_config() -> Value {
    json!({
        "build": {
            "devPath": "../dist",
            "distDir": "../dist"
        },
        "tauri": {
            "bundle": { "active": false }
        }
    })
}

/// An on-disk project in a temp dir:
///
/// ```text
/// <root>/package.json
/// <root>/src-tauri/tauri.conf.json
/// <root>/dist/index.html
/// ```
#[derive(Debug)]
pub struct ProjectFixture {
    dir: TempDir,
}

impl ProjectFixture {
    pub fn new() -> Result<Self> {
        Self::with_tooling_config(&default_tooling_config())
    }

    pub fn with_tooling_config(config: &Value) -> Result<Self> {
        let fixture = Self {
            dir: TempDir::new().context("creating fixture dir")?,
        };
        fixture.write_file(
            "package.json",
            &json!({ "name": "fixture", "productName": PRODUCT_NAME }).to_string(),
        )?;
        fixture.write_tooling_config(config)?;
        fixture.write_file("dist/index.html", INDEX_HTML)?;
        Ok(fixture)
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn tauri_dir(&self) -> PathBuf {
        self.root().join("src-tauri")
    }

    pub fn dist_dir(&self) -> PathBuf {
        self.root().join("dist")
    }

    pub fn tooling_config_path(&self) -> PathBuf {
        self.tauri_dir().join("tauri.conf.json")
    }

    pub fn paths(&self) -> AppPaths {
        AppPaths::from_app_dir(self.root())
    }

    /// Write `contents` to `rel` under the root, creating parent dirs.
    pub fn write_file(&self, rel: &str, contents: &str) -> Result<PathBuf> {
        let path = self.root().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("creating {:?}", parent))?;
        }
        fs::write(&path, contents).with_context(|| format!("writing {:?}", path))?;
        Ok(path)
    }

    pub fn remove_file(&self, rel: &str) -> Result<()> {
        let path = self.root().join(rel);
        fs::remove_file(&path).with_context(|| format!("removing {:?}", path))
    }

    pub fn write_tooling_config(&self, config: &Value) -> Result<()> {
        let rendered = serde_json::to_string_pretty(config)?;
        self.write_file("src-tauri/tauri.conf.json", &rendered)?;
        Ok(())
    }

    /// Resolve the config as seen on Linux.
    pub fn resolve(&self, overrides: &ConfigOverride) -> tauri_runner::errors::Result<ResolvedConfig> {
        self.resolve_with_host(overrides, HostOs::Linux)
    }

    pub fn resolve_with_host(
        &self,
        overrides: &ConfigOverride,
        host: HostOs,
    ) -> tauri_runner::errors::Result<ResolvedConfig> {
        ConfigResolver::new(&RealFileSystem, self.paths())
            .with_host(host)
            .resolve(overrides)
    }
}
