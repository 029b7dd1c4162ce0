// src/entry.rs

//! Integration-code generator.
//!
//! Writes the JavaScript glue (`tauri.js`) that the webview loads, with the
//! resolved config baked in. The runner treats this as a black box: it calls
//! [`EntryGenerator::generate`] and propagates any failure as fatal.

use std::fmt::Debug;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use crate::config::BuildConfig;
use crate::fs::FileSystem;

/// Name of the generated artifact inside the output directory.
pub const ENTRY_FILE_NAME: &str = "tauri.js";

const CONFIG_PLACEHOLDER: &str = "__TAURI_CONFIG_JSON__";

const ENTRY_TEMPLATE: &str = r#"// generated by tauri-runner; do not edit
(function () {
  var config = __TAURI_CONFIG_JSON__;

  function uid() {
    return Math.random().toString(36).slice(2) + Date.now().toString(36);
  }

  function invoke(args) {
    window.external.invoke(typeof args === "object" ? JSON.stringify(args) : args);
  }

  function transformCallback(callback, once) {
    var identifier = uid();
    window[identifier] = function (result) {
      if (once) {
        delete window[identifier];
      }
      return callback && callback(result);
    };
    return identifier;
  }

  function promisified(args) {
    return new Promise(function (resolve, reject) {
      var payload = Object.assign({}, args, {
        callback: transformCallback(resolve, true),
        error: transformCallback(reject, true)
      });
      invoke(payload);
    });
  }

  window.tauri = {
    config: config,
    invoke: invoke,
    transformCallback: transformCallback,
    promisified: promisified
  };
})();
"#;

/// Collaborator contract: `(outputDir, config) -> ()`.
pub trait EntryGenerator: Send + Sync + Debug {
    fn generate(&self, out_dir: &Path, cfg: &BuildConfig) -> Result<()>;
}

/// Default generator: fills the embedded template and writes it via the
/// [`FileSystem`] abstraction.
#[derive(Debug, Clone)]
pub struct TemplateEntryGenerator {
    fs: Arc<dyn FileSystem>,
}

impl TemplateEntryGenerator {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }
}

impl EntryGenerator for TemplateEntryGenerator {
    fn generate(&self, out_dir: &Path, cfg: &BuildConfig) -> Result<()> {
        let path = out_dir.join(ENTRY_FILE_NAME);
        let rendered = render_entry(cfg)?;
        self.fs
            .write(&path, rendered.as_bytes())
            .with_context(|| format!("writing generated entry {:?}", path))?;
        debug!(path = %path.display(), "generated integration code");
        Ok(())
    }
}

/// Render the entry template for `cfg`.
pub fn render_entry(cfg: &BuildConfig) -> Result<String> {
    let json = serde_json::to_string(cfg).context("serializing config for entry template")?;
    Ok(ENTRY_TEMPLATE.replace(CONFIG_PLACEHOLDER, &json))
}
