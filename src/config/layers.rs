// src/config/layers.rs

//! Three-layer configuration merge.
//!
//! Precedence is **override > tooling file > built-in defaults**, applied
//! per field:
//! - objects merge recursively, key by key;
//! - arrays, scalars and explicit `null` in a higher layer replace the lower
//!   value wholesale.
//!
//! An explicit `null` is kept (not treated as "absent") because it carries
//! meaning, e.g. `tauri.bundle.osx.license: null` disables the LICENSE
//! fallback.

use serde_json::{json, Value};

pub const DEFAULT_CSP: &str =
    "default-src blob: data: filesystem: ws: http: https: 'unsafe-eval' 'unsafe-inline'";

/// The three layers, lowest precedence first.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigLayers {
    pub defaults: Value,
    pub file: Value,
    pub overrides: Value,
}

impl ConfigLayers {
    pub fn new(defaults: Value, file: Value, overrides: Value) -> Self {
        Self {
            defaults,
            file,
            overrides,
        }
    }

    /// Merge all layers into a single tree.
    pub fn merged(&self) -> Value {
        let mut out = self.defaults.clone();
        merge_into(&mut out, self.file.clone());
        merge_into(&mut out, self.overrides.clone());
        out
    }
}

/// Built-in defaults layer.
///
/// `product_name` comes from the manifest and becomes the window title.
pub fn default_layer(product_name: Option<&str>) -> Value {
    let mut window = json!({});
    if let Some(name) = product_name {
        window["title"] = Value::String(name.to_string());
    }

    json!({
        "build": {},
        "ctx": {},
        "tauri": {
            "embeddedServer": { "active": true },
            "bundle": {
                "active": true,
                "icon": [],
                "resources": [],
                "externalBin": [],
                "deb": { "depends": [] },
                "osx": { "frameworks": [] }
            },
            "whitelist": { "all": false },
            "window": window,
            "security": { "csp": DEFAULT_CSP },
            "edge": { "active": true },
            "inliner": { "active": true }
        }
    })
}

/// Merge `overlay` into `base` in place.
pub fn merge_into(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_into(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (slot, overlay) => *slot = overlay,
    }
}
