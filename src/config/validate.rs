// src/config/validate.rs

use serde_json::Value;

use crate::config::model::BuildConfig;
use crate::errors::{Result, RunnerError};

/// Fields under `build` that must be present and non-empty.
const REQUIRED_BUILD_FIELDS: [&str; 2] = ["devPath", "distDir"];

impl TryFrom<Value> for BuildConfig {
    type Error = RunnerError;

    fn try_from(merged: Value) -> std::result::Result<Self, Self::Error> {
        validate_required_fields(&merged)?;
        serde_json::from_value(merged)
            .map_err(|e| RunnerError::config(format!("invalid tauri config: {e}")))
    }
}

/// Check required `build` fields on the merged tree.
///
/// Runs before typed deserialization so the error names the missing field
/// instead of a generic serde message.
pub fn validate_required_fields(merged: &Value) -> Result<()> {
    for field in REQUIRED_BUILD_FIELDS {
        match merged.pointer(&format!("/build/{field}")) {
            Some(Value::String(s)) if !s.trim().is_empty() => {}
            _ => {
                return Err(RunnerError::config(format!(
                    "Missing required build configuration `build.{field}` in your tauri.conf.json file. \
                     Please make sure to add the proper path configuration."
                )));
            }
        }
    }
    Ok(())
}
