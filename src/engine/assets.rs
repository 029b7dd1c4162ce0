// src/engine/assets.rs

//! Index document resolution and the inlined-asset list.

use std::path::{Path, PathBuf};

use anyhow::Context;
use regex::Regex;
use tracing::{debug, warn};

use crate::errors::{Result, RunnerError};
use crate::fs::FileSystem;

/// Entry-point document expected inside the dist dir.
pub const INDEX_DOCUMENT: &str = "index.html";

/// Separator used when publishing the asset list.
pub const ASSET_SEPARATOR: &str = "|";

const ASSET_REF_PATTERN: &str = r#"(?i)\b(?:src|href)\s*=\s*["']([^"']+)["']"#;

/// The resolved index document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDocument {
    pub path: PathBuf,
    pub html: String,
    pub inlined_assets: Vec<String>,
}

/// Read `<dist_dir>/index.html` and, when `inline` is set, collect the
/// local assets it references.
///
/// Fails with [`RunnerError::AssetResolution`] if the document is missing.
pub fn resolve_index(fs: &dyn FileSystem, dist_dir: &Path, inline: bool) -> Result<IndexDocument> {
    let path = dist_dir.join(INDEX_DOCUMENT);
    if !fs.is_file(&path) {
        warn!(
            dist_dir = %dist_dir.display(),
            "cannot find index.html; did you forget to build your web code or update build.distDir in tauri.conf.json?"
        );
        return Err(RunnerError::AssetResolution(format!(
            "Could not find {INDEX_DOCUMENT} in dist dir {:?}",
            dist_dir
        )));
    }

    let html = fs.read_to_string(&path)?;
    let inlined_assets = if inline {
        collect_local_assets(&html)?
    } else {
        Vec::new()
    };
    debug!(count = inlined_assets.len(), "collected assets to inline");

    Ok(IndexDocument {
        path,
        html,
        inlined_assets,
    })
}

/// Local `src=` / `href=` references, in document order, without duplicates.
///
/// Remote (`http:`, `https:`, protocol-relative), `data:` and fragment
/// references are skipped. A leading `/` or `./` is stripped so the entries
/// are relative to the dist dir.
pub fn collect_local_assets(html: &str) -> Result<Vec<String>> {
    let re = Regex::new(ASSET_REF_PATTERN).context("compiling asset reference pattern")?;

    let mut assets: Vec<String> = Vec::new();
    for cap in re.captures_iter(html) {
        let raw = cap[1].trim();
        if is_external(raw) {
            continue;
        }
        let local = raw.trim_start_matches("./").trim_start_matches('/');
        if local.is_empty() || assets.iter().any(|a| a == local) {
            continue;
        }
        assets.push(local.to_string());
    }

    Ok(assets)
}

/// Join an asset list into the environment representation.
pub fn join_assets(assets: &[String]) -> String {
    assets.join(ASSET_SEPARATOR)
}

fn is_external(reference: &str) -> bool {
    let lower = reference.to_ascii_lowercase();
    lower.starts_with("http:")
        || lower.starts_with("https:")
        || lower.starts_with("//")
        || lower.starts_with("data:")
        || lower.starts_with("mailto:")
        || lower.starts_with('#')
}
