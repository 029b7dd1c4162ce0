// src/errors.rs

//! Crate-wide error type and result alias.
//!
//! Every variant is fatal for the command that raised it; nothing in the
//! runner retries. `main` maps all of them to exit code 1.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunnerError {
    /// Missing files, missing required fields, unresolvable dist dir.
    #[error("Configuration error: {0}")]
    Config(String),

    /// `beforeDevCommand` / `beforeBuildCommand` exited nonzero.
    #[error("`{command}` failed with exit code {code}")]
    PreludeCommand { command: String, code: i32 },

    /// The native compiler exited nonzero (outside the tolerated dev crash).
    #[error("Cargo failed with status code {code}")]
    CompilerFailure { code: i32 },

    /// The index document could not be found in the dist dir.
    #[error("Asset resolution failed: {0}")]
    AssetResolution(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RunnerError {
    pub fn config(msg: impl Into<String>) -> Self {
        RunnerError::Config(msg.into())
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, RunnerError>;
