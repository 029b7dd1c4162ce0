// src/lib.rs

pub mod api;
pub mod cli;
pub mod config;
pub mod engine;
pub mod entry;
pub mod env;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod shutdown;
pub mod watch;

use tracing::info;

use crate::api::SessionEnd;
use crate::cli::{CliArgs, CliCommand};
use crate::errors::Result;

/// High-level entry point used by `main.rs`.
///
/// Dispatches to the `build` / `dev` workflows. With no subcommand, prints
/// usage and returns successfully.
pub async fn run(args: CliArgs) -> Result<()> {
    let end = match args.command {
        Some(CliCommand::Build(build)) => api::build(build.to_override()).await?,
        Some(CliCommand::Dev(dev)) => api::dev(dev.to_override(), !dev.no_watch).await?,
        None => {
            cli::print_usage();
            return Ok(());
        }
    };

    if end == SessionEnd::Interrupted {
        info!("interrupted; child process stopped");
    }
    Ok(())
}
