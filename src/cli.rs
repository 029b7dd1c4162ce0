// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! NOTE: this expects `clap` to be built with the `derive` feature, e.g.:
//! `clap = { version = "4.5.53", features = ["derive"] }` in `Cargo.toml`.

use clap::error::ErrorKind;
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};

use crate::config::{ConfigOverride, Ctx};

/// Command-line arguments for `tauri-runner`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "tauri-runner",
    version,
    about = "Resolve the app config and drive cargo for dev and release builds.",
    long_about = None
)]
pub struct CliArgs {
    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TAURI_RUNNER_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum CliCommand {
    /// Build the app (and bundle it when `tauri.bundle.active` is set).
    Build(BuildArgs),
    /// Run the app in development mode.
    Dev(DevArgs),
}

#[derive(Debug, Clone, Default, Args)]
pub struct BuildArgs {
    /// Build without the `--release` flag.
    #[arg(short, long)]
    pub debug: bool,

    /// Comma-separated list of target triples to build against.
    #[arg(short, long, value_name = "TRIPLES")]
    pub target: Option<String>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct DevArgs {
    /// Keep the session alive when the app panics (exit code 101).
    #[arg(long)]
    pub keep_alive_on_panic: bool,

    /// Do not restart the app when `tauri.conf.json` changes.
    #[arg(long)]
    pub no_watch: bool,
}

impl BuildArgs {
    pub fn to_override(&self) -> ConfigOverride {
        ConfigOverride::with_ctx(Ctx {
            debug: self.debug.then_some(true),
            target: self.target.clone(),
            ..Ctx::default()
        })
    }
}

impl DevArgs {
    pub fn to_override(&self) -> ConfigOverride {
        ConfigOverride::with_ctx(Ctx {
            exit_on_panic: self.keep_alive_on_panic.then_some(false),
            ..Ctx::default()
        })
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Parse process arguments.
///
/// An unknown subcommand prints usage and exits 0, like a missing one.
/// Every other parse error (and `--help` / `--version`) is left to clap.
pub fn parse() -> CliArgs {
    parse_from(std::env::args_os())
}

pub fn parse_from<I, T>(args: I) -> CliArgs
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    match CliArgs::try_parse_from(args) {
        Ok(args) => args,
        Err(err) if err.kind() == ErrorKind::InvalidSubcommand => {
            print_usage();
            std::process::exit(0);
        }
        Err(err) => err.exit(),
    }
}

/// Print top-level usage to stdout.
pub fn print_usage() {
    let mut cmd = CliArgs::command();
    if let Err(e) = cmd.print_help() {
        eprintln!("tauri-runner: failed to print usage: {e}");
    }
}
