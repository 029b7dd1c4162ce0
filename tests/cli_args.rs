use clap::Parser;

use tauri_runner::cli::{CliArgs, CliCommand, LogLevel};
use tauri_runner::logging::resolve_level;

#[test]
fn test_build_flags_map_onto_ctx() {
    let args = CliArgs::try_parse_from(["tauri-runner", "build", "-d", "-t", "a,b"]).unwrap();

    let Some(CliCommand::Build(build)) = args.command else {
        panic!("expected build subcommand");
    };
    let overrides = build.to_override();
    assert_eq!(overrides.ctx.debug, Some(true));
    assert_eq!(overrides.ctx.target.as_deref(), Some("a,b"));
    assert_eq!(overrides.ctx.exit_on_panic, None);
}

#[test]
fn test_build_without_flags_leaves_ctx_unset() {
    let args = CliArgs::try_parse_from(["tauri-runner", "build"]).unwrap();

    let Some(CliCommand::Build(build)) = args.command else {
        panic!("expected build subcommand");
    };
    let overrides = build.to_override();
    assert_eq!(overrides.ctx.debug, None);
    assert_eq!(overrides.ctx.target, None);
}

#[test]
fn test_dev_flags() {
    let args = CliArgs::try_parse_from([
        "tauri-runner",
        "dev",
        "--keep-alive-on-panic",
        "--no-watch",
        "--log-level",
        "debug",
    ])
    .unwrap();

    assert!(matches!(args.log_level, Some(LogLevel::Debug)));
    let Some(CliCommand::Dev(dev)) = args.command else {
        panic!("expected dev subcommand");
    };
    assert!(dev.no_watch);
    assert_eq!(dev.to_override().ctx.exit_on_panic, Some(false));
}

#[test]
fn test_missing_subcommand_parses() {
    let args = CliArgs::try_parse_from(["tauri-runner"]).unwrap();
    assert!(args.command.is_none());
}

#[test]
fn test_unknown_build_flag_is_rejected() {
    assert!(CliArgs::try_parse_from(["tauri-runner", "build", "--bogus"]).is_err());
}

#[test]
fn test_log_level_priority() {
    use tracing::Level;

    assert_eq!(resolve_level(Some(LogLevel::Warn), Some("trace")), Level::WARN);
    assert_eq!(resolve_level(None, Some("DEBUG")), Level::DEBUG);
    assert_eq!(resolve_level(None, Some("nonsense")), Level::INFO);
    assert_eq!(resolve_level(None, None), Level::INFO);
}
