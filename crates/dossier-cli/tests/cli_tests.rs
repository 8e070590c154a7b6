//! End-to-end tests for the CLI commands that need no browser or network.

use clap::Parser;
use dossier_cli::cli::{ConfigAction, ConfigArgs};
use dossier_cli::commands::{execute_config, execute_run};
use dossier_cli::config::{apply_overrides, load};
use dossier_cli::{Cli, CliError, Command, Formatter, OutputFormat};
use dossier_domain::SourceError;
use dossier_extractor::{ExecutionMode, PipelineConfig};
use std::fs;
use tempfile::TempDir;

fn quiet() -> Formatter {
    Formatter::new(OutputFormat::Quiet, false)
}

#[test]
fn test_config_init_then_show() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");

    let init = ConfigArgs {
        action: ConfigAction::Init {
            path: None,
            force: false,
        },
    };
    execute_config(init, Some(&path), &quiet()).unwrap();
    assert!(path.exists());

    let show = ConfigArgs {
        action: ConfigAction::Show,
    };
    execute_config(show, Some(&path), &quiet()).unwrap();

    assert_eq!(load(Some(&path)).unwrap(), PipelineConfig::default());
}

#[test]
fn test_config_init_keeps_existing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "mode = \"concurrent\"\n").unwrap();

    let init = ConfigArgs {
        action: ConfigAction::Init {
            path: Some(path.clone()),
            force: false,
        },
    };
    let err = execute_config(init, None, &quiet()).unwrap_err();
    assert!(matches!(err, CliError::InvalidInput(_)));
    assert_eq!(load(Some(&path)).unwrap().mode, ExecutionMode::Concurrent);
}

#[test]
fn test_parsed_flags_override_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "headless = true\ndeadline_secs = 300\n").unwrap();

    let cli = Cli::parse_from([
        "dossier",
        "--config",
        path.to_str().unwrap(),
        "run",
        "--headed",
        "--concurrent",
    ]);
    let Command::Run(args) = cli.command else {
        panic!("Expected Run command");
    };

    let mut config = load(cli.config.as_deref()).unwrap();
    apply_overrides(&mut config, &args);

    assert!(!config.headless);
    assert_eq!(config.mode, ExecutionMode::Concurrent);
    // file deadline survives --concurrent
    assert_eq!(config.deadline_secs, Some(300));
}

#[tokio::test]
async fn test_run_with_unsupported_browser_fails_before_writing() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.toml");
    let output = dir.path().join("record.json");
    fs::write(&config_path, "browser = \"firefox\"\n").unwrap();

    let cli = Cli::parse_from([
        "dossier",
        "run",
        "--output",
        output.to_str().unwrap(),
    ]);
    let Command::Run(args) = cli.command else {
        panic!("Expected Run command");
    };

    let err = execute_run(args, Some(&config_path), &quiet())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CliError::Setup(SourceError::UnsupportedBrowser(_))
    ));
    assert!(!output.exists());
}

#[tokio::test]
async fn test_run_with_invalid_config_fails() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(&config_path, "fields = []\n").unwrap();

    let err = execute_run(Default::default(), Some(&config_path), &quiet())
        .await
        .unwrap_err();
    assert!(matches!(err, CliError::Config(_)));
}
