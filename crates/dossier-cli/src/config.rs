//! Configuration file handling for the CLI.
//!
//! The file is a serialized [`PipelineConfig`]. A missing file at the default
//! location means built-in defaults; a missing file the user named explicitly
//! is an error.

use crate::cli::RunArgs;
use crate::error::{CliError, Result};
use dossier_extractor::{ConfigError, ExecutionMode, PipelineConfig};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Get the default configuration file path.
pub fn default_path() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| ConfigError::Invalid("Could not find home directory".into()))?;
    Ok(home.join(".dossier").join("config.toml"))
}

fn io_error(path: &Path, source: std::io::Error) -> CliError {
    ConfigError::Io {
        path: path.display().to_string(),
        source,
    }
    .into()
}

/// Read and validate a configuration file.
pub fn load_from(path: &Path) -> Result<PipelineConfig> {
    let contents = fs::read_to_string(path).map_err(|e| io_error(path, e))?;
    let config = PipelineConfig::from_toml(&contents)?;
    config.validate()?;
    debug!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Load the effective configuration.
///
/// `explicit` comes from `--config`; without it the default path is tried
/// and defaults are used when nothing is there.
pub fn load(explicit: Option<&Path>) -> Result<PipelineConfig> {
    if let Some(path) = explicit {
        return load_from(path);
    }

    let path = default_path()?;
    if path.exists() {
        load_from(&path)
    } else {
        debug!("No configuration at {}, using defaults", path.display());
        Ok(PipelineConfig::default())
    }
}

/// Write the default configuration as TOML and return where it went.
pub fn write_default(path: Option<&Path>, force: bool) -> Result<PathBuf> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => default_path()?,
    };

    if path.exists() && !force {
        return Err(CliError::InvalidInput(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
    }

    let contents = PipelineConfig::default().to_toml()?;
    fs::write(&path, contents).map_err(|e| io_error(&path, e))?;
    info!("Wrote default configuration to {}", path.display());
    Ok(path)
}

/// Apply `run` flags on top of the file configuration.
pub fn apply_overrides(config: &mut PipelineConfig, args: &RunArgs) {
    if let Some(output) = &args.output {
        config.output_path = output.clone();
    }
    if let Some(browser) = args.browser {
        config.browser = browser;
    }
    if args.concurrent {
        config.mode = ExecutionMode::Concurrent;
        if config.deadline_secs.is_none() {
            config.deadline_secs = PipelineConfig::concurrent().deadline_secs;
        }
    }
    if let Some(deadline) = args.deadline {
        config.deadline_secs = Some(deadline);
    }
    if args.headed {
        config.headless = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dossier_render::BrowserKind;
    use tempfile::TempDir;

    #[test]
    fn test_write_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let written = write_default(Some(&path), false).unwrap();
        assert_eq!(written, path);

        let loaded = load(Some(&path)).unwrap();
        assert_eq!(loaded.fields.len(), PipelineConfig::default().fields.len());
        assert_eq!(loaded.output_path, PipelineConfig::default().output_path);
    }

    #[test]
    fn test_write_refuses_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "headless = false\n").unwrap();

        let err = write_default(Some(&path), false).unwrap_err();
        assert!(matches!(err, CliError::InvalidInput(_)));
        assert_eq!(fs::read_to_string(&path).unwrap(), "headless = false\n");

        write_default(Some(&path), true).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("[[fields]]"));
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = TempDir::new().unwrap();
        let err = load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, CliError::Config(ConfigError::Io { .. })));
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "default_timeout_ms = 0\n").unwrap();

        let err = load(Some(&path)).unwrap_err();
        assert!(matches!(err, CliError::Config(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "browser = \"chromium\"\nheadless = false\n").unwrap();

        let config = load(Some(&path)).unwrap();
        assert_eq!(config.browser, BrowserKind::Chromium);
        assert!(!config.headless);
        assert_eq!(config.fields, PipelineConfig::default().fields);
    }

    #[test]
    fn test_overrides() {
        let mut config = PipelineConfig::default();
        let args = RunArgs {
            output: Some(PathBuf::from("/tmp/out.json")),
            browser: Some(BrowserKind::Chromium),
            concurrent: true,
            deadline: None,
            headed: true,
        };
        apply_overrides(&mut config, &args);

        assert_eq!(config.output_path, PathBuf::from("/tmp/out.json"));
        assert_eq!(config.browser, BrowserKind::Chromium);
        assert_eq!(config.mode, ExecutionMode::Concurrent);
        assert_eq!(config.deadline_secs, Some(120));
        assert!(!config.headless);
    }

    #[test]
    fn test_explicit_deadline_wins() {
        let mut config = PipelineConfig::default();
        let args = RunArgs {
            concurrent: true,
            deadline: Some(30),
            ..RunArgs::default()
        };
        apply_overrides(&mut config, &args);
        assert_eq!(config.deadline_secs, Some(30));
    }

    #[test]
    fn test_no_flags_no_changes() {
        let mut config = PipelineConfig::default();
        apply_overrides(&mut config, &RunArgs::default());
        assert_eq!(config.mode, ExecutionMode::Sequential);
        assert_eq!(config.deadline_secs, None);
        assert!(config.headless);
    }
}
