//! Error types for the CLI application.

use dossier_domain::SourceError;
use dossier_extractor::{ConfigError, PipelineError};
use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
///
/// Any of these ends the process with exit code 1. Field failures inside a
/// persisted record are not errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline aborted or the record could not be persisted
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// Browser or HTTP client could not be set up
    #[error("Setup error: {0}")]
    Setup(#[from] SourceError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
