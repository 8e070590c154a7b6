//! Error types for the pipeline

use dossier_domain::SinkError;
use thiserror::Error;

/// Problems with a pipeline configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// TOML could not be parsed into a configuration
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    /// Configuration could not be written as TOML
    #[error("Failed to serialize configuration: {0}")]
    Serialize(String),

    /// Configuration parsed but is not usable
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// Configuration file could not be read or written
    #[error("Configuration file {path}: {source}")]
    Io {
        /// File path
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e.to_string())
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(e: toml::ser::Error) -> Self {
        ConfigError::Serialize(e.to_string())
    }
}

/// Errors that abort a pipeline run
///
/// Field-level problems never show up here; they become failures inside the
/// record.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Configuration rejected before the run started
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The sink could not store the record
    #[error("Failed to persist record: {0}")]
    Persistence(#[from] SinkError),

    /// A declared field produced no outcome
    #[error("Field '{0}' produced no outcome")]
    MissingOutcome(String),
}
