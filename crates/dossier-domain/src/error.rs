//! Error kinds and adapter error types

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Classification of a field-level failure
///
/// Every [`crate::ExtractionOutcome::Failure`] carries one of these so callers can
/// tell a slow page apart from a missing element or a dead link without parsing
/// the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Page load failed (network or driver failure)
    Navigation,

    /// A bounded wait or request elapsed
    Timeout,

    /// An element or piece of content was not present
    NotFound,

    /// Connection-level HTTP failure
    Network,

    /// HTTP response with a 4xx/5xx status
    HttpStatus(u16),

    /// The sink could not store the record
    Persistence,

    /// A browser session could not be started
    Session,

    /// The configured browser kind has no adapter
    UnsupportedBrowser,

    /// A payload could not be encoded as JSON
    Serialization,

    /// The extractor itself crashed (panicked task)
    Internal,
}

impl ErrorKind {
    /// Stable name of the kind, as used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Navigation => "NavigationError",
            ErrorKind::Timeout => "TimeoutError",
            ErrorKind::NotFound => "NotFoundError",
            ErrorKind::Network => "NetworkError",
            ErrorKind::HttpStatus(_) => "HttpStatusError",
            ErrorKind::Persistence => "PersistenceError",
            ErrorKind::Session => "SessionError",
            ErrorKind::UnsupportedBrowser => "UnsupportedBrowserError",
            ErrorKind::Serialization => "SerializationError",
            ErrorKind::Internal => "InternalError",
        }
    }

    /// Generic human-readable description, used when a failure has no message
    pub fn description(&self) -> String {
        match self {
            ErrorKind::Navigation => "Failed to load the page".to_string(),
            ErrorKind::Timeout => "Timed out waiting for the source".to_string(),
            ErrorKind::NotFound => "Requested content was not found".to_string(),
            ErrorKind::Network => "Network request failed".to_string(),
            ErrorKind::HttpStatus(code) => format!("Server responded with HTTP {}", code),
            ErrorKind::Persistence => "Failed to persist the record".to_string(),
            ErrorKind::Session => "Failed to start a browser session".to_string(),
            ErrorKind::UnsupportedBrowser => "Browser is not supported".to_string(),
            ErrorKind::Serialization => "Payload could not be encoded".to_string(),
            ErrorKind::Internal => "Extractor crashed".to_string(),
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::HttpStatus(code) => write!(f, "{}({})", self.as_str(), code),
            _ => f.write_str(self.as_str()),
        }
    }
}

/// Errors raised by the rendering and HTTP capabilities
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// Page load failed
    #[error("Navigation to {url} failed: {reason}")]
    Navigation {
        /// URL that was being loaded
        url: String,
        /// Driver or network message
        reason: String,
    },

    /// Bounded wait elapsed
    #[error("Timed out after {timeout_ms}ms waiting for {what}")]
    Timeout {
        /// What was being waited on (locator or URL)
        what: String,
        /// Bound that elapsed
        timeout_ms: u64,
    },

    /// Element or content missing
    #[error("Not found: {0}")]
    NotFound(String),

    /// Connection-level failure
    #[error("Network error: {0}")]
    Network(String),

    /// 4xx/5xx response
    #[error("HTTP {code} returned by {url}")]
    HttpStatus {
        /// Response status code
        code: u16,
        /// Requested URL
        url: String,
    },

    /// Browser launch failure
    #[error("Browser session error: {0}")]
    Session(String),

    /// Factory rejected the browser kind
    #[error("Unsupported browser: {0}")]
    UnsupportedBrowser(String),
}

impl SourceError {
    /// The [`ErrorKind`] this error maps to
    pub fn kind(&self) -> ErrorKind {
        match self {
            SourceError::Navigation { .. } => ErrorKind::Navigation,
            SourceError::Timeout { .. } => ErrorKind::Timeout,
            SourceError::NotFound(_) => ErrorKind::NotFound,
            SourceError::Network(_) => ErrorKind::Network,
            SourceError::HttpStatus { code, .. } => ErrorKind::HttpStatus(*code),
            SourceError::Session(_) => ErrorKind::Session,
            SourceError::UnsupportedBrowser(_) => ErrorKind::UnsupportedBrowser,
        }
    }
}

/// Errors raised by a [`crate::traits::RecordSink`]
#[derive(Error, Debug)]
pub enum SinkError {
    /// Destination could not be written
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Destination path
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Record could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Any other storage failure
    #[error("Persistence error: {0}")]
    Other(String),
}

impl SinkError {
    /// Sink errors always map to [`ErrorKind::Persistence`]
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Persistence
    }
}
