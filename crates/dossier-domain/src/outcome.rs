//! Outcome of a single field extraction

use crate::error::{ErrorKind, SourceError};
use serde::Serialize;
use serde_json::{json, Value};

/// Result of running one field extractor
///
/// Either a JSON payload or a classified failure, never both. Outcomes are
/// immutable once produced; the orchestrator only reads them.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionOutcome {
    /// Extractor produced a payload
    Success {
        /// Payload written to the aggregate record as-is
        value: Value,
    },

    /// Extractor failed inside its own boundary
    Failure {
        /// What went wrong
        kind: ErrorKind,
        /// Non-empty description
        message: String,
    },
}

impl ExtractionOutcome {
    /// Wrap a JSON payload
    pub fn success(value: impl Into<Value>) -> Self {
        ExtractionOutcome::Success {
            value: value.into(),
        }
    }

    /// Serialize a typed payload into a success outcome
    ///
    /// An encoding failure is reported as [`ErrorKind::Serialization`].
    pub fn from_payload<T: Serialize>(payload: &T) -> Self {
        match serde_json::to_value(payload) {
            Ok(value) => ExtractionOutcome::Success { value },
            Err(e) => ExtractionOutcome::failure(ErrorKind::Serialization, e.to_string()),
        }
    }

    /// Build a failure, falling back to the kind's description for blank messages
    pub fn failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            kind.description()
        } else {
            message
        };
        ExtractionOutcome::Failure { kind, message }
    }

    /// Convert an adapter error into a failure
    pub fn from_error(error: &SourceError) -> Self {
        ExtractionOutcome::failure(error.kind(), error.to_string())
    }

    /// Whether this is a success
    pub fn is_success(&self) -> bool {
        matches!(self, ExtractionOutcome::Success { .. })
    }

    /// Whether this is a failure
    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    /// The payload, if successful
    pub fn value(&self) -> Option<&Value> {
        match self {
            ExtractionOutcome::Success { value } => Some(value),
            ExtractionOutcome::Failure { .. } => None,
        }
    }

    /// The failure kind, if failed
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            ExtractionOutcome::Success { .. } => None,
            ExtractionOutcome::Failure { kind, .. } => Some(*kind),
        }
    }

    /// The failure message, if failed
    pub fn error_message(&self) -> Option<&str> {
        match self {
            ExtractionOutcome::Success { .. } => None,
            ExtractionOutcome::Failure { message, .. } => Some(message),
        }
    }

    /// JSON form used in the aggregate record
    ///
    /// Successes unwrap to their payload; failures become `{"error": message}`.
    pub fn to_document(&self) -> Value {
        match self {
            ExtractionOutcome::Success { value } => value.clone(),
            ExtractionOutcome::Failure { message, .. } => json!({ "error": message }),
        }
    }
}

impl From<SourceError> for ExtractionOutcome {
    fn from(error: SourceError) -> Self {
        ExtractionOutcome::from_error(&error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_unwraps_to_payload() {
        let outcome = ExtractionOutcome::success("Free to use");
        assert!(outcome.is_success());
        assert_eq!(outcome.to_document(), json!("Free to use"));
        assert!(outcome.error_message().is_none());
    }

    #[test]
    fn test_failure_embeds_error_object() {
        let outcome = ExtractionOutcome::failure(ErrorKind::Timeout, "page too slow");
        assert!(outcome.is_failure());
        assert_eq!(outcome.error_kind(), Some(ErrorKind::Timeout));
        assert_eq!(outcome.to_document(), json!({ "error": "page too slow" }));
    }

    #[test]
    fn test_blank_failure_message_is_replaced() {
        let outcome = ExtractionOutcome::failure(ErrorKind::NotFound, "   ");
        let message = outcome.error_message().unwrap();
        assert_eq!(message, ErrorKind::NotFound.description());
    }

    #[test]
    fn test_from_source_error() {
        let outcome: ExtractionOutcome = SourceError::Network("connection refused".into()).into();
        assert_eq!(outcome.error_kind(), Some(ErrorKind::Network));
        assert_eq!(
            outcome.error_message(),
            Some("Network error: connection refused")
        );
    }

    #[test]
    fn test_from_payload() {
        #[derive(Serialize)]
        struct Payload {
            url: String,
        }
        let outcome = ExtractionOutcome::from_payload(&Payload {
            url: "https://example.com".to_string(),
        });
        assert_eq!(
            outcome.value(),
            Some(&json!({ "url": "https://example.com" }))
        );
    }
}
