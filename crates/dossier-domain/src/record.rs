//! Aggregate record and the typed payloads that go into it

use crate::outcome::ExtractionOutcome;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::Deserialize;
use serde_json::{Map, Value};

/// The merged output document
///
/// Field order is insertion order, which the orchestrator keeps equal to
/// declaration order. Each field name appears at most once; inserting a name
/// twice replaces the earlier outcome in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateRecord {
    fields: Vec<(String, ExtractionOutcome)>,
}

impl AggregateRecord {
    /// Empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a field, keeping its original position on replace
    pub fn insert(&mut self, name: impl Into<String>, outcome: ExtractionOutcome) {
        let name = name.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = outcome,
            None => self.fields.push((name, outcome)),
        }
    }

    /// Outcome for a field
    pub fn get(&self, name: &str) -> Option<&ExtractionOutcome> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, outcome)| outcome)
    }

    /// Field names in order
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Iterate `(name, outcome)` pairs in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ExtractionOutcome)> {
        self.fields.iter().map(|(n, o)| (n.as_str(), o))
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of failed fields
    pub fn failure_count(&self) -> usize {
        self.fields.iter().filter(|(_, o)| o.is_failure()).count()
    }

    /// JSON object form of the record
    pub fn to_value(&self) -> Value {
        let mut map = Map::with_capacity(self.fields.len());
        for (name, outcome) in &self.fields {
            map.insert(name.clone(), outcome.to_document());
        }
        Value::Object(map)
    }
}

impl Serialize for AggregateRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, outcome) in &self.fields {
            map.serialize_entry(name, &outcome.to_document())?;
        }
        map.end()
    }
}

/// Health of one registry link
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStatus {
    /// 2xx/3xx response
    Valid,
    /// Anything else
    Invalid,
}

/// Validation result for one registry link
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, Deserialize)]
pub struct LinkEntry {
    /// Checked URL
    pub url: String,

    /// Verdict
    pub status: LinkStatus,

    /// Response status, for valid links
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,

    /// Failure description, for invalid links
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl LinkEntry {
    /// A reachable link
    pub fn valid(url: impl Into<String>, status_code: u16) -> Self {
        Self {
            url: url.into(),
            status: LinkStatus::Valid,
            status_code: Some(status_code),
            error_message: None,
        }
    }

    /// An unreachable link
    pub fn invalid(url: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status: LinkStatus::Invalid,
            status_code: None,
            error_message: Some(error_message.into()),
        }
    }
}

/// Uptime check performed through a third-party checker page
///
/// Serialized with the short keys of the output document (`url`,
/// `first_checked`, `status`, `response_time`, `error`, `last_checked`).
#[derive(Debug, Clone, PartialEq, serde::Serialize, Deserialize)]
pub struct StatusCheckResult {
    /// Site whose status was checked
    #[serde(rename = "url")]
    pub target_url: String,

    /// Wall-clock time before the checker was opened
    #[serde(rename = "first_checked")]
    pub first_checked_at: String,

    /// Indicator text plus checker URL, or `Error (<checker url>)`
    #[serde(rename = "status")]
    pub status_text: String,

    /// Seconds from submission to indicator, 0 on failure
    #[serde(rename = "response_time")]
    pub response_time_seconds: f64,

    /// Failure description, `null` on success
    pub error: Option<String>,

    /// Wall-clock time after the check finished or failed
    #[serde(rename = "last_checked")]
    pub last_checked_at: String,
}

/// Classification of one policy document
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, Deserialize)]
pub struct PolicyDocumentSummary {
    /// Document URL
    pub url: String,

    /// Matched category, `Unknown`, or `Error`
    pub nsfw_policy_category: String,

    /// One-sentence summary
    pub summary: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_record_preserves_insertion_order() {
        let mut record = AggregateRecord::new();
        record.insert("zeta", ExtractionOutcome::success("z"));
        record.insert("alpha", ExtractionOutcome::success("a"));
        record.insert("mid", ExtractionOutcome::failure(ErrorKind::Timeout, "slow"));

        assert_eq!(record.field_names(), vec!["zeta", "alpha", "mid"]);
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"zeta":"z","alpha":"a","mid":{"error":"slow"}}"#);
        assert_eq!(record.failure_count(), 1);
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut record = AggregateRecord::new();
        record.insert("a", ExtractionOutcome::success(1));
        record.insert("b", ExtractionOutcome::success(2));
        record.insert("a", ExtractionOutcome::success(3));
        assert_eq!(record.len(), 2);
        assert_eq!(record.field_names(), vec!["a", "b"]);
        assert_eq!(record.get("a").unwrap().value(), Some(&json!(3)));
    }

    #[test]
    fn test_to_value_matches_serialize() {
        let mut record = AggregateRecord::new();
        record.insert("pricing", ExtractionOutcome::success("Free"));
        let via_serde = serde_json::to_value(&record).unwrap();
        assert_eq!(via_serde, record.to_value());
    }

    #[test]
    fn test_link_entry_shapes() {
        let valid = serde_json::to_value(LinkEntry::valid("https://a", 200)).unwrap();
        assert_eq!(
            valid,
            json!({ "url": "https://a", "status": "valid", "status_code": 200 })
        );

        let invalid = serde_json::to_value(LinkEntry::invalid("https://b", "HTTP 404")).unwrap();
        assert_eq!(
            invalid,
            json!({ "url": "https://b", "status": "invalid", "error_message": "HTTP 404" })
        );
    }

    #[test]
    fn test_status_check_result_keys() {
        let result = StatusCheckResult {
            target_url: "https://www.example.com".to_string(),
            first_checked_at: "2024-01-01 10:00:00".to_string(),
            status_text: "Error (https://checker)".to_string(),
            response_time_seconds: 0.0,
            error: Some("boom".to_string()),
            last_checked_at: "2024-01-01 10:00:05".to_string(),
        };
        let value = serde_json::to_value(&result).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(
            keys,
            vec!["url", "first_checked", "status", "response_time", "error", "last_checked"]
        );
    }
}
