//! Pipeline configuration
//!
//! Everything site-specific (URLs, locators, keyword tables, the link
//! registry) lives here as data. Changing a selector is a config edit, not a
//! code change.

use crate::error::ConfigError;
use crate::extractors::languages::LanguagesSource;
use crate::extractors::links::LinksSource;
use crate::extractors::policy::PolicySource;
use crate::extractors::pricing::PricingSource;
use crate::extractors::specialty::SpecialtySource;
use crate::extractors::status::StatusSource;
use dossier_render::{BrowserKind, RenderConfig, DEFAULT_POLL_INTERVAL_MS};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

/// How fields are scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// One field after another, in declaration order
    #[default]
    Sequential,
    /// Every field on its own task
    Concurrent,
}

impl ExecutionMode {
    /// Lowercase name, as written in TOML
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionMode::Sequential => "sequential",
            ExecutionMode::Concurrent => "concurrent",
        }
    }
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ExecutionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sequential" => Ok(ExecutionMode::Sequential),
            "concurrent" => Ok(ExecutionMode::Concurrent),
            _ => Err(format!("Invalid mode: {}", s)),
        }
    }
}

/// Which adapter a field needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// A browser session
    Rendered,
    /// Plain HTTP
    Http,
}

/// A named URL in a registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedUrl {
    /// Key in the output document
    pub name: String,

    /// Target URL
    pub url: String,
}

impl NamedUrl {
    /// Create a named URL
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    pub(crate) fn validate_all(what: &str, entries: &[NamedUrl]) -> Result<(), String> {
        let mut seen = HashSet::new();
        for entry in entries {
            if entry.name.trim().is_empty() || entry.url.trim().is_empty() {
                return Err(format!("{} entries need a name and a url", what));
            }
            if !seen.insert(entry.name.as_str()) {
                return Err(format!("duplicate {} name '{}'", what, entry.name));
            }
        }
        Ok(())
    }
}

/// What a field extracts and where from
///
/// Written in TOML as a `kind` key next to the kind's own settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    /// Product specialty from a review article
    Specialty(SpecialtySource),
    /// Content-policy classification of policy documents
    Policy(PolicySource),
    /// Pricing snippet from a web search
    Pricing(PricingSource),
    /// Link registry health
    Links(LinksSource),
    /// Uptime via a status checker
    Status(StatusSource),
    /// Supported languages from an article
    Languages(LanguagesSource),
}

impl FieldKind {
    /// Adapter this kind needs
    pub fn source_kind(&self) -> SourceKind {
        match self {
            FieldKind::Policy(_) | FieldKind::Links(_) => SourceKind::Http,
            _ => SourceKind::Rendered,
        }
    }

    /// Short kind name, as written in config
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Specialty(_) => "specialty",
            FieldKind::Policy(_) => "policy",
            FieldKind::Pricing(_) => "pricing",
            FieldKind::Links(_) => "links",
            FieldKind::Status(_) => "status",
            FieldKind::Languages(_) => "languages",
        }
    }

    fn validate(&self) -> Result<(), String> {
        match self {
            FieldKind::Specialty(s) => s.validate(),
            FieldKind::Policy(s) => s.validate(),
            FieldKind::Pricing(s) => s.validate(),
            FieldKind::Links(s) => s.validate(),
            FieldKind::Status(s) => s.validate(),
            FieldKind::Languages(s) => s.validate(),
        }
    }
}

/// One field of the output document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Key in the output document
    pub name: String,

    /// Per-wait / per-request bound; falls back to the pipeline default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,

    /// Extractor and its locators
    #[serde(flatten)]
    pub kind: FieldKind,
}

impl FieldSpec {
    /// Field using the pipeline's default timeout
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            timeout_ms: None,
            kind,
        }
    }

    /// Override the timeout
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// Adapter this field needs
    pub fn source_kind(&self) -> SourceKind {
        self.kind.source_kind()
    }

    /// Effective timeout
    pub fn timeout(&self, default_ms: u64) -> Duration {
        Duration::from_millis(self.timeout_ms.unwrap_or(default_ms))
    }
}

/// The six fields of the janitorai.com dossier, in output order
pub fn default_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::new("specialty", FieldKind::Specialty(SpecialtySource::default())),
        FieldSpec::new("nsfw_policy", FieldKind::Policy(PolicySource::default())),
        FieldSpec::new("pricing", FieldKind::Pricing(PricingSource::default())),
        FieldSpec::new("useful_links", FieldKind::Links(LinksSource::default()))
            .with_timeout_ms(5_000),
        FieldSpec::new("server_status", FieldKind::Status(StatusSource::default())),
        FieldSpec::new(
            "languages_supported",
            FieldKind::Languages(LanguagesSource::default()),
        ),
    ]
}

/// Configuration for a pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Browser for rendered fields
    pub browser: BrowserKind,

    /// Run the browser without a window
    pub headless: bool,

    /// Sequential or concurrent scheduling
    pub mode: ExecutionMode,

    /// Global bound on the whole run (seconds)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline_secs: Option<u64>,

    /// Where the record is written
    pub output_path: PathBuf,

    /// Timeout for fields without their own (milliseconds)
    pub default_timeout_ms: u64,

    /// Interval between DOM polls (milliseconds)
    pub poll_interval_ms: u64,

    /// Fields in output order
    pub fields: Vec<FieldSpec>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            browser: BrowserKind::default(),
            headless: true,
            mode: ExecutionMode::Sequential,
            deadline_secs: None,
            output_path: PathBuf::from("janitorai_dot_com_data.json"),
            default_timeout_ms: 10_000,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            fields: default_fields(),
        }
    }
}

impl PipelineConfig {
    /// Concurrent preset: every field on its own task, two-minute deadline
    pub fn concurrent() -> Self {
        Self {
            mode: ExecutionMode::Concurrent,
            deadline_secs: Some(120),
            ..Self::default()
        }
    }

    /// Settings for the browser factory
    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            browser: self.browser,
            headless: self.headless,
            executable: None,
            poll_interval_ms: self.poll_interval_ms,
        }
    }

    /// Global deadline as a Duration
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_secs.map(Duration::from_secs)
    }

    /// Poll interval as a Duration
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "default_timeout_ms must be greater than 0".to_string(),
            ));
        }
        if self.deadline_secs == Some(0) {
            return Err(ConfigError::Invalid(
                "deadline_secs must be greater than 0".to_string(),
            ));
        }
        if self.fields.is_empty() {
            return Err(ConfigError::Invalid("at least one field is required".to_string()));
        }

        let mut names = HashSet::new();
        for field in &self.fields {
            if field.name.trim().is_empty() {
                return Err(ConfigError::Invalid("field names must not be empty".to_string()));
            }
            if !names.insert(field.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate field name '{}'",
                    field.name
                )));
            }
            if field.timeout_ms == Some(0) {
                return Err(ConfigError::Invalid(format!(
                    "field '{}': timeout_ms must be greater than 0",
                    field.name
                )));
            }
            field
                .kind
                .validate()
                .map_err(|e| ConfigError::Invalid(format!("field '{}': {}", field.name, e)))?;
        }
        Ok(())
    }

    /// Load configuration from TOML string
    ///
    /// Keyword tables are lowercased on load.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(toml_str)?;
        for field in &mut config.fields {
            if let FieldKind::Policy(policy) = &mut field.kind {
                policy.categories = std::mem::take(&mut policy.categories).normalized();
            }
        }
        Ok(config)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
