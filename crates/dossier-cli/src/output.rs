//! Output formatting for the CLI.

use crate::error::Result;
use colored::*;
use dossier_domain::{AggregateRecord, ExtractionOutcome};
use dossier_extractor::PipelineConfig;
use serde_json::{json, Value};
use std::path::Path;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

const PREVIEW_CHARS: usize = 60;

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format the result of a completed run.
    pub fn format_run(&self, record: &AggregateRecord, destination: &Path) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let summary = json!({
                    "output": destination.display().to_string(),
                    "fields": record.len(),
                    "failures": record.failure_count(),
                    "record": record.to_value(),
                });
                Ok(serde_json::to_string_pretty(&summary)?)
            }
            OutputFormat::Table => Ok(self.format_run_table(record, destination)),
            OutputFormat::Quiet => Ok(destination.display().to_string()),
        }
    }

    fn format_run_table(&self, record: &AggregateRecord, destination: &Path) -> String {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Status", "Detail"]);

        for (name, outcome) in record.iter() {
            let (status, detail) = match outcome {
                ExtractionOutcome::Success { value } => {
                    (self.colorize("ok", "green"), preview(value))
                }
                ExtractionOutcome::Failure { kind, message } => (
                    self.colorize(kind.as_str(), "red"),
                    truncate(message, PREVIEW_CHARS),
                ),
            };
            builder.push_record([name.to_string(), status, detail]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        let failures = record.failure_count();
        let summary = format!(
            "{} field(s), {} failed, written to {}",
            record.len(),
            failures,
            destination.display()
        );
        let summary = if failures == 0 {
            self.success(&summary)
        } else {
            self.warning(&summary)
        };

        format!("{}\n{}", table, summary)
    }

    /// Format a configuration.
    ///
    /// Quiet prints the TOML itself so it can be redirected into a file.
    pub fn format_config(&self, config: &PipelineConfig) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(config)?),
            OutputFormat::Quiet => Ok(config.to_toml()?),
            OutputFormat::Table => Ok(self.format_config_table(config)),
        }
    }

    fn format_config_table(&self, config: &PipelineConfig) -> String {
        let deadline = config
            .deadline_secs
            .map(|s| format!("{}s", s))
            .unwrap_or_else(|| "none".to_string());

        let mut settings = Builder::default();
        settings.push_record(["Setting", "Value"]);
        settings.push_record(["browser".to_string(), config.browser.to_string()]);
        settings.push_record(["headless".to_string(), config.headless.to_string()]);
        settings.push_record(["mode".to_string(), config.mode.to_string()]);
        settings.push_record(["deadline".to_string(), deadline]);
        settings.push_record([
            "output_path".to_string(),
            config.output_path.display().to_string(),
        ]);
        settings.push_record([
            "default_timeout".to_string(),
            format!("{}ms", config.default_timeout_ms),
        ]);
        let mut settings = settings.build();
        settings.with(Style::rounded());

        let mut fields = Builder::default();
        fields.push_record(["Field", "Kind", "Source", "Timeout"]);
        for field in &config.fields {
            let source = match field.source_kind() {
                dossier_extractor::SourceKind::Rendered => "browser",
                dossier_extractor::SourceKind::Http => "http",
            };
            fields.push_record([
                self.colorize(&field.name, "cyan"),
                field.kind.as_str().to_string(),
                source.to_string(),
                format!("{}ms", field.timeout(config.default_timeout_ms).as_millis()),
            ]);
        }
        let mut fields = fields.build();
        fields
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        format!("{}\n{}", settings, fields)
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

/// One-line preview of a success payload
fn preview(value: &Value) -> String {
    let text = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let single_line = text.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate(&single_line, PREVIEW_CHARS)
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", cut)
}
