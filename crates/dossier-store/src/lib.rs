//! Dossier Store
//!
//! Sinks for the aggregate record.
//!
//! - `JsonFileSink`: pretty-printed JSON file, 4-space indent
//! - `MemorySink`: keeps persisted documents in memory for tests
//!
//! [`read_record`] loads a persisted document back for verification.

#![warn(missing_docs)]

use async_trait::async_trait;
use dossier_domain::{AggregateRecord, RecordSink, SinkError};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

/// File name used when no output path is configured
pub const DEFAULT_OUTPUT_FILE: &str = "janitorai_dot_com_data.json";

fn io_error(path: &Path, source: std::io::Error) -> SinkError {
    SinkError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Encode a record as JSON with a 4-space indent
pub fn to_pretty_json(record: &AggregateRecord) -> Result<Vec<u8>, SinkError> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    record.serialize(&mut ser)?;
    Ok(buf)
}

/// Writes the record to a JSON file
///
/// The file is replaced on every persist. Missing parent directories are
/// created. The document is written to a sibling temporary file first and then
/// renamed into place, so readers never observe a half-written record.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    /// Sink writing to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Destination file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| DEFAULT_OUTPUT_FILE.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl Default for JsonFileSink {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_FILE)
    }
}

#[async_trait]
impl RecordSink for JsonFileSink {
    async fn persist(&self, record: &AggregateRecord) -> Result<(), SinkError> {
        let bytes = to_pretty_json(record)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error(parent, e))?;
        }

        let staging = self.staging_path();
        tokio::fs::write(&staging, &bytes)
            .await
            .map_err(|e| io_error(&staging, e))?;
        tokio::fs::rename(&staging, &self.path)
            .await
            .map_err(|e| io_error(&self.path, e))?;

        info!(
            "Wrote {} fields ({} bytes) to {}",
            record.len(),
            bytes.len(),
            self.path.display()
        );
        Ok(())
    }

    fn destination(&self) -> String {
        self.path.display().to_string()
    }
}

/// Read a persisted document back
pub async fn read_record(path: impl AsRef<Path>) -> Result<Value, SinkError> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path).await.map_err(|e| io_error(path, e))?;
    let value = serde_json::from_slice(&bytes)?;
    debug!("Read record from {}", path.display());
    Ok(value)
}

#[derive(Debug, Default)]
struct MemoryState {
    documents: Vec<Value>,
    failure: Option<String>,
}

/// In-memory sink for tests
///
/// Clones share the stored documents.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    state: Arc<Mutex<MemoryState>>,
}

impl MemorySink {
    /// Empty sink that accepts every record
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink whose every persist fails with `message`
    pub fn failing(message: impl Into<String>) -> Self {
        let sink = Self::default();
        sink.lock().failure = Some(message.into());
        sink
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Documents persisted so far, oldest first
    pub fn documents(&self) -> Vec<Value> {
        self.lock().documents.clone()
    }

    /// Most recently persisted document
    pub fn last(&self) -> Option<Value> {
        self.lock().documents.last().cloned()
    }

    /// Number of successful persists
    pub fn persist_count(&self) -> usize {
        self.lock().documents.len()
    }
}

#[async_trait]
impl RecordSink for MemorySink {
    async fn persist(&self, record: &AggregateRecord) -> Result<(), SinkError> {
        let mut state = self.lock();
        if let Some(message) = &state.failure {
            return Err(SinkError::Other(message.clone()));
        }
        state.documents.push(record.to_value());
        Ok(())
    }

    fn destination(&self) -> String {
        "memory".to_string()
    }
}
