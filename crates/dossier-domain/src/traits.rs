//! Trait definitions for external interactions
//!
//! These traits are the seams between the pipeline and the outside world.
//! Implementations live in other crates (`dossier-render`, `dossier-http`,
//! `dossier-store`).

use crate::error::{SinkError, SourceError};
use crate::locator::Locator;
use crate::record::AggregateRecord;
use async_trait::async_trait;
use std::time::Duration;

/// One stateful browser session (a tab in its own browser process)
///
/// Sessions are single-use and never shared between extractors. The caller
/// that opened a session is responsible for calling [`RenderSession::close`]
/// on every exit path.
#[async_trait]
pub trait RenderSession: Send {
    /// Load a page
    async fn navigate(&mut self, url: &str) -> Result<(), SourceError>;

    /// Suspend until an element matching `locator` exists
    ///
    /// Fails with [`SourceError::Timeout`] once `timeout` elapses.
    async fn wait_until_present(
        &mut self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<(), SourceError>;

    /// Trimmed text of the first matching element
    ///
    /// Fails with [`SourceError::NotFound`] when nothing matches.
    async fn extract_text(&mut self, locator: &Locator) -> Result<String, SourceError>;

    /// Trimmed text of every matching element, in document order
    ///
    /// No match is an empty list, not an error.
    async fn extract_all_text(&mut self, locator: &Locator) -> Result<Vec<String>, SourceError>;

    /// Clear an input, type `text` and press Enter
    async fn type_and_submit(&mut self, locator: &Locator, text: &str) -> Result<(), SourceError>;

    /// Release the session; calling it again is a no-op
    async fn close(&mut self) -> Result<(), SourceError>;
}

/// Factory for isolated [`RenderSession`]s
#[async_trait]
pub trait RenderClient: Send + Sync {
    /// Acquire a fresh session
    ///
    /// Acquisition either completes or fails as a whole; a failed call leaves
    /// nothing to close.
    async fn open_session(&self) -> Result<Box<dyn RenderSession>, SourceError>;

    /// Short name for logs, e.g. `chrome`
    fn name(&self) -> &str;
}

/// Body and status of a successful GET
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// HTTP status (2xx or 3xx)
    pub status: u16,

    /// Raw body text
    pub body: String,
}

/// Plain HTTP capability
#[async_trait]
pub trait HttpFetcher: Send + Sync {
    /// GET `url`, bounded by `timeout`
    ///
    /// 4xx/5xx responses fail with [`SourceError::HttpStatus`]; connection
    /// problems with [`SourceError::Network`]; an elapsed bound with
    /// [`SourceError::Timeout`].
    async fn fetch_text(&self, url: &str, timeout: Duration) -> Result<FetchedPage, SourceError>;
}

/// Durable destination for the aggregate record
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Store the record
    async fn persist(&self, record: &AggregateRecord) -> Result<(), SinkError>;

    /// Where the record goes, for logs
    fn destination(&self) -> String;
}
