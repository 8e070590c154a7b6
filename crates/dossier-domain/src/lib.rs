//! Dossier Domain Layer
//!
//! Core types and trait seams for the multi-source fact extraction pipeline.
//! Nothing in this crate performs I/O; browsers, HTTP and storage are reached
//! only through the traits in [`traits`].
//!
//! ## Key Concepts
//!
//! - **ExtractionOutcome**: success payload or classified failure for one field
//! - **AggregateRecord**: ordered merge of every field's outcome
//! - **Locator**: CSS/XPath selector supplied by configuration
//! - **ClassificationTable**: ordered category -> keyword table used by [`classify`]
//! - **Clock**: injectable wall-clock for reproducible timestamps

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod classify;
pub mod clock;
pub mod error;
pub mod locator;
pub mod outcome;
pub mod record;
pub mod traits;

// Re-exports for convenience
pub use classify::{classify, Category, Classification, ClassificationTable, UNKNOWN_CATEGORY};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{ErrorKind, SinkError, SourceError};
pub use locator::Locator;
pub use outcome::ExtractionOutcome;
pub use record::{AggregateRecord, LinkEntry, LinkStatus, PolicyDocumentSummary, StatusCheckResult};
pub use traits::{FetchedPage, HttpFetcher, RecordSink, RenderClient, RenderSession};
