//! Dossier Extractor
//!
//! Collects facts about one web product from several independent sources and
//! merges them into a single record.
//!
//! # Architecture
//!
//! ```text
//! PipelineConfig → Pipeline → field extractors → AggregateRecord → RecordSink
//!                               │          │
//!                        RenderClient   HttpFetcher
//! ```
//!
//! # Key Features
//!
//! - **Per-field isolation**: every extractor is a failure boundary; a broken
//!   source becomes `{"error": ...}` in its own field and nothing else
//! - **Scoped sessions**: each browser-backed field gets a fresh session that is
//!   closed on every exit path
//! - **Sequential or concurrent**: output order is declaration order either way
//! - **Global deadline**: late fields become timeouts without losing the rest
//! - **Configuration as data**: URLs, locators and keyword tables come from TOML

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod error;
pub mod extractors;
mod pipeline;

pub use config::{
    default_fields, ExecutionMode, FieldKind, FieldSpec, NamedUrl, PipelineConfig, SourceKind,
};
pub use error::{ConfigError, PipelineError};
pub use extractors::languages::LanguagesSource;
pub use extractors::links::LinksSource;
pub use extractors::policy::{nsfw_policy_table, PolicySource};
pub use extractors::pricing::PricingSource;
pub use extractors::specialty::SpecialtySource;
pub use extractors::status::StatusSource;
pub use pipeline::{Pipeline, PipelineState};
