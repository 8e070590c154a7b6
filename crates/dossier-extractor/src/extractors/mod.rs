//! Field extractors
//!
//! Every extractor is its own failure boundary: whatever goes wrong inside it
//! comes back as an [`ExtractionOutcome`], never as an error or a panic
//! escaping to the orchestrator.

pub mod languages;
pub mod links;
pub mod policy;
pub mod pricing;
pub mod specialty;
pub mod status;

use crate::config::FieldKind;
use dossier_domain::{Clock, ErrorKind, ExtractionOutcome, HttpFetcher, RenderSession, SourceError};
use std::time::Duration;

/// Shared inputs for one extractor invocation
pub(crate) struct ExtractContext<'a> {
    pub timeout: Duration,
    pub poll_interval: Duration,
    pub clock: &'a dyn Clock,
}

/// Run a browser-backed field against an open session
pub(crate) async fn run_rendered(
    kind: &FieldKind,
    session: &mut dyn RenderSession,
    ctx: &ExtractContext<'_>,
) -> ExtractionOutcome {
    match kind {
        FieldKind::Specialty(source) => specialty::extract(session, source, ctx.timeout).await,
        FieldKind::Pricing(source) => pricing::extract(session, source, ctx.timeout).await,
        FieldKind::Status(source) => {
            status::extract(session, source, ctx.timeout, ctx.poll_interval, ctx.clock).await
        }
        FieldKind::Languages(source) => languages::extract(session, source, ctx.timeout).await,
        FieldKind::Policy(_) | FieldKind::Links(_) => ExtractionOutcome::failure(
            ErrorKind::Internal,
            "HTTP field dispatched to a browser session",
        ),
    }
}

/// Run a plain-HTTP field
pub(crate) async fn run_http(
    kind: &FieldKind,
    fetcher: &dyn HttpFetcher,
    ctx: &ExtractContext<'_>,
) -> ExtractionOutcome {
    match kind {
        FieldKind::Policy(source) => policy::extract(fetcher, source, ctx.timeout).await,
        FieldKind::Links(source) => links::extract(fetcher, source, ctx.timeout).await,
        _ => ExtractionOutcome::failure(
            ErrorKind::Internal,
            "browser field dispatched to the HTTP client",
        ),
    }
}

/// Outcome for a browser-backed field whose session could not be opened
pub(crate) fn session_unavailable(
    kind: &FieldKind,
    error: &SourceError,
    clock: &dyn Clock,
) -> ExtractionOutcome {
    match kind {
        FieldKind::Status(source) => status::session_failure(source, error, clock),
        _ => ExtractionOutcome::from_error(error),
    }
}
