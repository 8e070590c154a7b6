//! Pipeline orchestrator
//!
//! Runs every declared field, turns every failure into an outcome and folds
//! the outcomes into one record in declaration order.

use crate::config::{ExecutionMode, FieldSpec, PipelineConfig, SourceKind};
use crate::error::PipelineError;
use crate::extractors::{self, ExtractContext};
use dossier_domain::{
    AggregateRecord, Clock, ErrorKind, ExtractionOutcome, HttpFetcher, RecordSink, RenderClient,
};
use futures::FutureExt;
use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Lifecycle of a pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Not running
    Idle,
    /// A run is in progress
    Running,
    /// The last run finished and produced a record
    Completed,
}

/// Adapters and settings shared by every field of a run
#[derive(Clone)]
struct Shared {
    renderer: Arc<dyn RenderClient>,
    fetcher: Arc<dyn HttpFetcher>,
    clock: Arc<dyn Clock>,
    default_timeout_ms: u64,
    poll_interval: Duration,
    deadline: Option<(Instant, Duration)>,
}

/// Multi-source extraction pipeline
///
/// # Examples
///
/// ```no_run
/// use dossier_domain::SystemClock;
/// use dossier_extractor::{Pipeline, PipelineConfig};
/// use dossier_http::{HttpConfig, ReqwestFetcher};
/// use dossier_render::create_renderer;
/// use dossier_store::JsonFileSink;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = PipelineConfig::default();
/// let renderer = create_renderer(&config.render_config())?;
/// let fetcher = Arc::new(ReqwestFetcher::new(&HttpConfig::default())?);
/// let sink = JsonFileSink::new(&config.output_path);
///
/// let mut pipeline = Pipeline::new(config, renderer, fetcher, Arc::new(SystemClock))?;
/// let record = pipeline.run_and_persist(&sink).await?;
/// println!("{} fields, {} failed", record.len(), record.failure_count());
/// # Ok(())
/// # }
/// ```
pub struct Pipeline {
    config: Arc<PipelineConfig>,
    renderer: Arc<dyn RenderClient>,
    fetcher: Arc<dyn HttpFetcher>,
    clock: Arc<dyn Clock>,
    state: PipelineState,
}

impl Pipeline {
    /// Create a pipeline; the configuration is validated here
    pub fn new(
        config: PipelineConfig,
        renderer: Arc<dyn RenderClient>,
        fetcher: Arc<dyn HttpFetcher>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            renderer,
            fetcher,
            clock,
            state: PipelineState::Idle,
        })
    }

    /// Current lifecycle state
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Configuration in use
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Evaluate every field and build the record
    ///
    /// Field failures never abort the run. The only error is a field that
    /// produced no outcome at all.
    pub async fn run(&mut self) -> Result<AggregateRecord, PipelineError> {
        self.state = PipelineState::Idle;
        let run_id = Uuid::now_v7();
        let span = info_span!("pipeline_run", run_id = %run_id);

        self.state = PipelineState::Running;
        let result = self.run_fields().instrument(span).await;
        self.state = match &result {
            Ok(_) => PipelineState::Completed,
            Err(_) => PipelineState::Idle,
        };
        result
    }

    /// Run, then hand the record to `sink` exactly once
    pub async fn run_and_persist(
        &mut self,
        sink: &dyn RecordSink,
    ) -> Result<AggregateRecord, PipelineError> {
        let record = self.run().await?;
        if let Err(e) = sink.persist(&record).await {
            error!("Failed to persist record to {}: {}", sink.destination(), e);
            return Err(e.into());
        }
        info!("Record persisted to {}", sink.destination());
        Ok(record)
    }

    async fn run_fields(&self) -> Result<AggregateRecord, PipelineError> {
        let started = std::time::Instant::now();
        info!(
            "Starting run: {} fields, {:?} mode, browser {}",
            self.config.fields.len(),
            self.config.mode,
            self.renderer.name()
        );

        let shared = Shared {
            renderer: Arc::clone(&self.renderer),
            fetcher: Arc::clone(&self.fetcher),
            clock: Arc::clone(&self.clock),
            default_timeout_ms: self.config.default_timeout_ms,
            poll_interval: self.config.poll_interval(),
            deadline: self.config.deadline().and_then(run_deadline),
        };

        let outcomes = match self.config.mode {
            ExecutionMode::Sequential => self.run_sequential(&shared).await,
            ExecutionMode::Concurrent => self.run_concurrent(&shared).await,
        };

        let mut record = AggregateRecord::new();
        for (field, outcome) in self.config.fields.iter().zip(outcomes) {
            let outcome = outcome.ok_or_else(|| PipelineError::MissingOutcome(field.name.clone()))?;
            record.insert(field.name.clone(), outcome);
        }

        info!(
            "Run complete in {:?}: {} fields, {} failed",
            started.elapsed(),
            record.len(),
            record.failure_count()
        );
        Ok(record)
    }

    async fn run_sequential(&self, shared: &Shared) -> Vec<Option<ExtractionOutcome>> {
        let mut outcomes = Vec::with_capacity(self.config.fields.len());
        for field in &self.config.fields {
            outcomes.push(Some(evaluate(shared, field).await));
        }
        outcomes
    }

    async fn run_concurrent(&self, shared: &Shared) -> Vec<Option<ExtractionOutcome>> {
        let mut tasks = JoinSet::new();
        let mut index_of = HashMap::new();

        for (index, field) in self.config.fields.iter().enumerate() {
            let shared = shared.clone();
            let config = Arc::clone(&self.config);
            let handle = tasks.spawn(
                async move {
                    let field = &config.fields[index];
                    evaluate(&shared, field).await
                }
                .in_current_span(),
            );
            index_of.insert(handle.id(), index);
        }

        let mut outcomes: Vec<Option<ExtractionOutcome>> = vec![None; self.config.fields.len()];
        while let Some(joined) = tasks.join_next_with_id().await {
            match joined {
                Ok((id, outcome)) => {
                    if let Some(&index) = index_of.get(&id) {
                        outcomes[index] = Some(outcome);
                    }
                }
                Err(e) => {
                    if let Some(&index) = index_of.get(&e.id()) {
                        let name = &self.config.fields[index].name;
                        warn!("Field '{}' task failed: {}", name, e);
                        outcomes[index] = Some(ExtractionOutcome::failure(
                            ErrorKind::Internal,
                            format!("Extractor task failed: {}", e),
                        ));
                    }
                }
            }
        }
        outcomes
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Absolute deadline for a run starting now
///
/// A limit too far out to represent as an instant means no deadline.
fn run_deadline(limit: Duration) -> Option<(Instant, Duration)> {
    // the timer rounds deadlines up, so keep a second of headroom
    let at = Instant::now()
        .checked_add(limit)
        .filter(|at| at.checked_add(Duration::from_secs(1)).is_some());
    match at {
        Some(at) => Some((at, limit)),
        None => {
            warn!(
                "Run deadline of {}s is out of range; running without a deadline",
                limit.as_secs()
            );
            None
        }
    }
}

fn deadline_expired(limit: Duration, field: &str) -> ExtractionOutcome {
    ExtractionOutcome::failure(
        ErrorKind::Timeout,
        format!(
            "Run deadline of {}s expired before '{}' completed",
            limit.as_secs(),
            field
        ),
    )
}

/// Await `work` under the run deadline, turning panics and expiry into outcomes
async fn guarded<F>(shared: &Shared, field: &str, work: F) -> ExtractionOutcome
where
    F: Future<Output = ExtractionOutcome>,
{
    let work = AssertUnwindSafe(work).catch_unwind();
    let result = match shared.deadline {
        Some((at, limit)) => match tokio::time::timeout_at(at, work).await {
            Ok(result) => result,
            Err(_) => return deadline_expired(limit, field),
        },
        None => work.await,
    };

    result.unwrap_or_else(|payload| {
        ExtractionOutcome::failure(
            ErrorKind::Internal,
            format!("Extractor panicked: {}", panic_message(payload)),
        )
    })
}

/// Evaluate one field; never fails
async fn evaluate(shared: &Shared, field: &FieldSpec) -> ExtractionOutcome {
    let started = std::time::Instant::now();
    debug!("Evaluating field '{}' ({})", field.name, field.kind.as_str());

    let ctx = ExtractContext {
        timeout: field.timeout(shared.default_timeout_ms),
        poll_interval: shared.poll_interval,
        clock: shared.clock.as_ref(),
    };

    let outcome = match field.source_kind() {
        SourceKind::Http => {
            guarded(
                shared,
                &field.name,
                extractors::run_http(&field.kind, shared.fetcher.as_ref(), &ctx),
            )
            .await
        }
        SourceKind::Rendered => evaluate_rendered(shared, field, &ctx).await,
    };

    match &outcome {
        ExtractionOutcome::Success { .. } => {
            info!("Field '{}' succeeded in {:?}", field.name, started.elapsed())
        }
        ExtractionOutcome::Failure { kind, message } => warn!(
            "Field '{}' failed in {:?}: {} ({})",
            field.name,
            started.elapsed(),
            message,
            kind
        ),
    }
    outcome
}

/// Scoped session: acquire, extract, always close
async fn evaluate_rendered(
    shared: &Shared,
    field: &FieldSpec,
    ctx: &ExtractContext<'_>,
) -> ExtractionOutcome {
    let opened = match shared.deadline {
        Some((at, limit)) => {
            match tokio::time::timeout_at(at, shared.renderer.open_session()).await {
                Ok(opened) => opened,
                Err(_) => return deadline_expired(limit, &field.name),
            }
        }
        None => shared.renderer.open_session().await,
    };

    let mut session = match opened {
        Ok(session) => session,
        Err(e) => {
            warn!("No browser session for '{}': {}", field.name, e);
            return extractors::session_unavailable(&field.kind, &e, ctx.clock);
        }
    };

    let outcome = guarded(
        shared,
        &field.name,
        extractors::run_rendered(&field.kind, session.as_mut(), ctx),
    )
    .await;

    if let Err(e) = session.close().await {
        warn!("Closing session for '{}' failed: {}", field.name, e);
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use dossier_domain::{FixedClock, SystemClock};
    use dossier_http::MockFetcher;
    use dossier_render::MockRenderer;

    fn pipeline(config: PipelineConfig) -> Result<Pipeline, PipelineError> {
        Pipeline::new(
            config,
            Arc::new(MockRenderer::new()),
            Arc::new(MockFetcher::new()),
            Arc::new(SystemClock),
        )
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = PipelineConfig::default();
        config.fields.clear();
        assert!(matches!(pipeline(config), Err(PipelineError::Config(_))));
    }

    #[test]
    fn test_new_pipeline_is_idle() {
        let pipeline = pipeline(PipelineConfig::default()).unwrap();
        assert_eq!(pipeline.state(), PipelineState::Idle);
    }

    #[test]
    fn test_panic_message() {
        assert_eq!(panic_message(Box::new("boom")), "boom");
        assert_eq!(panic_message(Box::new("bang".to_string())), "bang");
        assert_eq!(panic_message(Box::new(7u8)), "unknown panic");
    }

    #[test]
    fn test_out_of_range_deadline_is_dropped() {
        assert!(run_deadline(Duration::from_secs(u64::MAX)).is_none());
        assert!(run_deadline(Duration::from_secs(i64::MAX as u64)).is_none());
        let (_, limit) = run_deadline(Duration::from_secs(120)).unwrap();
        assert_eq!(limit, Duration::from_secs(120));
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_deadline_still_produces_record() {
        for deadline_secs in [u64::MAX, i64::MAX as u64] {
            let config = PipelineConfig {
                deadline_secs: Some(deadline_secs),
                ..PipelineConfig::default()
            };
            let mut pipeline = pipeline(config).unwrap();
            let record = pipeline.run().await.unwrap();
            assert_eq!(record.len(), 6);
            assert_eq!(pipeline.state(), PipelineState::Completed);
        }

        let config = PipelineConfig::from_toml("deadline_secs = 9223372036854775807\n").unwrap();
        let mut pipeline = pipeline(config).unwrap();
        assert_eq!(pipeline.run().await.unwrap().len(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_deadline_is_timeout() {
        let shared = Shared {
            renderer: Arc::new(MockRenderer::new()),
            fetcher: Arc::new(MockFetcher::new()),
            clock: Arc::new(FixedClock::frozen(chrono::NaiveDateTime::default())),
            default_timeout_ms: 1_000,
            poll_interval: Duration::from_millis(250),
            deadline: Some((Instant::now(), Duration::from_secs(0))),
        };
        let outcome = guarded(&shared, "x", futures::future::pending()).await;
        assert_eq!(outcome.error_kind(), Some(ErrorKind::Timeout));
    }
}
