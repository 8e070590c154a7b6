//! Run command implementation.

use crate::cli::RunArgs;
use crate::config;
use crate::error::Result;
use crate::output::Formatter;
use dossier_domain::SystemClock;
use dossier_extractor::Pipeline;
use dossier_http::{HttpConfig, ReqwestFetcher};
use dossier_render::create_renderer;
use dossier_store::JsonFileSink;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Execute the run command.
///
/// Succeeds whenever the record was persisted, even if some fields failed.
pub async fn execute_run(
    args: RunArgs,
    config_path: Option<&Path>,
    formatter: &Formatter,
) -> Result<()> {
    let mut config = config::load(config_path)?;
    config::apply_overrides(&mut config, &args);
    config.validate()?;

    info!(
        "Running {} field(s) with {} ({} mode)",
        config.fields.len(),
        config.browser,
        config.mode
    );

    let renderer = create_renderer(&config.render_config())?;
    let fetcher = Arc::new(ReqwestFetcher::new(&HttpConfig::default())?);
    let sink = JsonFileSink::new(&config.output_path);

    let mut pipeline = Pipeline::new(config, renderer, fetcher, Arc::new(SystemClock))?;
    let record = pipeline.run_and_persist(&sink).await?;

    if record.failure_count() > 0 {
        warn!(
            "{} of {} field(s) failed; see the record for details",
            record.failure_count(),
            record.len()
        );
    }

    println!("{}", formatter.format_run(&record, sink.path())?);
    Ok(())
}
