//! Server status via a third-party "is it down" checker
//!
//! The field always succeeds. When anything goes wrong, including failing to
//! start a browser at all, the result document carries `Error (<checker>)` as
//! its status, a zero response time and the failure text.

use dossier_domain::clock::{elapsed_seconds, format_timestamp};
use dossier_domain::{Clock, ExtractionOutcome, Locator, RenderSession, SourceError, StatusCheckResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

/// Checker page and the site it should check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusSource {
    /// Checker form URL
    pub checker_url: String,

    /// URL input on the checker form
    pub input: Locator,

    /// Site whose status is checked
    pub target_url: String,

    /// Result indicators in lookup order ("up" before "down")
    pub indicators: Vec<Locator>,
}

impl Default for StatusSource {
    fn default() -> Self {
        Self {
            checker_url: "https://www.isitdownrightnow.com/downorjustme.php".to_string(),
            input: Locator::by_name("url"),
            target_url: "https://www.janitorai.com".to_string(),
            indicators: vec![Locator::by_class("statusup"), Locator::by_class("statusdown")],
        }
    }
}

impl StatusSource {
    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.checker_url.trim().is_empty() || self.target_url.trim().is_empty() {
            return Err("status checker_url and target_url must not be empty".to_string());
        }
        if self.input.is_empty() {
            return Err("status input locator must not be empty".to_string());
        }
        if self.indicators.is_empty() || self.indicators.iter().any(Locator::is_empty) {
            return Err("status needs at least one non-empty indicator".to_string());
        }
        Ok(())
    }

    fn error_result(&self, first_checked: &str, error: &SourceError, clock: &dyn Clock) -> StatusCheckResult {
        StatusCheckResult {
            target_url: self.target_url.clone(),
            first_checked_at: first_checked.to_string(),
            status_text: format!("Error ({})", self.checker_url),
            response_time_seconds: 0.0,
            error: Some(error.to_string()),
            last_checked_at: format_timestamp(&clock.now()),
        }
    }
}

/// Poll the indicators in order until one is present
///
/// Returns the trimmed text of the first present indicator.
async fn first_indicator(
    session: &mut dyn RenderSession,
    indicators: &[Locator],
    timeout: Duration,
    poll_interval: Duration,
) -> Result<String, SourceError> {
    let deadline = Instant::now() + timeout;
    loop {
        for indicator in indicators {
            if let Some(text) = session.extract_all_text(indicator).await?.into_iter().next() {
                debug!("Status indicator {} present", indicator);
                return Ok(text);
            }
        }
        if Instant::now() >= deadline {
            let what = indicators
                .iter()
                .map(Locator::to_string)
                .collect::<Vec<_>>()
                .join(" or ");
            return Err(SourceError::Timeout {
                what,
                timeout_ms: timeout.as_millis() as u64,
            });
        }
        tokio::time::sleep(poll_interval).await;
    }
}

async fn check(
    session: &mut dyn RenderSession,
    source: &StatusSource,
    timeout: Duration,
    poll_interval: Duration,
    clock: &dyn Clock,
) -> Result<(String, f64), SourceError> {
    session.navigate(&source.checker_url).await?;
    session.wait_until_present(&source.input, timeout).await?;

    let submitted_at = clock.now();
    session.type_and_submit(&source.input, &source.target_url).await?;
    let indicator = first_indicator(session, &source.indicators, timeout, poll_interval).await?;
    let detected_at = clock.now();

    Ok((indicator, elapsed_seconds(&submitted_at, &detected_at)))
}

/// Check the target's status through the checker page
pub async fn extract(
    session: &mut dyn RenderSession,
    source: &StatusSource,
    timeout: Duration,
    poll_interval: Duration,
    clock: &dyn Clock,
) -> ExtractionOutcome {
    let first_checked = format_timestamp(&clock.now());

    let result = match check(session, source, timeout, poll_interval, clock).await {
        Ok((indicator, response_time)) => {
            info!("{} reported as '{}' in {}s", source.target_url, indicator, response_time);
            StatusCheckResult {
                target_url: source.target_url.clone(),
                first_checked_at: first_checked,
                status_text: format!("{} ({})", indicator, source.checker_url),
                response_time_seconds: response_time,
                error: None,
                last_checked_at: format_timestamp(&clock.now()),
            }
        }
        Err(e) => source.error_result(&first_checked, &e, clock),
    };
    ExtractionOutcome::from_payload(&result)
}

/// Result document for a check that could not get a browser session
pub fn session_failure(source: &StatusSource, error: &SourceError, clock: &dyn Clock) -> ExtractionOutcome {
    let first_checked = format_timestamp(&clock.now());
    ExtractionOutcome::from_payload(&source.error_result(&first_checked, error, clock))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use dossier_domain::{FixedClock, RenderClient};
    use dossier_render::{MockPage, MockRenderer};
    use serde_json::json;

    const POLL: Duration = Duration::from_millis(250);

    fn clock() -> FixedClock {
        let start = NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        FixedClock::new(start, chrono::Duration::milliseconds(1250))
    }

    fn renderer(result: MockPage) -> MockRenderer {
        let source = StatusSource::default();
        MockRenderer::new().with_page(
            source.checker_url.clone(),
            MockPage::new()
                .with_input(source.input.clone())
                .after_submit(result),
        )
    }

    #[tokio::test]
    async fn test_up_indicator() {
        let renderer = renderer(
            MockPage::new().with_element(Locator::by_class("statusup"), " UP "),
        );
        let mut session = renderer.open_session().await.unwrap();

        let outcome = extract(
            session.as_mut(),
            &StatusSource::default(),
            Duration::from_secs(10),
            POLL,
            &clock(),
        )
        .await;
        let value = outcome.value().unwrap();

        assert_eq!(
            value["status"],
            json!("UP (https://www.isitdownrightnow.com/downorjustme.php)")
        );
        assert_eq!(value["response_time"], json!(1.25));
        assert_eq!(value["error"], json!(null));
        assert_eq!(value["first_checked"], json!("2024-06-01 12:00:00"));
        assert_eq!(value["last_checked"], json!("2024-06-01 12:00:03"));
        assert_eq!(renderer.typed_inputs(), vec!["https://www.janitorai.com"]);
    }

    #[tokio::test]
    async fn test_down_indicator_is_fallback() {
        let renderer = renderer(
            MockPage::new().with_element(Locator::by_class("statusdown"), "DOWN"),
        );
        let mut session = renderer.open_session().await.unwrap();

        let outcome = extract(
            session.as_mut(),
            &StatusSource::default(),
            Duration::from_secs(10),
            POLL,
            &clock(),
        )
        .await;
        let status = outcome.value().unwrap()["status"].as_str().unwrap().to_string();
        assert!(status.starts_with("DOWN ("));
    }

    #[tokio::test(start_paused = true)]
    async fn test_indicator_timeout_yields_error_document() {
        let renderer = renderer(MockPage::new());
        let mut session = renderer.open_session().await.unwrap();

        let outcome = extract(
            session.as_mut(),
            &StatusSource::default(),
            Duration::from_secs(10),
            POLL,
            &clock(),
        )
        .await;
        assert!(outcome.is_success());
        let value = outcome.value().unwrap();

        assert_eq!(value["response_time"], json!(0.0));
        assert!(value["error"].as_str().unwrap().contains("Timed out"));
        assert_eq!(
            value["status"],
            json!("Error (https://www.isitdownrightnow.com/downorjustme.php)")
        );
        assert!(!value["first_checked"].as_str().unwrap().is_empty());
        assert!(!value["last_checked"].as_str().unwrap().is_empty());
    }

    #[test]
    fn test_session_failure_document() {
        let err = SourceError::Session("chrome not found".to_string());
        let outcome = session_failure(&StatusSource::default(), &err, &clock());
        let value = outcome.value().unwrap();
        assert_eq!(value["error"], json!("Browser session error: chrome not found"));
        assert_eq!(value["first_checked"], json!("2024-06-01 12:00:00"));
        assert_eq!(value["last_checked"], json!("2024-06-01 12:00:01"));
    }
}
