//! Product specialty: the paragraphs that follow a known anchor on a review page

use dossier_domain::{ExtractionOutcome, Locator, RenderSession, SourceError};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const ANCHOR_XPATH: &str =
    "/html/body/div[2]/div/section[1]/div/div/div/section/div/div[1]/div/div[5]/div/p[5]";

/// Where the specialty text lives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecialtySource {
    /// Article URL
    pub url: String,

    /// Element whose following siblings hold the text
    pub anchor: Locator,

    /// Following siblings of the anchor, in document order
    pub siblings: Locator,

    /// How many siblings to collect
    pub sibling_count: usize,
}

impl Default for SpecialtySource {
    fn default() -> Self {
        Self {
            url: "https://www.technoyuga.com/blog/janitor-ai/#What_is_Janitor_AI.com".to_string(),
            anchor: Locator::xpath(ANCHOR_XPATH),
            siblings: Locator::xpath(format!("{}/following-sibling::*", ANCHOR_XPATH)),
            sibling_count: 5,
        }
    }
}

impl SpecialtySource {
    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.url.trim().is_empty() {
            return Err("specialty url must not be empty".to_string());
        }
        if self.anchor.is_empty() || self.siblings.is_empty() {
            return Err("specialty locators must not be empty".to_string());
        }
        Ok(())
    }
}

/// Collect up to `sibling_count` sibling texts after the anchor, joined by newlines
pub async fn extract(
    session: &mut dyn RenderSession,
    source: &SpecialtySource,
    timeout: Duration,
) -> ExtractionOutcome {
    match collect(session, source, timeout).await {
        Ok(text) => ExtractionOutcome::success(text),
        Err(e) => e.into(),
    }
}

async fn collect(
    session: &mut dyn RenderSession,
    source: &SpecialtySource,
    timeout: Duration,
) -> Result<String, SourceError> {
    session.navigate(&source.url).await?;
    session.wait_until_present(&source.anchor, timeout).await?;

    let siblings = session.extract_all_text(&source.siblings).await?;
    debug!("Anchor has {} following siblings", siblings.len());

    let text = siblings
        .iter()
        .map(|s| s.trim())
        .take(source.sibling_count)
        .collect::<Vec<_>>()
        .join("\n");
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dossier_domain::{ErrorKind, RenderClient};
    use dossier_render::{MockPage, MockRenderer};
    use serde_json::json;

    fn source() -> SpecialtySource {
        SpecialtySource {
            url: "https://review.test/".to_string(),
            anchor: Locator::css("p.anchor"),
            siblings: Locator::css("p.anchor ~ *"),
            sibling_count: 2,
        }
    }

    #[tokio::test]
    async fn test_takes_first_k_siblings() {
        let renderer = MockRenderer::new().with_page(
            "https://review.test/",
            MockPage::new()
                .with_element(Locator::css("p.anchor"), "What is it?")
                .with_elements(Locator::css("p.anchor ~ *"), [" One ", "Two", "Three"]),
        );
        let mut session = renderer.open_session().await.unwrap();

        let outcome = extract(session.as_mut(), &source(), Duration::from_secs(1)).await;
        assert_eq!(outcome.value(), Some(&json!("One\nTwo")));
    }

    #[tokio::test]
    async fn test_no_siblings_is_empty_string() {
        let renderer = MockRenderer::new().with_page(
            "https://review.test/",
            MockPage::new().with_element(Locator::css("p.anchor"), "Alone"),
        );
        let mut session = renderer.open_session().await.unwrap();

        let outcome = extract(session.as_mut(), &source(), Duration::from_secs(1)).await;
        assert_eq!(outcome.value(), Some(&json!("")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_anchor_times_out() {
        let renderer = MockRenderer::new().with_page("https://review.test/", MockPage::new());
        let mut session = renderer.open_session().await.unwrap();

        let outcome = extract(session.as_mut(), &source(), Duration::from_secs(10)).await;
        assert_eq!(outcome.error_kind(), Some(ErrorKind::Timeout));
    }

    #[test]
    fn test_default_siblings_follow_anchor() {
        let source = SpecialtySource::default();
        assert!(source
            .siblings
            .selector()
            .starts_with(source.anchor.selector()));
        assert!(source.validate().is_ok());
    }
}
