//! Supported languages, read from the paragraph after a marker paragraph

use dossier_domain::{ErrorKind, ExtractionOutcome, Locator, RenderSession, SourceError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const CONTAINER: &str = "div.markdown.prose.w-full.break-words";

/// Article holding the language list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguagesSource {
    /// Article URL
    pub url: String,

    /// Article body
    pub container: Locator,

    /// Paragraphs inside the article body, in document order
    pub paragraphs: Locator,

    /// Case-sensitive text identifying the header paragraph
    pub marker: String,
}

impl Default for LanguagesSource {
    fn default() -> Self {
        Self {
            url: "https://www.pompanobeachhigh.com/default/what-languages-does-janitor-ai-chat-support"
                .to_string(),
            container: Locator::css(CONTAINER),
            paragraphs: Locator::css(format!("{} p", CONTAINER)),
            marker: "Broad".to_string(),
        }
    }
}

impl LanguagesSource {
    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.url.trim().is_empty() || self.marker.is_empty() {
            return Err("languages url and marker must not be empty".to_string());
        }
        if self.container.is_empty() || self.paragraphs.is_empty() {
            return Err("languages locators must not be empty".to_string());
        }
        Ok(())
    }
}

/// Paragraph following the first one that contains `marker`
fn after_marker<'a>(paragraphs: &'a [String], marker: &str) -> Result<&'a str, &'static str> {
    let header = paragraphs
        .iter()
        .position(|p| p.contains(marker))
        .ok_or("Header with specified text not found")?;
    paragraphs
        .get(header + 1)
        .map(|p| p.trim())
        .ok_or("No paragraph found after the header")
}

/// Read the language list from the article
pub async fn extract(
    session: &mut dyn RenderSession,
    source: &LanguagesSource,
    timeout: Duration,
) -> ExtractionOutcome {
    if let Err(e) = session.navigate(&source.url).await {
        return e.into();
    }

    match session.wait_until_present(&source.container, timeout).await {
        Ok(()) => {}
        Err(SourceError::Timeout { .. }) => {
            return ExtractionOutcome::failure(ErrorKind::NotFound, "Article body not found")
        }
        Err(e) => return e.into(),
    }

    let paragraphs = match session.extract_all_text(&source.paragraphs).await {
        Ok(paragraphs) => paragraphs,
        Err(e) => return e.into(),
    };

    match after_marker(&paragraphs, &source.marker) {
        Ok(text) => ExtractionOutcome::success(text),
        Err(message) => ExtractionOutcome::failure(ErrorKind::NotFound, message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dossier_domain::RenderClient;
    use dossier_render::{MockPage, MockRenderer};
    use serde_json::json;

    async fn run(page: MockPage) -> ExtractionOutcome {
        let source = LanguagesSource::default();
        let renderer = MockRenderer::new().with_page(source.url.clone(), page);
        let mut session = renderer.open_session().await.unwrap();
        extract(session.as_mut(), &source, Duration::from_secs(10)).await
    }

    fn article(paragraphs: &[&str]) -> MockPage {
        let source = LanguagesSource::default();
        MockPage::new()
            .with_element(source.container.clone(), "")
            .with_elements(source.paragraphs.clone(), paragraphs.iter().copied())
    }

    #[tokio::test]
    async fn test_reads_paragraph_after_marker() {
        let outcome = run(article(&[
            "Intro",
            "Broad language coverage",
            "  English, Spanish, French  ",
            "Outro",
        ]))
        .await;
        assert_eq!(outcome.value(), Some(&json!("English, Spanish, French")));
    }

    #[tokio::test]
    async fn test_marker_is_case_sensitive() {
        let outcome = run(article(&["broad support", "English"])).await;
        assert_eq!(
            outcome.error_message(),
            Some("Header with specified text not found")
        );
    }

    #[tokio::test]
    async fn test_marker_is_last_paragraph() {
        let outcome = run(article(&["Intro", "Broad"])).await;
        assert_eq!(outcome.error_kind(), Some(ErrorKind::NotFound));
        assert_eq!(
            outcome.error_message(),
            Some("No paragraph found after the header")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_container() {
        let outcome = run(MockPage::new()).await;
        assert_eq!(outcome.error_kind(), Some(ErrorKind::NotFound));
        assert_eq!(outcome.to_document(), json!({ "error": "Article body not found" }));
    }
}
