//! Pricing snippet from a web search

use dossier_domain::{ExtractionOutcome, Locator, RenderSession, SourceError};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

/// Search engine page and the query to run on it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingSource {
    /// Search engine home page
    pub search_url: String,

    /// Search box
    pub input: Locator,

    /// Query text
    pub query: String,

    /// Result snippets; the first one is returned
    pub snippet: Locator,
}

impl Default for PricingSource {
    fn default() -> Self {
        Self {
            search_url: "https://www.google.com/".to_string(),
            input: Locator::by_name("q"),
            query: "janitorai pricing".to_string(),
            snippet: Locator::css("div.VwiC3b"),
        }
    }
}

impl PricingSource {
    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.search_url.trim().is_empty() || self.query.trim().is_empty() {
            return Err("pricing search_url and query must not be empty".to_string());
        }
        if self.input.is_empty() || self.snippet.is_empty() {
            return Err("pricing locators must not be empty".to_string());
        }
        Ok(())
    }
}

/// Run the search and return the first snippet's text
pub async fn extract(
    session: &mut dyn RenderSession,
    source: &PricingSource,
    timeout: Duration,
) -> ExtractionOutcome {
    match search(session, source, timeout).await {
        Ok(snippet) => {
            info!("Pricing snippet: {}", snippet);
            ExtractionOutcome::success(snippet)
        }
        Err(e) => e.into(),
    }
}

async fn search(
    session: &mut dyn RenderSession,
    source: &PricingSource,
    timeout: Duration,
) -> Result<String, SourceError> {
    session.navigate(&source.search_url).await?;
    session.wait_until_present(&source.input, timeout).await?;
    session.type_and_submit(&source.input, &source.query).await?;
    session.wait_until_present(&source.snippet, timeout).await?;
    session.extract_text(&source.snippet).await
}
