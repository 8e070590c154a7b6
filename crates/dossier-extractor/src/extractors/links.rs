//! Link health for a static registry of product links

use crate::config::NamedUrl;
use dossier_domain::{ExtractionOutcome, HttpFetcher, LinkEntry};
use futures::future::join_all;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Registry of links to validate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinksSource {
    /// Links, in output order
    pub links: Vec<NamedUrl>,
}

impl Default for LinksSource {
    fn default() -> Self {
        Self {
            links: vec![
                NamedUrl::new("privacy_policy", "https://janitorai.com/policy"),
                NamedUrl::new("terms_of_service", "https://janitorai.com/term"),
                NamedUrl::new("faqs", "https://janitorai.com/faq"),
                NamedUrl::new("guidelines", "https://janitorai.com/community"),
                NamedUrl::new("janitorai_updates", "https://janitorai.com/updates"),
                NamedUrl::new(
                    "janitorai_twitter_profile",
                    "https://twitter.com/janitoraicom",
                ),
                NamedUrl::new(
                    "janitorai_subreddit",
                    "https://www.reddit.com/r/JanitorAI_Official/",
                ),
            ],
        }
    }
}

impl LinksSource {
    pub(crate) fn validate(&self) -> Result<(), String> {
        NamedUrl::validate_all("link", &self.links)
    }
}

async fn check(fetcher: &dyn HttpFetcher, link: &NamedUrl, timeout: Duration) -> LinkEntry {
    match fetcher.fetch_text(&link.url, timeout).await {
        Ok(page) => LinkEntry::valid(&link.url, page.status),
        Err(e) => {
            debug!("Link '{}' is invalid: {}", link.name, e);
            LinkEntry::invalid(&link.url, e.to_string())
        }
    }
}

/// Check every link independently; the field itself always succeeds
pub async fn extract(
    fetcher: &dyn HttpFetcher,
    source: &LinksSource,
    timeout: Duration,
) -> ExtractionOutcome {
    let entries = join_all(
        source
            .links
            .iter()
            .map(|link| check(fetcher, link, timeout)),
    )
    .await;

    let by_name: IndexMap<&str, LinkEntry> = source
        .links
        .iter()
        .map(|link| link.name.as_str())
        .zip(entries)
        .collect();
    ExtractionOutcome::from_payload(&by_name)
}
