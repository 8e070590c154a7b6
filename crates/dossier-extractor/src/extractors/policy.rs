//! Content-policy classification over a set of policy documents

use crate::config::NamedUrl;
use dossier_domain::{
    classify, ClassificationTable, ExtractionOutcome, HttpFetcher, PolicyDocumentSummary,
};
use futures::future::join_all;
use indexmap::IndexMap;
use scraper::Html;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Category reported for a document that could not be fetched
pub const ERROR_CATEGORY: &str = "Error";

/// Documents to classify and the table to classify them with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicySource {
    /// Policy documents, in output order
    pub documents: Vec<NamedUrl>,

    /// Categories in priority order
    pub categories: ClassificationTable,
}

/// The three-tier NSFW table: advertised, tolerated, prohibited
pub fn nsfw_policy_table() -> ClassificationTable {
    ClassificationTable::new()
        .with_category(
            "Advertised",
            ["explicit content", "nsfw content", "adult content", "nudity"],
        )
        .with_category(
            "Allowed but not advertised",
            [
                "content moderation",
                "user responsibility",
                "user-generated content",
            ],
        )
        .with_category(
            "Prohibited",
            [
                "prohibited content",
                "restricted content",
                "no adult content",
                "banned",
            ],
        )
}

impl Default for PolicySource {
    fn default() -> Self {
        Self {
            documents: vec![
                NamedUrl::new("privacy_policy", "https://janitorai.com/policy"),
                NamedUrl::new("terms_of_service", "https://janitorai.com/term"),
                NamedUrl::new("faqs", "https://janitorai.com/faq"),
                NamedUrl::new("community_guidelines", "https://janitorai.com/community"),
            ],
            categories: nsfw_policy_table(),
        }
    }
}

impl PolicySource {
    pub(crate) fn validate(&self) -> Result<(), String> {
        NamedUrl::validate_all("policy document", &self.documents)?;
        if self.categories.is_empty() {
            return Err("policy classification table must not be empty".to_string());
        }
        Ok(())
    }
}

/// Visible text of an HTML document, text nodes joined by spaces
pub fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    document.root_element().text().collect::<Vec<_>>().join(" ")
}

fn summarize(url: &str, text: &str, table: &ClassificationTable) -> PolicyDocumentSummary {
    let category = classify(&text.to_lowercase(), table);
    let summary = if category.is_known() {
        format!(
            "Policy mentions NSFW-related terms under '{}' category.",
            category
        )
    } else {
        "No specific NSFW policy details found.".to_string()
    };
    PolicyDocumentSummary {
        url: url.to_string(),
        nsfw_policy_category: category.as_str().to_string(),
        summary,
    }
}

async fn summarize_document(
    fetcher: &dyn HttpFetcher,
    document: &NamedUrl,
    table: &ClassificationTable,
    timeout: Duration,
) -> PolicyDocumentSummary {
    match fetcher.fetch_text(&document.url, timeout).await {
        Ok(page) => {
            let summary = summarize(&document.url, &visible_text(&page.body), table);
            debug!(
                "Policy '{}' classified as {}",
                document.name, summary.nsfw_policy_category
            );
            summary
        }
        Err(e) => {
            warn!("Policy '{}' could not be fetched: {}", document.name, e);
            PolicyDocumentSummary {
                url: document.url.clone(),
                nsfw_policy_category: ERROR_CATEGORY.to_string(),
                summary: format!("Error fetching policy: {}", e),
            }
        }
    }
}

/// Fetch and classify every document
///
/// Always succeeds: a document that fails to load is reported with the
/// `Error` category and the remaining documents are unaffected.
pub async fn extract(
    fetcher: &dyn HttpFetcher,
    source: &PolicySource,
    timeout: Duration,
) -> ExtractionOutcome {
    let summaries = join_all(
        source
            .documents
            .iter()
            .map(|doc| summarize_document(fetcher, doc, &source.categories, timeout)),
    )
    .await;

    let by_name: IndexMap<&str, PolicyDocumentSummary> = source
        .documents
        .iter()
        .map(|doc| doc.name.as_str())
        .zip(summaries)
        .collect();
    ExtractionOutcome::from_payload(&by_name)
}
