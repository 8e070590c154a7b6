//! Keyword classifier
//!
//! Maps free text onto at most one category of an ordered table. Pure and
//! deterministic: no I/O, no dependency on any source adapter.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name reported when no category matches
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// One category and the keywords that select it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Category name, reported verbatim
    pub name: String,

    /// Lowercase keywords; any substring hit selects the category
    pub keywords: Vec<String>,
}

/// Ordered category -> keyword table
///
/// Declaration order is the tie-break priority: when text contains keywords
/// from several categories, the earliest declared category wins.
///
/// # Examples
///
/// ```
/// use dossier_domain::{classify, ClassificationTable};
///
/// let table = ClassificationTable::new()
///     .with_category("Advertised", ["explicit content", "nudity"])
///     .with_category("Prohibited", ["banned"]);
///
/// assert_eq!(classify("Explicit Content is banned", &table).as_str(), "Advertised");
/// assert_eq!(classify("nothing here", &table).as_str(), "Unknown");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassificationTable {
    categories: Vec<Category>,
}

impl ClassificationTable {
    /// Empty table (classifies everything as unknown)
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a category; keywords are lowercased here so matching only
    /// lowercases the text
    pub fn with_category<I, S>(mut self, name: impl Into<String>, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.categories.push(Category {
            name: name.into(),
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().to_lowercase())
                .collect(),
        });
        self
    }

    /// Categories in priority order
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Number of categories
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Whether the table has no categories
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Re-lowercase keywords, e.g. after deserializing hand-written config
    pub fn normalized(self) -> Self {
        let categories = self
            .categories
            .into_iter()
            .map(|c| Category {
                name: c.name,
                keywords: c.keywords.iter().map(|k| k.to_lowercase()).collect(),
            })
            .collect();
        Self { categories }
    }
}

/// Result of [`classify`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification<'a> {
    /// First matching category in table order
    Matched(&'a str),

    /// No keyword of any category occurred in the text
    Unknown,
}

impl<'a> Classification<'a> {
    /// Category name, or `"Unknown"`
    pub fn as_str(&self) -> &'a str {
        match self {
            Classification::Matched(name) => name,
            Classification::Unknown => UNKNOWN_CATEGORY,
        }
    }

    /// Whether a category matched
    pub fn is_known(&self) -> bool {
        matches!(self, Classification::Matched(_))
    }
}

impl fmt::Display for Classification<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify `text` against `table`
pub fn classify<'a>(text: &str, table: &'a ClassificationTable) -> Classification<'a> {
    let text = text.to_lowercase();
    table
        .categories
        .iter()
        .find(|category| {
            category
                .keywords
                .iter()
                .any(|keyword| !keyword.is_empty() && text.contains(keyword.as_str()))
        })
        .map(|category| Classification::Matched(category.name.as_str()))
        .unwrap_or(Classification::Unknown)
}
