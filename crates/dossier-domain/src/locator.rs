//! Locators - site-specific element selectors

use serde::{Deserialize, Serialize};
use std::fmt;

/// How to find an element on a rendered page
///
/// Locators are configuration data. In TOML they are written as an inline table
/// with a single key:
///
/// ```toml
/// anchor = { xpath = "/html/body/div[2]/p[5]" }
/// snippet = { css = "div.VwiC3b" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locator {
    /// CSS selector
    Css(String),

    /// XPath expression
    XPath(String),
}

impl Locator {
    /// CSS selector locator
    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css(selector.into())
    }

    /// XPath locator
    pub fn xpath(expression: impl Into<String>) -> Self {
        Locator::XPath(expression.into())
    }

    /// Match an element by its `name` attribute
    ///
    /// ```
    /// use dossier_domain::Locator;
    ///
    /// assert_eq!(Locator::by_name("q"), Locator::css("[name=\"q\"]"));
    /// ```
    pub fn by_name(name: &str) -> Self {
        Locator::Css(format!("[name=\"{}\"]", name))
    }

    /// Match an element by a single class name
    pub fn by_class(class: &str) -> Self {
        Locator::Css(format!(".{}", class))
    }

    /// The raw selector or expression
    pub fn selector(&self) -> &str {
        match self {
            Locator::Css(s) | Locator::XPath(s) => s,
        }
    }

    /// Whether the locator is blank
    pub fn is_empty(&self) -> bool {
        self.selector().trim().is_empty()
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Css(s) => write!(f, "css `{}`", s),
            Locator::XPath(s) => write!(f, "xpath `{}`", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helpers() {
        assert_eq!(Locator::by_class("statusup"), Locator::css(".statusup"));
        assert_eq!(Locator::xpath("//p").selector(), "//p");
        assert!(Locator::css("  ").is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(Locator::css("div.a").to_string(), "css `div.a`");
        assert_eq!(Locator::xpath("//p[1]").to_string(), "xpath `//p[1]`");
    }

    #[test]
    fn test_serde_externally_tagged() {
        let json = serde_json::to_string(&Locator::xpath("//p")).unwrap();
        assert_eq!(json, r#"{"xpath":"//p"}"#);
        let parsed: Locator = serde_json::from_str(r#"{"css":"div.x"}"#).unwrap();
        assert_eq!(parsed, Locator::css("div.x"));
    }
}
