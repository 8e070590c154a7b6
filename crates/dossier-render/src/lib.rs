//! Dossier Render Layer
//!
//! Browser-backed implementations of the `RenderClient` / `RenderSession`
//! traits from `dossier-domain`.
//!
//! # Providers
//!
//! - `ChromiumRenderer`: headless Chrome/Chromium via chromiumoxide (feature `chromium`)
//! - `MockRenderer`: scripted pages for deterministic tests
//!
//! Every renderer is obtained through [`create_renderer`], which picks the
//! implementation from a [`BrowserKind`]. Kinds without an adapter are rejected
//! up front with `SourceError::UnsupportedBrowser`, before any page is touched.
//!
//! # Examples
//!
//! ```
//! use dossier_render::{create_renderer, BrowserKind, RenderConfig};
//!
//! let config = RenderConfig {
//!     browser: BrowserKind::Safari,
//!     ..RenderConfig::default()
//! };
//! assert!(create_renderer(&config).is_err());
//! ```

#![warn(missing_docs)]

#[cfg(feature = "chromium")]
pub mod chromium;
pub mod mock;

use dossier_domain::{RenderClient, SourceError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[cfg(feature = "chromium")]
pub use chromium::{find_chromium, ChromiumRenderer};
pub use mock::{MockPage, MockRenderer};

/// Default interval between DOM polls while waiting for an element
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 250;

/// Browser families the configuration can name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
    /// Google Chrome
    Chrome,
    /// Chromium
    Chromium,
    /// Mozilla Firefox (no adapter)
    Firefox,
    /// Apple Safari (no adapter)
    Safari,
}

impl BrowserKind {
    /// Lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            BrowserKind::Chrome => "chrome",
            BrowserKind::Chromium => "chromium",
            BrowserKind::Firefox => "firefox",
            BrowserKind::Safari => "safari",
        }
    }

    /// Whether this kind speaks the Chrome DevTools protocol
    pub fn is_chromium_family(&self) -> bool {
        matches!(self, BrowserKind::Chrome | BrowserKind::Chromium)
    }
}

impl Default for BrowserKind {
    fn default() -> Self {
        BrowserKind::Chrome
    }
}

impl fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BrowserKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "chrome" => Ok(BrowserKind::Chrome),
            "chromium" => Ok(BrowserKind::Chromium),
            "firefox" => Ok(BrowserKind::Firefox),
            "safari" => Ok(BrowserKind::Safari),
            _ => Err(format!("Invalid browser: {}", s)),
        }
    }
}

/// Settings for browser sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Which browser to drive
    pub browser: BrowserKind,

    /// Run without a visible window
    pub headless: bool,

    /// Explicit browser binary; searched for when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executable: Option<PathBuf>,

    /// Interval between DOM polls while waiting (milliseconds)
    pub poll_interval_ms: u64,
}

impl RenderConfig {
    /// Poll interval as a Duration
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            browser: BrowserKind::default(),
            headless: true,
            executable: None,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

/// Build the renderer for `config.browser`
///
/// This is the single place browser selection happens. Firefox and Safari, and
/// Chromium-family kinds in builds without the `chromium` feature, fail with
/// `SourceError::UnsupportedBrowser`.
pub fn create_renderer(config: &RenderConfig) -> Result<Arc<dyn RenderClient>, SourceError> {
    if !config.browser.is_chromium_family() {
        return Err(SourceError::UnsupportedBrowser(format!(
            "{} has no rendering adapter; use chrome or chromium",
            config.browser
        )));
    }

    #[cfg(feature = "chromium")]
    {
        tracing::debug!("Using chromium renderer for {}", config.browser);
        Ok(Arc::new(ChromiumRenderer::new(config.clone())))
    }

    #[cfg(not(feature = "chromium"))]
    {
        Err(SourceError::UnsupportedBrowser(format!(
            "{} support was not compiled in (enable the `chromium` feature)",
            config.browser
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dossier_domain::ErrorKind;

    #[test]
    fn test_browser_kind_parse() {
        assert_eq!("Chrome".parse::<BrowserKind>().unwrap(), BrowserKind::Chrome);
        assert_eq!("safari".parse::<BrowserKind>().unwrap(), BrowserKind::Safari);
        assert!("netscape".parse::<BrowserKind>().is_err());
    }

    #[test]
    fn test_unsupported_browsers_rejected() {
        for browser in [BrowserKind::Firefox, BrowserKind::Safari] {
            let config = RenderConfig {
                browser,
                ..RenderConfig::default()
            };
            match create_renderer(&config) {
                Err(e) => assert_eq!(e.kind(), ErrorKind::UnsupportedBrowser),
                Ok(_) => panic!("{} should be unsupported", browser),
            }
        }
    }

    #[cfg(feature = "chromium")]
    #[test]
    fn test_chromium_family_accepted() {
        let config = RenderConfig::default();
        let renderer = create_renderer(&config).expect("chrome is supported");
        assert_eq!(renderer.name(), "chrome");
    }

    #[test]
    fn test_poll_interval_never_zero() {
        let config = RenderConfig {
            poll_interval_ms: 0,
            ..RenderConfig::default()
        };
        assert_eq!(config.poll_interval(), Duration::from_millis(1));
    }
}
