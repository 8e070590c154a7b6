//! Chromium-based renderer using chromiumoxide.
//!
//! Every session launches its own browser process so sessions never share
//! cookies, tabs or driver state.

use crate::RenderConfig;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use dossier_domain::{Locator, RenderClient, RenderSession, SourceError};
use futures::StreamExt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Environment variable naming an explicit browser binary
pub const CHROMIUM_PATH_ENV: &str = "DOSSIER_CHROMIUM_PATH";

/// Find a Chrome/Chromium binary.
pub fn find_chromium() -> Option<PathBuf> {
    // 1. DOSSIER_CHROMIUM_PATH env
    if let Ok(p) = std::env::var(CHROMIUM_PATH_ENV) {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    // 2. System PATH
    for name in [
        "google-chrome",
        "google-chrome-stable",
        "chromium",
        "chromium-browser",
    ] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    // 3. Common macOS location
    if cfg!(target_os = "macos") {
        let common = PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

/// Chromium-backed [`RenderClient`].
pub struct ChromiumRenderer {
    config: RenderConfig,
    active_count: Arc<AtomicUsize>,
}

impl ChromiumRenderer {
    /// Create a renderer; no browser is launched until a session is opened
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            active_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of sessions opened and not yet closed
    pub fn active_sessions(&self) -> usize {
        self.active_count.load(Ordering::Relaxed)
    }

    fn executable(&self) -> Result<PathBuf, SourceError> {
        if let Some(path) = &self.config.executable {
            return Ok(path.clone());
        }
        find_chromium().ok_or_else(|| {
            SourceError::Session(format!(
                "{} binary not found; install it or set {}",
                self.config.browser, CHROMIUM_PATH_ENV
            ))
        })
    }
}

#[async_trait]
impl RenderClient for ChromiumRenderer {
    async fn open_session(&self) -> Result<Box<dyn RenderSession>, SourceError> {
        let executable = self.executable()?;

        let mut builder = BrowserConfig::builder()
            .chrome_executable(executable)
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions");
        if !self.config.headless {
            builder = builder.with_head();
        }
        let browser_config = builder
            .build()
            .map_err(|e| SourceError::Session(format!("invalid browser config: {}", e)))?;

        let (mut browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| SourceError::Session(format!("failed to launch {}: {}", self.config.browser, e)))?;

        // Drive the CDP event loop until the connection drops
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                // Tear down what was started so a failed acquisition leaves nothing behind
                let _ = browser.close().await;
                let _ = browser.wait().await;
                handler_task.abort();
                return Err(SourceError::Session(format!("failed to open tab: {}", e)));
            }
        };

        self.active_count.fetch_add(1, Ordering::Relaxed);
        debug!("Opened {} session", self.config.browser);

        Ok(Box::new(ChromiumSession {
            browser: Some(browser),
            page: Some(page),
            handler_task: Some(handler_task),
            poll_interval: self.config.poll_interval(),
            active_count: Arc::clone(&self.active_count),
        }))
    }

    fn name(&self) -> &str {
        self.config.browser.as_str()
    }
}

/// A single browser process with one tab.
pub struct ChromiumSession {
    browser: Option<Browser>,
    page: Option<Page>,
    handler_task: Option<JoinHandle<()>>,
    poll_interval: Duration,
    active_count: Arc<AtomicUsize>,
}

impl ChromiumSession {
    fn page(&self) -> Result<&Page, SourceError> {
        self.page
            .as_ref()
            .ok_or_else(|| SourceError::Session("session already closed".to_string()))
    }

    /// All elements matching `locator`; lookup errors count as no match
    async fn find_all(&self, locator: &Locator) -> Result<Vec<Element>, SourceError> {
        let page = self.page()?;
        let found = match locator {
            Locator::Css(selector) => page.find_elements(selector.as_str()).await,
            Locator::XPath(expression) => page.find_xpaths(expression.as_str()).await,
        };
        match found {
            Ok(elements) => Ok(elements),
            Err(e) => {
                debug!("Lookup of {} failed: {}", locator, e);
                Ok(Vec::new())
            }
        }
    }

    async fn find_first(&self, locator: &Locator) -> Result<Element, SourceError> {
        self.find_all(locator)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| SourceError::NotFound(locator.to_string()))
    }
}

async fn element_text(element: &Element) -> String {
    match element.inner_text().await {
        Ok(Some(text)) => text.trim().to_string(),
        Ok(None) => String::new(),
        Err(e) => {
            debug!("Failed to read element text: {}", e);
            String::new()
        }
    }
}

#[async_trait]
impl RenderSession for ChromiumSession {
    async fn navigate(&mut self, url: &str) -> Result<(), SourceError> {
        let page = self.page()?;
        page.goto(url).await.map_err(|e| SourceError::Navigation {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        // Best effort: some pages never fire a second load event
        let _ = page.wait_for_navigation().await;
        Ok(())
    }

    async fn wait_until_present(
        &mut self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<(), SourceError> {
        let deadline = Instant::now() + timeout;
        loop {
            if !self.find_all(locator).await?.is_empty() {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(SourceError::Timeout {
                    what: locator.to_string(),
                    timeout_ms: timeout.as_millis() as u64,
                });
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn extract_text(&mut self, locator: &Locator) -> Result<String, SourceError> {
        let element = self.find_first(locator).await?;
        Ok(element_text(&element).await)
    }

    async fn extract_all_text(&mut self, locator: &Locator) -> Result<Vec<String>, SourceError> {
        let elements = self.find_all(locator).await?;
        let mut texts = Vec::with_capacity(elements.len());
        for element in &elements {
            texts.push(element_text(element).await);
        }
        Ok(texts)
    }

    async fn type_and_submit(&mut self, locator: &Locator, text: &str) -> Result<(), SourceError> {
        let element = self.find_first(locator).await?;
        let interaction = |e: chromiumoxide::error::CdpError| {
            SourceError::NotFound(format!("{} could not be used as an input: {}", locator, e))
        };

        element.click().await.map_err(interaction)?;
        element
            .call_js_fn("function() { this.value = ''; }", false)
            .await
            .map_err(interaction)?;
        element.type_str(text).await.map_err(interaction)?;
        element.press_key("Enter").await.map_err(interaction)?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), SourceError> {
        let Some(page) = self.page.take() else {
            return Ok(());
        };
        if let Err(e) = page.close().await {
            debug!("Closing tab failed: {}", e);
        }
        if let Some(mut browser) = self.browser.take() {
            if let Err(e) = browser.close().await {
                warn!("Closing browser failed: {}", e);
            }
            let _ = browser.wait().await;
        }
        if let Some(task) = self.handler_task.take() {
            task.abort();
        }
        self.active_count.fetch_sub(1, Ordering::Relaxed);
        debug!("Closed browser session");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BrowserKind;

    #[test]
    fn test_explicit_executable_wins() {
        let renderer = ChromiumRenderer::new(RenderConfig {
            executable: Some(PathBuf::from("/opt/chrome/chrome")),
            ..RenderConfig::default()
        });
        assert_eq!(
            renderer.executable().unwrap(),
            PathBuf::from("/opt/chrome/chrome")
        );
        assert_eq!(renderer.active_sessions(), 0);
    }

    #[test]
    fn test_renderer_name() {
        let renderer = ChromiumRenderer::new(RenderConfig {
            browser: BrowserKind::Chromium,
            ..RenderConfig::default()
        });
        assert_eq!(renderer.name(), "chromium");
    }

    #[tokio::test]
    #[ignore] // Requires Chrome or Chromium to be installed
    async fn test_chromium_session_round_trip() {
        let renderer = ChromiumRenderer::new(RenderConfig::default());
        let mut session = renderer.open_session().await.expect("failed to launch");

        session
            .navigate("data:text/html,<div id='a'><p>One</p><p>Two</p></div><input name='q'>")
            .await
            .expect("navigation failed");
        session
            .wait_until_present(&Locator::css("#a"), Duration::from_secs(5))
            .await
            .expect("element missing");

        let texts = session
            .extract_all_text(&Locator::xpath("//div[@id='a']/p"))
            .await
            .unwrap();
        assert_eq!(texts, vec!["One", "Two"]);

        session
            .type_and_submit(&Locator::by_name("q"), "hello")
            .await
            .unwrap();

        session.close().await.unwrap();
        session.close().await.unwrap();
        assert_eq!(renderer.active_sessions(), 0);
    }
}
