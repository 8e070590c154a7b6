//! Scripted renderer for deterministic tests
//!
//! Pages are registered per URL. Each page knows which locators resolve and to
//! what text, which locators accept input, and what the page turns into after a
//! submit. Waiting on a locator that never resolves sleeps for the full timeout
//! and then fails, so tests that hit that path should run with
//! `#[tokio::test(start_paused = true)]`.

use async_trait::async_trait;
use dossier_domain::{Locator, RenderClient, RenderSession, SourceError};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// One scripted page
#[derive(Debug, Clone, Default)]
pub struct MockPage {
    elements: HashMap<Locator, Vec<String>>,
    inputs: HashSet<Locator>,
    after_submit: Option<Box<MockPage>>,
    load_delay: Duration,
    render_delay: Duration,
}

impl MockPage {
    /// Empty page
    pub fn new() -> Self {
        Self::default()
    }

    /// Element with a single text
    pub fn with_element(self, locator: Locator, text: impl Into<String>) -> Self {
        self.with_elements(locator, [text.into()])
    }

    /// Several elements matching the same locator, in document order
    pub fn with_elements<I, S>(mut self, locator: Locator, texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.elements
            .insert(locator, texts.into_iter().map(Into::into).collect());
        self
    }

    /// Input field that accepts `type_and_submit`
    pub fn with_input(mut self, locator: Locator) -> Self {
        self.inputs.insert(locator);
        self
    }

    /// Page shown after a successful submit
    pub fn after_submit(mut self, page: MockPage) -> Self {
        self.after_submit = Some(Box::new(page));
        self
    }

    /// Time `navigate` takes to return
    pub fn with_load_delay(mut self, delay: Duration) -> Self {
        self.load_delay = delay;
        self
    }

    /// Time before scripted elements become present
    pub fn with_render_delay(mut self, delay: Duration) -> Self {
        self.render_delay = delay;
        self
    }

    fn has(&self, locator: &Locator) -> bool {
        self.inputs.contains(locator)
            || self
                .elements
                .get(locator)
                .map(|texts| !texts.is_empty())
                .unwrap_or(false)
    }
}

#[derive(Debug, Default)]
struct State {
    pages: HashMap<String, MockPage>,
    navigation_failures: HashSet<String>,
    navigation_panics: HashSet<String>,
    launch_failure: Option<String>,
    sessions_opened: usize,
    sessions_closed: usize,
    close_calls: usize,
    navigations: Vec<String>,
    typed_inputs: Vec<String>,
}

/// Renderer returning [`MockPage`]s instead of driving a browser
///
/// Clones share scripted pages and counters, so a test can keep one handle for
/// assertions while the pipeline owns another.
///
/// # Examples
///
/// ```
/// use dossier_domain::{Locator, RenderClient};
/// use dossier_render::{MockPage, MockRenderer};
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let renderer = MockRenderer::new().with_page(
///     "https://example.com",
///     MockPage::new().with_element(Locator::css("h1"), "Hello"),
/// );
///
/// let mut session = renderer.open_session().await.unwrap();
/// session.navigate("https://example.com").await.unwrap();
/// assert_eq!(session.extract_text(&Locator::css("h1")).await.unwrap(), "Hello");
/// session.close().await.unwrap();
///
/// assert_eq!(renderer.open_sessions(), 0);
/// # });
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockRenderer {
    state: Arc<Mutex<State>>,
}

impl MockRenderer {
    /// Renderer with no pages
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        lock(&self.state)
    }

    /// Script the page served at `url`
    pub fn with_page(self, url: impl Into<String>, page: MockPage) -> Self {
        self.lock().pages.insert(url.into(), page);
        self
    }

    /// Make navigation to `url` fail
    pub fn with_navigation_failure(self, url: impl Into<String>) -> Self {
        self.lock().navigation_failures.insert(url.into());
        self
    }

    /// Make navigation to `url` panic, to exercise panic isolation
    pub fn with_navigation_panic(self, url: impl Into<String>) -> Self {
        self.lock().navigation_panics.insert(url.into());
        self
    }

    /// Make every `open_session` fail with `message`
    pub fn with_launch_failure(self, message: impl Into<String>) -> Self {
        self.lock().launch_failure = Some(message.into());
        self
    }

    /// Sessions successfully opened
    pub fn sessions_opened(&self) -> usize {
        self.lock().sessions_opened
    }

    /// Sessions closed (first close only)
    pub fn sessions_closed(&self) -> usize {
        self.lock().sessions_closed
    }

    /// Sessions opened and never closed
    pub fn open_sessions(&self) -> usize {
        let state = self.lock();
        state.sessions_opened - state.sessions_closed
    }

    /// Total `close` calls, including repeats
    pub fn close_calls(&self) -> usize {
        self.lock().close_calls
    }

    /// URLs navigated to, in call order
    pub fn navigations(&self) -> Vec<String> {
        self.lock().navigations.clone()
    }

    /// Texts submitted through `type_and_submit`, in call order
    pub fn typed_inputs(&self) -> Vec<String> {
        self.lock().typed_inputs.clone()
    }
}

fn lock(state: &Mutex<State>) -> MutexGuard<'_, State> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl RenderClient for MockRenderer {
    async fn open_session(&self) -> Result<Box<dyn RenderSession>, SourceError> {
        let mut state = self.lock();
        if let Some(message) = &state.launch_failure {
            return Err(SourceError::Session(message.clone()));
        }
        state.sessions_opened += 1;
        Ok(Box::new(MockSession {
            state: Arc::clone(&self.state),
            page: None,
            closed: false,
        }))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

struct MockSession {
    state: Arc<Mutex<State>>,
    page: Option<MockPage>,
    closed: bool,
}

impl MockSession {
    fn current(&self) -> Result<&MockPage, SourceError> {
        if self.closed {
            return Err(SourceError::Session("session already closed".to_string()));
        }
        self.page
            .as_ref()
            .ok_or_else(|| SourceError::Session("no page loaded".to_string()))
    }
}

#[async_trait]
impl RenderSession for MockSession {
    async fn navigate(&mut self, url: &str) -> Result<(), SourceError> {
        if self.closed {
            return Err(SourceError::Session("session already closed".to_string()));
        }

        let page = {
            let mut state = lock(&self.state);
            state.navigations.push(url.to_string());
            if state.navigation_panics.contains(url) {
                drop(state);
                panic!("scripted panic while loading {}", url);
            }
            if state.navigation_failures.contains(url) {
                return Err(SourceError::Navigation {
                    url: url.to_string(),
                    reason: "connection refused".to_string(),
                });
            }
            state.pages.get(url).cloned()
        };

        let page = page.ok_or_else(|| SourceError::Navigation {
            url: url.to_string(),
            reason: "no page scripted for url".to_string(),
        })?;

        if !page.load_delay.is_zero() {
            tokio::time::sleep(page.load_delay).await;
        }
        self.page = Some(page);
        Ok(())
    }

    async fn wait_until_present(
        &mut self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<(), SourceError> {
        let page = self.current()?;
        if page.has(locator) && page.render_delay < timeout {
            if !page.render_delay.is_zero() {
                tokio::time::sleep(page.render_delay).await;
            }
            return Ok(());
        }

        tokio::time::sleep(timeout).await;
        Err(SourceError::Timeout {
            what: locator.to_string(),
            timeout_ms: timeout.as_millis() as u64,
        })
    }

    async fn extract_text(&mut self, locator: &Locator) -> Result<String, SourceError> {
        self.current()?
            .elements
            .get(locator)
            .and_then(|texts| texts.first())
            .map(|text| text.trim().to_string())
            .ok_or_else(|| SourceError::NotFound(locator.to_string()))
    }

    async fn extract_all_text(&mut self, locator: &Locator) -> Result<Vec<String>, SourceError> {
        Ok(self
            .current()?
            .elements
            .get(locator)
            .map(|texts| texts.iter().map(|t| t.trim().to_string()).collect())
            .unwrap_or_default())
    }

    async fn type_and_submit(&mut self, locator: &Locator, text: &str) -> Result<(), SourceError> {
        let page = self.current()?;
        if !page.inputs.contains(locator) {
            return Err(SourceError::NotFound(locator.to_string()));
        }
        let next = page.after_submit.clone();

        lock(&self.state).typed_inputs.push(text.to_string());
        if let Some(next) = next {
            self.page = Some(*next);
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<(), SourceError> {
        let mut state = lock(&self.state);
        state.close_calls += 1;
        if !self.closed {
            self.closed = true;
            state.sessions_closed += 1;
        }
        Ok(())
    }
}
