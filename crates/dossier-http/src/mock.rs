use async_trait::async_trait;
use dossier_domain::{FetchedPage, HttpFetcher, SourceError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[derive(Debug, Clone)]
struct Scripted {
    result: Result<FetchedPage, SourceError>,
    delay: Duration,
}

#[derive(Debug, Default)]
struct State {
    responses: HashMap<String, Scripted>,
    requests: Vec<String>,
}

/// Mock HTTP fetcher for deterministic testing
///
/// Responses are scripted per URL; unscripted URLs fail with a network error.
/// A delayed response that exceeds the caller's timeout fails with
/// `SourceError::Timeout` after sleeping for the timeout, mirroring the real
/// adapter.
///
/// # Examples
///
/// ```
/// use dossier_domain::HttpFetcher;
/// use dossier_http::MockFetcher;
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let fetcher = MockFetcher::new().with_body("https://example.com", "<p>hi</p>");
/// let page = fetcher
///     .fetch_text("https://example.com", Duration::from_secs(1))
///     .await
///     .unwrap();
/// assert_eq!(page.body, "<p>hi</p>");
/// assert_eq!(fetcher.request_count(), 1);
/// # });
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockFetcher {
    state: Arc<Mutex<State>>,
}

impl MockFetcher {
    /// Fetcher with nothing scripted
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn script(self, url: impl Into<String>, result: Result<FetchedPage, SourceError>) -> Self {
        self.lock().responses.insert(
            url.into(),
            Scripted {
                result,
                delay: Duration::ZERO,
            },
        );
        self
    }

    /// Respond 200 with `body`
    pub fn with_body(self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.with_status(url, 200, body)
    }

    /// Respond with `status` and `body`; 4xx/5xx become `HttpStatus` errors
    pub fn with_status(self, url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        let url = url.into();
        let result = if status >= 400 {
            Err(SourceError::HttpStatus {
                code: status,
                url: url.clone(),
            })
        } else {
            Ok(FetchedPage {
                status,
                body: body.into(),
            })
        };
        self.script(url, result)
    }

    /// Fail with `error`
    pub fn with_error(self, url: impl Into<String>, error: SourceError) -> Self {
        self.script(url, Err(error))
    }

    /// Delay the scripted response for `url`
    pub fn with_delay(self, url: &str, delay: Duration) -> Self {
        if let Some(scripted) = self.lock().responses.get_mut(url) {
            scripted.delay = delay;
        }
        self
    }

    /// Number of requests made
    pub fn request_count(&self) -> usize {
        self.lock().requests.len()
    }

    /// Requested URLs, in call order
    pub fn requests(&self) -> Vec<String> {
        self.lock().requests.clone()
    }
}

#[async_trait]
impl HttpFetcher for MockFetcher {
    async fn fetch_text(&self, url: &str, timeout: Duration) -> Result<FetchedPage, SourceError> {
        let scripted = {
            let mut state = self.lock();
            state.requests.push(url.to_string());
            state.responses.get(url).cloned()
        };

        let Some(scripted) = scripted else {
            return Err(SourceError::Network(format!("no route to {}", url)));
        };

        if scripted.delay >= timeout {
            tokio::time::sleep(timeout).await;
            return Err(SourceError::Timeout {
                what: url.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            });
        }
        if !scripted.delay.is_zero() {
            tokio::time::sleep(scripted.delay).await;
        }
        scripted.result
    }
}
