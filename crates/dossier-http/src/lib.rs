//! Dossier HTTP Layer
//!
//! Plain-HTTP implementations of [`HttpFetcher`].
//!
//! - `ReqwestFetcher`: real GET requests via reqwest
//! - `MockFetcher`: scripted responses for deterministic testing

#![warn(missing_docs)]

mod mock;

pub use mock::MockFetcher;

use async_trait::async_trait;
use dossier_domain::{FetchedPage, HttpFetcher, SourceError};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Browser-like user agent sent with every request
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) \
                                      AppleWebKit/537.36 (KHTML, like Gecko) \
                                      Chrome/124.0.0.0 Safari/537.36";

/// Connection settings for [`ReqwestFetcher`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header value
    pub user_agent: String,

    /// TCP/TLS connect bound (milliseconds)
    pub connect_timeout_ms: u64,

    /// Maximum redirects followed
    pub max_redirects: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            connect_timeout_ms: 10_000,
            max_redirects: 10,
        }
    }
}

/// reqwest-backed fetcher
///
/// One client is shared by all requests; the per-request bound passed to
/// [`HttpFetcher::fetch_text`] covers the whole exchange including the body.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    /// Build a fetcher from `config`
    pub fn new(config: &HttpConfig) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()
            .map_err(|e| SourceError::Network(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

fn map_error(url: &str, timeout: Duration, error: reqwest::Error) -> SourceError {
    if error.is_timeout() {
        SourceError::Timeout {
            what: url.to_string(),
            timeout_ms: timeout.as_millis() as u64,
        }
    } else {
        SourceError::Network(error.to_string())
    }
}

#[async_trait]
impl HttpFetcher for ReqwestFetcher {
    async fn fetch_text(&self, url: &str, timeout: Duration) -> Result<FetchedPage, SourceError> {
        debug!("GET {} (timeout {:?})", url, timeout);

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| map_error(url, timeout, e))?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(SourceError::HttpStatus {
                code: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| map_error(url, timeout, e))?;

        debug!("GET {} -> {} ({} bytes)", url, status.as_u16(), body.len());
        Ok(FetchedPage {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dossier_domain::ErrorKind;
    use wiremock::matchers::{header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher() -> ReqwestFetcher {
        ReqwestFetcher::new(&HttpConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_ok() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/policy"))
            .and(header_exists("user-agent"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>Hello</p>"))
            .mount(&server)
            .await;

        let page = fetcher()
            .fetch_text(&format!("{}/policy", server.uri()), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(page.status, 200);
        assert_eq!(page.body, "<p>Hello</p>");
    }

    #[tokio::test]
    async fn test_fetch_http_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = fetcher()
            .fetch_text(&format!("{}/missing", server.uri()), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::HttpStatus(404));
    }

    #[tokio::test]
    async fn test_fetch_follows_redirect() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/old"))
            .respond_with(
                ResponseTemplate::new(301).insert_header("location", "/new"),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/new"))
            .respond_with(ResponseTemplate::new(200).set_body_string("moved"))
            .mount(&server)
            .await;

        let page = fetcher()
            .fetch_text(&format!("{}/old", server.uri()), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(page.status, 200);
        assert_eq!(page.body, "moved");
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let err = fetcher()
            .fetch_text(&server.uri(), Duration::from_millis(200))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Timeout);
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        // Reserve a free port, then release it so nothing is listening
        let addr = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };
        let uri = format!("http://{}/", addr);

        let err = fetcher()
            .fetch_text(&uri, Duration::from_secs(2))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);
    }
}
