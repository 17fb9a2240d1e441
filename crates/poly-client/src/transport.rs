//! HTTP transport layer for Polygon API requests

use async_trait::async_trait;
use poly_core::{Config, Error, Result, API_KEY_PARAM};
use reqwest::{Client, Response};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, instrument};
use url::Url;

/// Longest slice of an error body kept in [`Error::Status`]
const ERROR_BODY_CHARS: usize = 200;

/// Anything that can perform a GET and hand back the raw body
#[async_trait]
pub trait HttpTransport: Send + Sync {
  /// GET `url` and return the body of a successful response.
  ///
  /// # Errors
  ///
  /// - [`Error::Cancelled`] when `cancel` fires before the response is read
  /// - [`Error::Status`] for a non-success status
  /// - [`Error::Http`] for connection or body read failures, or after close
  async fn get(&self, url: &str, cancel: &CancellationToken) -> Result<String>;

  /// Release the transport; later calls fail
  fn close(&self);

  /// Whether [`HttpTransport::close`] has been called
  fn is_closed(&self) -> bool;
}

/// `reqwest`-backed transport
pub struct ReqwestTransport {
  client: Client,
  timeout: Duration,
  closed: AtomicBool,
}

impl ReqwestTransport {
  /// Create a transport with the given request timeout
  pub fn new(timeout: Duration) -> Result<Self> {
    let client = Client::builder()
      .timeout(timeout)
      .user_agent(concat!("poly-client/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| Error::Http(format!("Failed to create HTTP client: {}", e)))?;

    Ok(Self { client, timeout, closed: AtomicBool::new(false) })
  }

  /// Create a transport using the configured timeout
  pub fn from_config(config: &Config) -> Result<Self> {
    Self::new(Duration::from_secs(config.timeout_secs))
  }

  /// Get request timeout duration
  pub fn timeout(&self) -> Duration {
    self.timeout
  }

  /// Make the actual HTTP request
  async fn make_request(&self, url: &str) -> Result<Response> {
    let response = self
      .client
      .get(url)
      .send()
      .await
      .map_err(|e| Error::Http(format!("Request failed: {}", e.without_url())))?;

    let status = response.status();
    if status.is_success() {
      debug!("Request successful with status: {}", status);
      return Ok(response);
    }

    let body = match response.text().await {
      Ok(body) => body,
      Err(e) => {
        debug!("Failed to read error body: {}", e.without_url());
        String::new()
      }
    };
    error!("Request failed with status: {}", status);
    let body = body.chars().take(ERROR_BODY_CHARS).collect();
    Err(Error::Status { status: status.as_u16(), body })
  }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
  #[instrument(skip_all, fields(url = %redact_api_key(url)))]
  async fn get(&self, url: &str, cancel: &CancellationToken) -> Result<String> {
    if self.is_closed() {
      return Err(Error::Http("Transport has been closed".to_string()));
    }

    let fetch = async {
      let response = self.make_request(url).await?;
      response
        .text()
        .await
        .map_err(|e| Error::Http(format!("Failed to read response body: {}", e.without_url())))
    };

    let text = tokio::select! {
      biased;
      _ = cancel.cancelled() => {
        debug!("Request cancelled in flight");
        return Err(Error::Cancelled);
      }
      text = fetch => text?,
    };

    debug!("Response body length: {} bytes", text.len());
    Ok(text)
  }

  fn close(&self) {
    self.closed.store(true, Ordering::Release);
  }

  fn is_closed(&self) -> bool {
    self.closed.load(Ordering::Acquire)
  }
}

impl std::fmt::Debug for ReqwestTransport {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ReqwestTransport")
      .field("timeout", &self.timeout)
      .field("closed", &self.is_closed())
      .finish()
  }
}

/// Mask the API key in a URL before it reaches the logs
pub(crate) fn redact_api_key(url: &str) -> String {
  let Ok(mut parsed) = Url::parse(url) else {
    return url.to_string();
  };
  if !parsed.query_pairs().any(|(key, _)| key == API_KEY_PARAM) {
    return url.to_string();
  }

  let pairs: Vec<(String, String)> = parsed
    .query_pairs()
    .map(|(key, value)| {
      let value = if key == API_KEY_PARAM { "***".to_string() } else { value.into_owned() };
      (key.into_owned(), value)
    })
    .collect();
  parsed.query_pairs_mut().clear().extend_pairs(pairs);
  parsed.to_string()
}
