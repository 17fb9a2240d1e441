/*
 *
 *
 *
 *
 * MIT License
 * Copyright (c) 2025. Dwight J. Browne
 * dwight[-at-]dwightjbrowne[-dot-]com
 *
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

//! Rate-limited request dispatch

use crate::handle::Handle;
use crate::limiter::RateLimiter;
use crate::request::Request;
use crate::transport::HttpTransport;
use poly_core::{Error, Result, API_KEY_PARAM};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, instrument, warn};

/// Rate-limited Polygon API client
///
/// Every [`send`](PolygonClient::send) waits for a permit from the limiter,
/// appends the API key, performs a GET through the transport and decodes the
/// JSON body. The client can be shared between tasks (wrap it in an `Arc`);
/// concurrent callers contend on the same limiter.
///
/// # Examples
///
/// ```rust,no_run
/// use poly_client::ClientFactory;
/// use poly_core::ApiLimit;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = ClientFactory::create("my-key", ApiLimit::Basic)?;
///
///     let mut request = client.request();
///     request.add_path_parameter("v1")?.add_path_parameter("marketstatus")?;
///     request.add_path_parameter("now")?;
///
///     let status: Option<serde_json::Value> = client.send_uncancellable(request).await?;
///     println!("{:?}", status);
///
///     client.close();
///     Ok(())
/// }
/// ```
pub struct PolygonClient {
  api_key: String,
  base_url: String,
  transport: Handle<dyn HttpTransport>,
  limiter: Handle<dyn RateLimiter>,
  closed: bool,
}

impl PolygonClient {
  /// Assemble a client from its parts.
  ///
  /// Owned handles are released by [`close`](PolygonClient::close) (or on drop);
  /// shared handles are left alone.
  pub fn new(
    api_key: impl Into<String>,
    base_url: impl Into<String>,
    transport: Handle<dyn HttpTransport>,
    limiter: Handle<dyn RateLimiter>,
  ) -> Self {
    let base_url: String = base_url.into();
    Self {
      api_key: api_key.into(),
      base_url: base_url.trim_end_matches('/').to_string(),
      transport,
      limiter,
      closed: false,
    }
  }

  /// A fresh request seeded with this client's base URL
  pub fn request(&self) -> Request {
    Request::with_base_url(&self.base_url)
  }

  /// Base URL used by [`request`](PolygonClient::request)
  pub fn base_url(&self) -> &str {
    &self.base_url
  }

  /// The limiter gating this client
  pub fn limiter(&self) -> &std::sync::Arc<dyn RateLimiter> {
    self.limiter.resource()
  }

  /// The transport performing requests
  pub fn transport(&self) -> &std::sync::Arc<dyn HttpTransport> {
    self.transport.resource()
  }

  /// Whether closing the client disposes the limiter
  pub fn owns_limiter(&self) -> bool {
    self.limiter.is_owned()
  }

  /// Whether closing the client closes the transport
  pub fn owns_transport(&self) -> bool {
    self.transport.is_owned()
  }

  /// Send `request` and decode the JSON response.
  ///
  /// Returns `Ok(None)` when the response body is empty.
  ///
  /// # Errors
  ///
  /// - [`Error::Cancelled`] if `cancel` fires while waiting for a permit or
  ///   during the call; no HTTP request is made when it fires before the grant
  /// - [`Error::LimiterSaturated`] / [`Error::LimiterClosed`] from the limiter
  /// - [`Error::Status`] / [`Error::Http`] from the transport
  /// - [`Error::Decode`] when the body does not match `T`
  #[instrument(skip_all, fields(url = %request.build(), limiter = self.limiter.name()))]
  pub async fn send<T>(&self, mut request: Request, cancel: &CancellationToken) -> Result<Option<T>>
  where
    T: DeserializeOwned,
  {
    let lease = self.limiter.acquire(1, cancel).await.map_err(|e| {
      warn!("Permit not granted: {}", e);
      e
    })?;
    if !lease.waited.is_zero() {
      debug!("Waited {:?} for rate limit permit", lease.waited);
    }

    request.add_query_parameter(API_KEY_PARAM, self.api_key.as_str());
    let body = self.transport.get(request.build(), cancel).await?;

    if body.trim().is_empty() {
      debug!("Empty response body");
      return Ok(None);
    }

    serde_json::from_str::<T>(&body).map(Some).map_err(|e| {
      error!("Failed to parse JSON response: {}", e);
      error!("Response text (first 500 chars): {}", body.chars().take(500).collect::<String>());
      Error::Decode(e)
    })
  }

  /// [`send`](PolygonClient::send) without a cancellation signal
  pub async fn send_uncancellable<T>(&self, request: Request) -> Result<Option<T>>
  where
    T: DeserializeOwned,
  {
    self.send(request, &CancellationToken::new()).await
  }

  /// Release owned resources: the limiter first, then the transport.
  ///
  /// Consumes the client, so it cannot be used afterwards.
  pub fn close(mut self) {
    self.release();
  }

  fn release(&mut self) {
    if self.closed {
      return;
    }
    self.closed = true;

    if self.limiter.is_owned() {
      debug!("Disposing owned {} limiter", self.limiter.name());
      self.limiter.dispose();
    }
    if self.transport.is_owned() {
      debug!("Closing owned transport");
      self.transport.close();
    }
  }
}

impl Drop for PolygonClient {
  fn drop(&mut self) {
    self.release();
  }
}

impl std::fmt::Debug for PolygonClient {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("PolygonClient")
      .field("base_url", &self.base_url)
      .field("limiter", self.limiter.resource())
      .field("owns_limiter", &self.owns_limiter())
      .field("owns_transport", &self.owns_transport())
      .finish()
  }
}
