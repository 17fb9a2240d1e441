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

//! Preset client construction

use crate::client::PolygonClient;
use crate::handle::Handle;
use crate::limiter::{FixedWindowLimiter, FixedWindowOptions, NoOpLimiter, RateLimiter};
use crate::transport::{HttpTransport, ReqwestTransport};
use poly_core::{ApiLimit, Config, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Builds [`PolygonClient`]s with an internally allocated transport.
///
/// The transport is always owned by the client. The limiter is owned when the
/// factory allocates it, and under caller control when passed in.
pub struct ClientFactory;

impl ClientFactory {
  /// Client with a limiter matching `limit`.
  ///
  /// `Basic` and `FivePerMinute` get a fixed window of 5 permits per minute with
  /// an unbounded queue; `Unlimited` gets a no-op limiter.
  pub fn create(api_key: impl Into<String>, limit: ApiLimit) -> Result<PolygonClient> {
    let limiter = Self::limiter_for(limit)?;
    Self::with_limiter(api_key, limiter, true)
  }

  /// Client without client-side throttling
  pub fn create_default(api_key: impl Into<String>) -> Result<PolygonClient> {
    Self::create(api_key, ApiLimit::Unlimited)
  }

  /// Client gated by a caller-supplied limiter.
  ///
  /// With `dispose_limiter` false the limiter survives [`PolygonClient::close`]
  /// and may keep being shared with other clients.
  pub fn with_limiter(
    api_key: impl Into<String>,
    limiter: Arc<dyn RateLimiter>,
    dispose_limiter: bool,
  ) -> Result<PolygonClient> {
    let transport = ReqwestTransport::new(Duration::from_secs(poly_core::DEFAULT_TIMEOUT_SECS))?;
    let base_url = poly_core::POLYGON_BASE_URL;
    Ok(Self::assemble(api_key.into(), base_url, transport, limiter, dispose_limiter))
  }

  /// Client built from environment configuration
  pub fn from_config(config: &Config) -> Result<PolygonClient> {
    config.validate()?;
    let limiter = Self::limiter_for(config.api_limit)?;
    let transport = ReqwestTransport::from_config(config)?;
    Ok(Self::assemble(config.api_key.clone(), config.trimmed_base_url(), transport, limiter, true))
  }

  /// The limiter the factory allocates for `limit`
  pub fn limiter_for(limit: ApiLimit) -> Result<Arc<dyn RateLimiter>> {
    let limiter: Arc<dyn RateLimiter> = match limit.permits_per_minute() {
      Some(permits) => Arc::new(FixedWindowLimiter::new(FixedWindowOptions::per_minute(permits))?),
      None => Arc::new(NoOpLimiter::new()),
    };
    Ok(limiter)
  }

  fn assemble(
    api_key: String,
    base_url: &str,
    transport: ReqwestTransport,
    limiter: Arc<dyn RateLimiter>,
    dispose_limiter: bool,
  ) -> PolygonClient {
    info!(limiter = limiter.name(), owns_limiter = dispose_limiter, "Creating Polygon client");
    let transport: Arc<dyn HttpTransport> = Arc::new(transport);
    let limiter = Handle::new(limiter, dispose_limiter);
    PolygonClient::new(api_key, base_url, Handle::Owned(transport), limiter)
  }
}
