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

use super::{RateLimitLease, RateLimiter};
use async_trait::async_trait;
use poly_core::{Error, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Limiter that grants every acquisition immediately
#[derive(Debug, Default)]
pub struct NoOpLimiter {
  disposed: AtomicBool,
}

impl NoOpLimiter {
  /// Create a new no-op limiter
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl RateLimiter for NoOpLimiter {
  async fn acquire(&self, permits: u32, cancel: &CancellationToken) -> Result<RateLimitLease> {
    if self.is_disposed() {
      return Err(Error::LimiterClosed);
    }
    if cancel.is_cancelled() {
      return Err(Error::Cancelled);
    }
    Ok(RateLimitLease { permits, waited: Duration::ZERO })
  }

  fn available_permits(&self) -> Option<usize> {
    None
  }

  fn dispose(&self) {
    self.disposed.store(true, Ordering::Release);
  }

  fn is_disposed(&self) -> bool {
    self.disposed.load(Ordering::Acquire)
  }

  fn name(&self) -> &'static str {
    "noop"
  }
}
