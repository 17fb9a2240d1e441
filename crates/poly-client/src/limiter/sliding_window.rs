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

use super::queue::PermitQueue;
use super::{RateLimitLease, RateLimiter};
use async_trait::async_trait;
use poly_core::{Error, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Grants at most `permit_limit` permits in any rolling `window`.
///
/// Each granted permit returns to the pool exactly one window after its grant,
/// so the bound holds for every interval, not only for aligned windows.
pub struct SlidingWindowLimiter {
  queue: Arc<PermitQueue>,
  window: Duration,
}

impl SlidingWindowLimiter {
  /// Create a limiter with an unbounded wait queue
  ///
  /// # Errors
  ///
  /// Returns [`Error::Config`] for a zero permit limit or an empty window.
  pub fn new(permit_limit: u32, window: Duration) -> Result<Self> {
    Self::with_queue_limit(permit_limit, window, usize::MAX)
  }

  /// Create a limiter that rejects acquisitions once `queue_limit` permits are waiting
  pub fn with_queue_limit(permit_limit: u32, window: Duration, queue_limit: usize) -> Result<Self> {
    if permit_limit == 0 {
      return Err(Error::Config("Sliding window permit limit must be positive".to_string()));
    }
    if window.is_zero() {
      return Err(Error::Config("Sliding window length must be positive".to_string()));
    }
    Ok(Self { queue: Arc::new(PermitQueue::new(permit_limit, queue_limit)), window })
  }

  /// Permits currently waiting in the queue
  pub fn queued_permits(&self) -> usize {
    self.queue.queued()
  }
}

#[async_trait]
impl RateLimiter for SlidingWindowLimiter {
  async fn acquire(&self, permits: u32, cancel: &CancellationToken) -> Result<RateLimitLease> {
    let started = Instant::now();
    self.queue.take(permits, cancel).await?;

    let queue = Arc::downgrade(&self.queue);
    let window = self.window;
    tokio::spawn(async move {
      tokio::time::sleep(window).await;
      if let Some(queue) = queue.upgrade() {
        trace!(permits, "sliding window permits returned");
        queue.restore(permits);
      }
    });

    Ok(RateLimitLease { permits, waited: started.elapsed() })
  }

  fn available_permits(&self) -> Option<usize> {
    Some(self.queue.available())
  }

  fn dispose(&self) {
    self.queue.close();
  }

  fn is_disposed(&self) -> bool {
    self.queue.is_closed()
  }

  fn name(&self) -> &'static str {
    "sliding_window"
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test(start_paused = true)]
  async fn test_permit_returns_one_window_after_grant() {
    let limiter = SlidingWindowLimiter::new(2, Duration::from_secs(60)).unwrap();
    let cancel = CancellationToken::new();

    limiter.acquire(1, &cancel).await.unwrap();
    tokio::time::sleep(Duration::from_secs(30)).await;
    limiter.acquire(1, &cancel).await.unwrap();

    // first permit comes back at t=60, second at t=90
    let lease = limiter.acquire(1, &cancel).await.unwrap();
    assert_eq!(lease.waited, Duration::from_secs(30));
    let lease = limiter.acquire(1, &cancel).await.unwrap();
    assert_eq!(lease.waited, Duration::from_secs(30));
  }

  #[tokio::test(start_paused = true)]
  async fn test_no_burst_across_window_edge() {
    let limiter = Arc::new(SlidingWindowLimiter::new(5, Duration::from_secs(60)).unwrap());
    let start = Instant::now();
    let cancel = CancellationToken::new();

    tokio::time::sleep(Duration::from_secs(59)).await;
    for _ in 0..5 {
      limiter.acquire(1, &cancel).await.unwrap();
    }
    // a fixed window anchored at t=0 would allow five more at t=60
    let lease = limiter.acquire(1, &cancel).await.unwrap();
    assert_eq!(start.elapsed(), Duration::from_secs(119));
    assert_eq!(lease.waited, Duration::from_secs(60));
  }

  #[test]
  fn test_invalid_options() {
    assert!(SlidingWindowLimiter::new(0, Duration::from_secs(1)).is_err());
    assert!(SlidingWindowLimiter::new(1, Duration::ZERO).is_err());
  }

  #[tokio::test]
  async fn test_dispose() {
    let limiter = SlidingWindowLimiter::new(1, Duration::from_secs(1)).unwrap();
    limiter.dispose();
    assert!(limiter.is_disposed());
    assert!(matches!(
      limiter.acquire(1, &CancellationToken::new()).await,
      Err(Error::LimiterClosed)
    ));
  }
}
