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
use governor::{DefaultDirectRateLimiter, Quota};
use poly_core::{Error, Result};
use std::num::NonZeroU32;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Token bucket (GCRA) limiter backed by `governor`.
///
/// Unlike the windowed limiters, permits trickle back at an even rate, so bursts
/// are bounded by the quota's burst size. Waiters are not queued in strict
/// arrival order.
pub struct TokenBucketLimiter {
  limiter: DefaultDirectRateLimiter,
  burst: NonZeroU32,
  closed: CancellationToken,
}

impl TokenBucketLimiter {
  /// Create a limiter from a `governor` quota
  pub fn new(quota: Quota) -> Self {
    Self {
      burst: quota.burst_size(),
      limiter: governor::RateLimiter::direct(quota),
      closed: CancellationToken::new(),
    }
  }

  /// `requests` per minute, spread evenly, with a burst of the same size
  ///
  /// # Errors
  ///
  /// Returns [`Error::Config`] when `requests` is zero.
  pub fn per_minute(requests: u32) -> Result<Self> {
    let requests = NonZeroU32::new(requests)
      .ok_or_else(|| Error::Config("Token bucket rate must be positive".to_string()))?;
    Ok(Self::new(Quota::per_minute(requests)))
  }

  /// One permit every `period`, bursting up to `burst`
  pub fn with_period(period: Duration, burst: u32) -> Result<Self> {
    let quota = Quota::with_period(period)
      .ok_or_else(|| Error::Config("Token bucket period must be positive".to_string()))?;
    let burst = NonZeroU32::new(burst)
      .ok_or_else(|| Error::Config("Token bucket burst must be positive".to_string()))?;
    Ok(Self::new(quota.allow_burst(burst)))
  }
}

#[async_trait]
impl RateLimiter for TokenBucketLimiter {
  async fn acquire(&self, permits: u32, cancel: &CancellationToken) -> Result<RateLimitLease> {
    if self.closed.is_cancelled() {
      return Err(Error::LimiterClosed);
    }
    if cancel.is_cancelled() {
      return Err(Error::Cancelled);
    }
    let Some(n) = NonZeroU32::new(permits) else {
      return Ok(RateLimitLease { permits, waited: Duration::ZERO });
    };

    let started = Instant::now();
    tokio::select! {
      biased;
      _ = cancel.cancelled() => Err(Error::Cancelled),
      _ = self.closed.cancelled() => Err(Error::LimiterClosed),
      ready = self.limiter.until_n_ready(n) => {
        ready.map_err(|_| Error::InvalidPermitCount {
          requested: permits,
          limit: self.burst.get(),
        })?;
        Ok(RateLimitLease { permits, waited: started.elapsed() })
      }
    }
  }

  fn available_permits(&self) -> Option<usize> {
    None
  }

  fn dispose(&self) {
    self.closed.cancel();
  }

  fn is_disposed(&self) -> bool {
    self.closed.is_cancelled()
  }

  fn name(&self) -> &'static str {
    "token_bucket"
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::Arc;

  #[tokio::test]
  async fn test_burst_is_immediate() {
    let limiter = TokenBucketLimiter::per_minute(5).unwrap();
    let cancel = CancellationToken::new();
    for _ in 0..5 {
      let lease = limiter.acquire(1, &cancel).await.unwrap();
      assert!(lease.waited < Duration::from_secs(1));
    }
  }

  #[tokio::test]
  async fn test_request_larger_than_burst_is_invalid() {
    let limiter = TokenBucketLimiter::per_minute(5).unwrap();
    let err = limiter.acquire(6, &CancellationToken::new()).await.unwrap_err();
    assert!(matches!(err, Error::InvalidPermitCount { requested: 6, limit: 5 }));
  }

  #[tokio::test]
  async fn test_cancel_while_waiting() {
    let limiter = Arc::new(TokenBucketLimiter::with_period(Duration::from_secs(3600), 1).unwrap());
    let cancel = CancellationToken::new();
    limiter.acquire(1, &cancel).await.unwrap();

    let waiter = {
      let limiter = limiter.clone();
      let cancel = cancel.clone();
      tokio::spawn(async move { limiter.acquire(1, &cancel).await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    cancel.cancel();
    assert!(matches!(waiter.await.unwrap(), Err(Error::Cancelled)));
  }

  #[tokio::test]
  async fn test_dispose_wakes_waiters() {
    let limiter = Arc::new(TokenBucketLimiter::with_period(Duration::from_secs(3600), 1).unwrap());
    limiter.acquire(1, &CancellationToken::new()).await.unwrap();

    let waiter = {
      let limiter = limiter.clone();
      tokio::spawn(async move { limiter.acquire(1, &CancellationToken::new()).await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    limiter.dispose();

    assert!(matches!(waiter.await.unwrap(), Err(Error::LimiterClosed)));
    assert!(limiter.is_disposed());
  }

  #[test]
  fn test_invalid_construction() {
    assert!(TokenBucketLimiter::per_minute(0).is_err());
    assert!(TokenBucketLimiter::with_period(Duration::ZERO, 1).is_err());
    assert!(TokenBucketLimiter::with_period(Duration::from_secs(1), 0).is_err());
  }
}
