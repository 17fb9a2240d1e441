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

//! Client-side rate limiting
//!
//! Every outgoing request first acquires a permit from a [`RateLimiter`]. The
//! strategies differ in how permits come back:
//!
//! - [`NoOpLimiter`]: grants everything immediately
//! - [`FixedWindowLimiter`]: N permits per window, all restored at each window boundary
//! - [`SlidingWindowLimiter`]: each permit is restored one window after it was granted
//! - [`TokenBucketLimiter`]: GCRA token bucket backed by `governor`
//!
//! Queueing strategies serve waiters in arrival order.

mod fixed_window;
mod noop;
mod queue;
mod sliding_window;
mod token_bucket;

pub use fixed_window::{FixedWindowLimiter, FixedWindowOptions};
pub use noop::NoOpLimiter;
pub use sliding_window::SlidingWindowLimiter;
pub use token_bucket::TokenBucketLimiter;

use async_trait::async_trait;
use poly_core::Result;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Proof that permits were granted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitLease {
  /// Number of permits granted
  pub permits: u32,
  /// Time spent waiting in the limiter
  pub waited: Duration,
}

/// Capability shared by every limiting strategy
#[async_trait]
pub trait RateLimiter: Send + Sync {
  /// Wait for `permits` permits.
  ///
  /// # Errors
  ///
  /// - [`poly_core::Error::Cancelled`] when `cancel` fires before the grant
  /// - [`poly_core::Error::LimiterSaturated`] when a bounded queue is full
  /// - [`poly_core::Error::InvalidPermitCount`] when `permits` can never be granted
  /// - [`poly_core::Error::LimiterClosed`] after [`RateLimiter::dispose`]
  async fn acquire(&self, permits: u32, cancel: &CancellationToken) -> Result<RateLimitLease>;

  /// Permits that could be granted right now, `None` when the strategy keeps no count
  fn available_permits(&self) -> Option<usize>;

  /// Release the limiter; pending and future acquisitions fail
  fn dispose(&self);

  /// Whether [`RateLimiter::dispose`] has been called
  fn is_disposed(&self) -> bool;

  /// Short strategy name used in logs
  fn name(&self) -> &'static str;
}

impl std::fmt::Debug for dyn RateLimiter {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("RateLimiter")
      .field("strategy", &self.name())
      .field("available", &self.available_permits())
      .field("disposed", &self.is_disposed())
      .finish()
  }
}
