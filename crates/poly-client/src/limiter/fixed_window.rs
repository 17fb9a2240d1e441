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
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Settings for a [`FixedWindowLimiter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedWindowOptions {
  /// Permits available per window
  pub permit_limit: u32,
  /// Window length
  pub window: Duration,
  /// Maximum number of queued permits before acquisitions are rejected
  pub queue_limit: usize,
  /// Restore permits on a timer; when false call [`FixedWindowLimiter::replenish`]
  pub auto_replenishment: bool,
}

impl FixedWindowOptions {
  /// `permits` per minute with an unbounded queue
  pub fn per_minute(permits: u32) -> Self {
    Self { permit_limit: permits, ..Self::default() }
  }
}

impl Default for FixedWindowOptions {
  fn default() -> Self {
    Self {
      permit_limit: poly_core::FIXED_WINDOW_PERMITS,
      window: Duration::from_secs(poly_core::FIXED_WINDOW_SECS),
      queue_limit: usize::MAX,
      auto_replenishment: true,
    }
  }
}

struct Window {
  queue: PermitQueue,
  consumed: AtomicU32,
}

impl Window {
  fn replenish(&self) -> u32 {
    let restored = self.consumed.swap(0, Ordering::AcqRel);
    self.queue.restore(restored);
    restored
  }
}

/// Grants at most `permit_limit` permits per fixed window.
///
/// Windows are anchored at the first acquisition and then follow a fixed
/// cadence regardless of traffic: every `window` all permits consumed in the
/// previous window are restored at once and handed to queued callers in
/// arrival order.
pub struct FixedWindowLimiter {
  window: Arc<Window>,
  options: FixedWindowOptions,
  replenisher: Mutex<Option<JoinHandle<()>>>,
}

impl FixedWindowLimiter {
  /// Create a limiter from explicit options
  ///
  /// # Errors
  ///
  /// Returns [`Error::Config`] for a zero permit limit or an empty window.
  pub fn new(options: FixedWindowOptions) -> Result<Self> {
    if options.permit_limit == 0 {
      return Err(Error::Config("Fixed window permit limit must be positive".to_string()));
    }
    if options.window.is_zero() {
      return Err(Error::Config("Fixed window length must be positive".to_string()));
    }

    Ok(Self {
      window: Arc::new(Window {
        queue: PermitQueue::new(options.permit_limit, options.queue_limit),
        consumed: AtomicU32::new(0),
      }),
      options,
      replenisher: Mutex::new(None),
    })
  }

  /// Basic-tier limiter: 5 permits per minute, unbounded queue
  pub fn basic() -> Self {
    Self {
      window: Arc::new(Window {
        queue: PermitQueue::new(poly_core::FIXED_WINDOW_PERMITS, usize::MAX),
        consumed: AtomicU32::new(0),
      }),
      options: FixedWindowOptions::default(),
      replenisher: Mutex::new(None),
    }
  }

  /// Options this limiter was built with
  pub fn options(&self) -> &FixedWindowOptions {
    &self.options
  }

  /// Permits currently waiting in the queue
  pub fn queued_permits(&self) -> usize {
    self.window.queue.queued()
  }

  /// Start a new window by hand.
  ///
  /// Returns false when auto-replenishment is enabled, in which case the timer
  /// owns window boundaries.
  pub fn replenish(&self) -> bool {
    if self.options.auto_replenishment {
      return false;
    }
    let restored = self.window.replenish();
    debug!(restored, "fixed window replenished manually");
    true
  }

  fn replenisher(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
    match self.replenisher.lock() {
      Ok(guard) => guard,
      Err(poisoned) => poisoned.into_inner(),
    }
  }

  fn start_replenisher(&self) {
    if !self.options.auto_replenishment || self.window.queue.is_closed() {
      return;
    }
    let mut slot = self.replenisher();
    if slot.is_some() {
      return;
    }

    let window: Weak<Window> = Arc::downgrade(&self.window);
    let period = self.options.window;
    debug!(permits = self.options.permit_limit, ?period, "starting fixed window replenishment");

    *slot = Some(tokio::spawn(async move {
      let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
      ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
      loop {
        ticker.tick().await;
        let Some(window) = window.upgrade() else { break };
        let restored = window.replenish();
        if restored > 0 {
          debug!(restored, "fixed window replenished");
        }
      }
    }));
  }

  fn stop_replenisher(&self) {
    if let Some(handle) = self.replenisher().take() {
      handle.abort();
    }
  }
}

#[async_trait]
impl RateLimiter for FixedWindowLimiter {
  async fn acquire(&self, permits: u32, cancel: &CancellationToken) -> Result<RateLimitLease> {
    if self.window.queue.is_closed() {
      return Err(Error::LimiterClosed);
    }
    self.start_replenisher();

    let started = Instant::now();
    self.window.queue.take(permits, cancel).await?;
    self.window.consumed.fetch_add(permits, Ordering::AcqRel);

    Ok(RateLimitLease { permits, waited: started.elapsed() })
  }

  fn available_permits(&self) -> Option<usize> {
    Some(self.window.queue.available())
  }

  fn dispose(&self) {
    self.window.queue.close();
    self.stop_replenisher();
  }

  fn is_disposed(&self) -> bool {
    self.window.queue.is_closed()
  }

  fn name(&self) -> &'static str {
    "fixed_window"
  }
}

impl Drop for FixedWindowLimiter {
  fn drop(&mut self) {
    self.stop_replenisher();
  }
}
