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

//! FIFO permit pool shared by the windowed limiters

use poly_core::{Error, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{Semaphore, TryAcquireError};
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Semaphore-backed pool of permits with an optional bound on queued demand.
///
/// Granted permits are consumed (forgotten); the owning strategy decides when
/// to hand them back through [`PermitQueue::restore`].
pub(crate) struct PermitQueue {
  semaphore: Semaphore,
  permit_limit: u32,
  queue_limit: usize,
  queued: AtomicUsize,
}

impl PermitQueue {
  pub(crate) fn new(permit_limit: u32, queue_limit: usize) -> Self {
    Self {
      semaphore: Semaphore::new(permit_limit as usize),
      permit_limit,
      queue_limit,
      queued: AtomicUsize::new(0),
    }
  }

  /// Take `permits` permits, waiting in arrival order if none are free
  pub(crate) async fn take(&self, permits: u32, cancel: &CancellationToken) -> Result<()> {
    if permits > self.permit_limit {
      return Err(Error::InvalidPermitCount { requested: permits, limit: self.permit_limit });
    }
    if cancel.is_cancelled() {
      return Err(Error::Cancelled);
    }

    match self.semaphore.try_acquire_many(permits) {
      Ok(permit) => {
        permit.forget();
        return Ok(());
      }
      Err(TryAcquireError::Closed) => return Err(Error::LimiterClosed),
      Err(TryAcquireError::NoPermits) => {}
    }

    let _slot = self.enter_queue(permits)?;
    trace!(permits, queued = self.queued(), "waiting for permits");

    tokio::select! {
      biased;
      _ = cancel.cancelled() => Err(Error::Cancelled),
      acquired = self.semaphore.acquire_many(permits) => match acquired {
        Ok(permit) => {
          permit.forget();
          Ok(())
        }
        Err(_) => Err(Error::LimiterClosed),
      },
    }
  }

  /// Hand consumed permits back. No-op once closed.
  pub(crate) fn restore(&self, permits: u32) {
    if permits == 0 || self.semaphore.is_closed() {
      return;
    }
    self.semaphore.add_permits(permits as usize);
  }

  pub(crate) fn available(&self) -> usize {
    self.semaphore.available_permits()
  }

  pub(crate) fn queued(&self) -> usize {
    self.queued.load(Ordering::Acquire)
  }

  pub(crate) fn close(&self) {
    self.semaphore.close();
  }

  pub(crate) fn is_closed(&self) -> bool {
    self.semaphore.is_closed()
  }

  fn enter_queue(&self, permits: u32) -> Result<QueueSlot<'_>> {
    let permits = permits as usize;
    self
      .queued
      .fetch_update(Ordering::AcqRel, Ordering::Acquire, |queued| {
        queued.checked_add(permits).filter(|total| *total <= self.queue_limit)
      })
      .map_err(|queued| Error::LimiterSaturated {
        requested: permits as u32,
        queued,
        queue_limit: self.queue_limit,
      })?;
    Ok(QueueSlot { queue: self, permits })
  }
}

/// Queued demand, released when the waiter is granted, cancelled or dropped
struct QueueSlot<'a> {
  queue: &'a PermitQueue,
  permits: usize,
}

impl Drop for QueueSlot<'_> {
  fn drop(&mut self) {
    self.queue.queued.fetch_sub(self.permits, Ordering::AcqRel);
  }
}
