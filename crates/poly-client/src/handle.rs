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

//! Ownership-tagged resource handles

use std::ops::Deref;
use std::sync::Arc;

/// A shared resource tagged with whether the holder must release it.
///
/// [`Handle::Owned`] resources are released by the client on close;
/// [`Handle::Shared`] resources stay under the caller's control.
#[derive(Debug)]
pub enum Handle<T: ?Sized> {
  /// Released together with the holder
  Owned(Arc<T>),
  /// Lifecycle managed by someone else
  Shared(Arc<T>),
}

impl<T: ?Sized> Handle<T> {
  /// Tag `resource` as owned when `owned` is true, shared otherwise
  pub fn new(resource: Arc<T>, owned: bool) -> Self {
    if owned {
      Handle::Owned(resource)
    } else {
      Handle::Shared(resource)
    }
  }

  /// Whether the holder is responsible for releasing the resource
  pub fn is_owned(&self) -> bool {
    matches!(self, Handle::Owned(_))
  }

  /// The underlying shared pointer
  pub fn resource(&self) -> &Arc<T> {
    match self {
      Handle::Owned(resource) | Handle::Shared(resource) => resource,
    }
  }
}

impl<T: ?Sized> Deref for Handle<T> {
  type Target = T;

  fn deref(&self) -> &T {
    self.resource()
  }
}
