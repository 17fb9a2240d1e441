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

//! Incremental request URL builder
//!
//! A [`Request`] is built in two phases. Path segments (`/segment`) come first;
//! the first query parameter opens the query section (`?key=value`) and from then
//! on only further query parameters (`&key=value`) may be added. The transition is
//! one-way, so the REST route is always complete before any query modifier.
//!
//! Values are concatenated as given, without percent-encoding. Callers pass
//! values that are already URL-safe (numbers, dates, tickers, closed vocabularies).

use chrono::NaiveDate;
use poly_core::{Error, Period, Result, SortOrder};
use std::fmt;

/// Room for a typical aggregates URL without reallocating
const INITIAL_CAPACITY: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
  Path,
  Query,
}

/// A value appended as one (or, for a [`Period`], two) path segments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathParam<'a> {
  /// Verbatim text
  Str(&'a str),
  /// Base-10 integer
  Int(i64),
  /// Calendar date rendered as `YYYY-MM-DD`
  Date(NaiveDate),
  /// Multiple and lower-case basis as two segments, e.g. `/3/week`
  Period(Period),
}

impl PathParam<'_> {
  fn write_to(&self, url: &mut String) {
    match self {
      PathParam::Str(s) => push_segment(url, s),
      PathParam::Int(i) => push_segment(url, &i.to_string()),
      PathParam::Date(d) => push_segment(url, &d.format("%Y-%m-%d").to_string()),
      PathParam::Period(p) => {
        push_segment(url, &p.multiple().to_string());
        push_segment(url, p.basis().as_str());
      }
    }
  }
}

impl fmt::Display for PathParam<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PathParam::Str(s) => f.write_str(s),
      PathParam::Int(i) => write!(f, "{}", i),
      PathParam::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
      PathParam::Period(p) => write!(f, "{}/{}", p.multiple(), p.basis()),
    }
  }
}

impl<'a> From<&'a str> for PathParam<'a> {
  fn from(value: &'a str) -> Self {
    PathParam::Str(value)
  }
}

impl<'a> From<&'a String> for PathParam<'a> {
  fn from(value: &'a String) -> Self {
    PathParam::Str(value.as_str())
  }
}

impl From<i64> for PathParam<'_> {
  fn from(value: i64) -> Self {
    PathParam::Int(value)
  }
}

impl From<i32> for PathParam<'_> {
  fn from(value: i32) -> Self {
    PathParam::Int(value.into())
  }
}

impl From<u32> for PathParam<'_> {
  fn from(value: u32) -> Self {
    PathParam::Int(value.into())
  }
}

impl From<NaiveDate> for PathParam<'_> {
  fn from(value: NaiveDate) -> Self {
    PathParam::Date(value)
  }
}

impl From<Period> for PathParam<'_> {
  fn from(value: Period) -> Self {
    PathParam::Period(value)
  }
}

/// A value of a `key=value` query parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryValue<'a> {
  /// Verbatim text
  Str(&'a str),
  /// Base-10 integer
  Int(i64),
  /// `true` or `false`
  Bool(bool),
}

impl fmt::Display for QueryValue<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      QueryValue::Str(s) => f.write_str(s),
      QueryValue::Int(i) => write!(f, "{}", i),
      QueryValue::Bool(true) => f.write_str("true"),
      QueryValue::Bool(false) => f.write_str("false"),
    }
  }
}

impl<'a> From<&'a str> for QueryValue<'a> {
  fn from(value: &'a str) -> Self {
    QueryValue::Str(value)
  }
}

impl<'a> From<&'a String> for QueryValue<'a> {
  fn from(value: &'a String) -> Self {
    QueryValue::Str(value.as_str())
  }
}

impl From<i64> for QueryValue<'_> {
  fn from(value: i64) -> Self {
    QueryValue::Int(value)
  }
}

impl From<i32> for QueryValue<'_> {
  fn from(value: i32) -> Self {
    QueryValue::Int(value.into())
  }
}

impl From<u32> for QueryValue<'_> {
  fn from(value: u32) -> Self {
    QueryValue::Int(value.into())
  }
}

impl From<bool> for QueryValue<'_> {
  fn from(value: bool) -> Self {
    QueryValue::Bool(value)
  }
}

/// Builder for a single request URL
///
/// # Examples
///
/// ```rust
/// use chrono::NaiveDate;
/// use poly_client::Request;
/// use poly_core::{Period, PeriodBasis, SortOrder};
///
/// let mut request = Request::with_base_url("https://api.polygon.io");
/// request
///   .add_path_parameter("v2")?
///   .add_path_parameter("aggs")?
///   .add_path_parameter("ticker")?
///   .add_path_parameter("AAPL")?
///   .add_path_parameter("range")?
///   .add_path_parameter(Period::new(1, PeriodBasis::Day)?)?
///   .add_path_parameter(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap())?
///   .add_path_parameter(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap())?;
/// request.add_query_parameter("adjusted", true).add_sort(SortOrder::Ascending);
///
/// assert_eq!(
///   request.build(),
///   "https://api.polygon.io/v2/aggs/ticker/AAPL/range/1/day/2024-01-02/2024-01-31?adjusted=true&sort=asc"
/// );
/// # Ok::<(), poly_core::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Request {
  url: String,
  phase: Phase,
}

impl Request {
  /// Start with an empty URL
  pub fn new() -> Self {
    Self { url: String::with_capacity(INITIAL_CAPACITY), phase: Phase::Path }
  }

  /// Start from a base URL such as `https://api.polygon.io`
  pub fn with_base_url(base_url: &str) -> Self {
    let mut request = Self::new();
    request.url.push_str(base_url);
    request
  }

  /// Append a path segment.
  ///
  /// # Errors
  ///
  /// Returns [`Error::Sequencing`] once any query parameter has been added; the
  /// URL is left untouched in that case.
  pub fn add_path_parameter<'a>(&mut self, value: impl Into<PathParam<'a>>) -> Result<&mut Self> {
    let value = value.into();
    if self.phase == Phase::Query {
      return Err(Error::Sequencing(value.to_string()));
    }
    value.write_to(&mut self.url);
    Ok(self)
  }

  /// Append a `key=value` query parameter, opening the query section on first use
  pub fn add_query_parameter<'a>(
    &mut self,
    key: &str,
    value: impl Into<QueryValue<'a>>,
  ) -> &mut Self {
    match self.phase {
      Phase::Path => {
        self.url.push('?');
        self.phase = Phase::Query;
      }
      Phase::Query => self.url.push('&'),
    }
    self.url.push_str(key);
    self.url.push('=');
    self.url.push_str(&value.into().to_string());
    self
  }

  /// Append `sort=asc` or `sort=desc`
  pub fn add_sort(&mut self, order: SortOrder) -> &mut Self {
    self.add_query_parameter("sort", order.as_str())
  }

  /// Whether the query section has been opened
  pub fn has_query_parameters(&self) -> bool {
    self.phase == Phase::Query
  }

  /// The URL accumulated so far
  pub fn build(&self) -> &str {
    &self.url
  }
}

impl Default for Request {
  fn default() -> Self {
    Self::new()
  }
}

impl fmt::Display for Request {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.url)
  }
}

fn push_segment(url: &mut String, segment: &str) {
  url.push('/');
  url.push_str(segment);
}

#[cfg(test)]
mod tests {
  use super::*;
  use poly_core::PeriodBasis;

  #[test]
  fn test_empty_request() {
    let request = Request::new();
    assert_eq!(request.build(), "");
    assert!(!request.has_query_parameters());
  }

  #[test]
  fn test_path_then_query_order() {
    let mut request = Request::with_base_url("https://api.polygon.io");
    request.add_path_parameter("v3").unwrap().add_path_parameter("reference").unwrap();
    request.add_path_parameter("tickers").unwrap();
    request.add_query_parameter("market", "stocks").add_query_parameter("limit", 100);

    assert_eq!(
      request.build(),
      "https://api.polygon.io/v3/reference/tickers?market=stocks&limit=100"
    );
  }

  #[test]
  fn test_first_query_parameter_uses_single_question_mark() {
    let mut request = Request::with_base_url("http://host");
    request.add_query_parameter("a", "1");
    assert_eq!(request.build(), "http://host?a=1");
    assert_eq!(request.build().matches('?').count(), 1);
    assert_eq!(request.build().matches('&').count(), 0);

    request.add_query_parameter("b", "2");
    assert_eq!(request.build(), "http://host?a=1&b=2");
  }

  #[test]
  fn test_path_after_query_fails_regardless_of_count() {
    for count in 1..5 {
      let mut request = Request::with_base_url("http://host");
      request.add_path_parameter("v2").unwrap();
      for i in 0..count {
        request.add_query_parameter("k", i);
      }
      let before = request.build().to_string();

      let err = request.add_path_parameter("late").unwrap_err();
      assert!(matches!(err, Error::Sequencing(ref p) if p == "late"));
      assert_eq!(request.build(), before);
    }
  }

  #[test]
  fn test_period_renders_two_segments() {
    let mut request = Request::new();
    request.add_path_parameter(Period::new(3, PeriodBasis::Week).unwrap()).unwrap();
    assert_eq!(request.build(), "/3/week");
  }

  #[test]
  fn test_every_period_basis_is_lower_case() {
    let cases = [
      (PeriodBasis::Minute, "/1/minute"),
      (PeriodBasis::Hour, "/1/hour"),
      (PeriodBasis::Day, "/1/day"),
      (PeriodBasis::Week, "/1/week"),
      (PeriodBasis::Month, "/1/month"),
      (PeriodBasis::Quarter, "/1/quarter"),
      (PeriodBasis::Year, "/1/year"),
    ];
    for (basis, expected) in cases {
      let mut request = Request::new();
      request.add_path_parameter(Period::new(1, basis).unwrap()).unwrap();
      assert_eq!(request.build(), expected);
    }
  }

  #[test]
  fn test_date_integer_and_bool_rendering() {
    let mut request = Request::new();
    request
      .add_path_parameter(NaiveDate::from_ymd_opt(2023, 3, 7).unwrap())
      .unwrap()
      .add_path_parameter(42)
      .unwrap()
      .add_path_parameter(-7i64)
      .unwrap();
    request
      .add_query_parameter("adjusted", true)
      .add_query_parameter("unadjusted", false)
      .add_query_parameter("limit", 5000u32);

    assert_eq!(request.build(), "/2023-03-07/42/-7?adjusted=true&unadjusted=false&limit=5000");
  }

  #[test]
  fn test_period_after_query_fails() {
    let mut request = Request::new();
    request.add_sort(SortOrder::Descending);
    let period = Period::new(5, PeriodBasis::Minute).unwrap();
    let err = request.add_path_parameter(period).unwrap_err();
    assert!(matches!(err, Error::Sequencing(ref p) if p == "5/minute"));
    assert_eq!(request.build(), "?sort=desc");
  }

  #[test]
  fn test_sort_parameter() {
    let mut request = Request::new();
    request.add_sort(SortOrder::Ascending).add_sort(SortOrder::Descending);
    assert_eq!(request.build(), "?sort=asc&sort=desc");
  }

  #[test]
  fn test_build_is_repeatable() {
    let mut request = Request::with_base_url("http://host");
    request.add_path_parameter("x").unwrap();
    assert_eq!(request.build(), request.build());
    assert_eq!(request.to_string(), "http://host/x");
    request.add_query_parameter("y", "z");
    assert_eq!(request.build(), "http://host/x?y=z");
  }

  #[test]
  fn test_owned_string_parameters() {
    let ticker = String::from("MSFT");
    let key = String::from("cursor");
    let cursor = String::from("abc123");
    let mut request = Request::new();
    request.add_path_parameter(&ticker).unwrap();
    request.add_query_parameter(&key, &cursor);
    assert_eq!(request.build(), "/MSFT?cursor=abc123");
  }
}
