//! Request option types shared by the client and its configuration

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Sort order for aggregate and list endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortOrder {
  /// Oldest first
  Ascending,
  /// Newest first
  Descending,
}

impl SortOrder {
  /// Wire value of the `sort` query parameter
  pub fn as_str(&self) -> &'static str {
    match self {
      SortOrder::Ascending => "asc",
      SortOrder::Descending => "desc",
    }
  }
}

impl std::fmt::Display for SortOrder {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Request limits of a Polygon.io subscription.
///
/// The limits Polygon actually enforces may change without being reflected here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiLimit {
  /// Free tier, 5 calls per minute
  Basic,
  /// Explicit 5 calls per minute
  FivePerMinute,
  /// Paid tiers, no client-side throttling
  #[default]
  Unlimited,
}

impl ApiLimit {
  /// Calls allowed per one-minute window, `None` when unthrottled
  pub fn permits_per_minute(&self) -> Option<u32> {
    match self {
      ApiLimit::Basic | ApiLimit::FivePerMinute => Some(crate::FIXED_WINDOW_PERMITS),
      ApiLimit::Unlimited => None,
    }
  }
}

impl std::fmt::Display for ApiLimit {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      ApiLimit::Basic => write!(f, "basic"),
      ApiLimit::FivePerMinute => write!(f, "five_per_minute"),
      ApiLimit::Unlimited => write!(f, "unlimited"),
    }
  }
}

impl FromStr for ApiLimit {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "basic" => Ok(ApiLimit::Basic),
      "five_per_minute" | "5_per_minute" => Ok(ApiLimit::FivePerMinute),
      "unlimited" => Ok(ApiLimit::Unlimited),
      other => Err(Error::Config(format!("Unknown API limit: {}", other))),
    }
  }
}
