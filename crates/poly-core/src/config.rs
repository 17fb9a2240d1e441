//! Configuration management for the Polygon client

use crate::error::{Error, Result};
use crate::types::ApiLimit;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use url::Url;

/// Main configuration struct for the Polygon client
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
  /// Polygon.io API key
  pub api_key: String,

  /// Subscription limit used to pick the client-side rate limiter
  pub api_limit: ApiLimit,

  /// Request timeout in seconds
  pub timeout_secs: u64,

  /// Base URL for the Polygon REST API
  pub base_url: String,
}

impl Config {
  /// Load configuration from environment variables
  pub fn from_env() -> Result<Self> {
    dotenv().ok();

    let api_key = env::var("POLYGON_API_KEY")
      .map_err(|_| Error::ApiKey("POLYGON_API_KEY not set".to_string()))?;

    let api_limit = match env::var("POLYGON_API_LIMIT") {
      Ok(value) => value.parse()?,
      Err(_) => ApiLimit::default(),
    };

    let timeout_secs = env::var("POLYGON_TIMEOUT_SECS")
      .unwrap_or_else(|_| crate::DEFAULT_TIMEOUT_SECS.to_string())
      .parse()
      .map_err(|_| Error::Config("Invalid POLYGON_TIMEOUT_SECS".to_string()))?;

    let base_url =
      env::var("POLYGON_BASE_URL").unwrap_or_else(|_| crate::POLYGON_BASE_URL.to_string());

    let config = Config { api_key, api_limit, timeout_secs, base_url };
    config.validate()?;
    Ok(config)
  }

  /// Create a config with default values (for testing)
  pub fn default_with_key(api_key: String) -> Self {
    Config {
      api_key,
      api_limit: ApiLimit::default(),
      timeout_secs: crate::DEFAULT_TIMEOUT_SECS,
      base_url: crate::POLYGON_BASE_URL.to_string(),
    }
  }

  /// Check the key, the timeout and that the base URL is an absolute http(s) URL
  pub fn validate(&self) -> Result<()> {
    if self.api_key.trim().is_empty() {
      return Err(Error::ApiKey("API key is empty".to_string()));
    }
    if self.timeout_secs == 0 {
      return Err(Error::Config("Request timeout must be at least one second".to_string()));
    }

    let url = Url::parse(&self.base_url)
      .map_err(|e| Error::Config(format!("Invalid base URL {}: {}", self.base_url, e)))?;
    if url.scheme() != "http" && url.scheme() != "https" {
      return Err(Error::Config(format!("Unsupported base URL scheme: {}", url.scheme())));
    }
    if url.query().is_some() {
      return Err(Error::Config("Base URL must not carry a query string".to_string()));
    }

    Ok(())
  }

  /// Base URL without a trailing slash, ready for path segments
  pub fn trimmed_base_url(&self) -> &str {
    self.base_url.trim_end_matches('/')
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_config_from_env() {
    env::set_var("POLYGON_API_KEY", "test_key");
    env::set_var("POLYGON_API_LIMIT", "basic");
    let config = Config::from_env().unwrap();
    assert_eq!(config.api_key, "test_key");
    assert_eq!(config.api_limit, ApiLimit::Basic);
    assert_eq!(config.timeout_secs, 30);

    env::set_var("POLYGON_API_LIMIT", "platinum");
    assert!(matches!(Config::from_env(), Err(Error::Config(_))));
    env::remove_var("POLYGON_API_LIMIT");

    env::set_var("POLYGON_TIMEOUT_SECS", "0");
    assert!(matches!(Config::from_env(), Err(Error::Config(_))));
    env::remove_var("POLYGON_TIMEOUT_SECS");

    env::remove_var("POLYGON_API_KEY");
    assert!(matches!(Config::from_env(), Err(Error::ApiKey(_))));
  }

  #[test]
  fn test_default_with_key() {
    let config = Config::default_with_key("abc".to_string());
    assert_eq!(config.api_limit, ApiLimit::Unlimited);
    assert_eq!(config.base_url, "https://api.polygon.io");
    assert!(config.validate().is_ok());
  }

  #[test]
  fn test_validate_rejects_bad_base_url() {
    let mut config = Config::default_with_key("abc".to_string());
    config.base_url = "not a url".to_string();
    assert!(matches!(config.validate(), Err(Error::Config(_))));

    config.base_url = "ftp://api.polygon.io".to_string();
    assert!(matches!(config.validate(), Err(Error::Config(_))));

    config.base_url = "https://api.polygon.io/?x=1".to_string();
    assert!(matches!(config.validate(), Err(Error::Config(_))));
  }

  #[test]
  fn test_validate_rejects_zero_timeout() {
    let mut config = Config::default_with_key("abc".to_string());
    config.timeout_secs = 0;
    assert!(matches!(config.validate(), Err(Error::Config(_))));
  }

  #[test]
  fn test_validate_rejects_empty_key() {
    let config = Config::default_with_key("  ".to_string());
    assert!(matches!(config.validate(), Err(Error::ApiKey(_))));
  }

  #[test]
  fn test_trimmed_base_url() {
    let mut config = Config::default_with_key("abc".to_string());
    config.base_url = "http://localhost:8080/".to_string();
    assert_eq!(config.trimmed_base_url(), "http://localhost:8080");
  }
}
