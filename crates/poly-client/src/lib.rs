//! # poly-client
//!
//! A small rate-limited client for the Polygon.io REST API.
//!
//! ## Features
//!
//! - **Request builder**: typed path and query parameters with path-before-query ordering
//! - **Rate limiting**: pluggable limiters (no-op, fixed window, sliding window, token bucket)
//! - **Cancellation**: every call honours a `CancellationToken`
//! - **Explicit ownership**: the client releases only the resources it owns
//!
//! ## Usage
//!
//! ```rust,no_run
//! use poly_client::ClientFactory;
//! use poly_core::{Config, Period, PeriodBasis, SortOrder};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let client = ClientFactory::from_config(&config)?;
//!
//!     let mut request = client.request();
//!     request
//!         .add_path_parameter("v2")?
//!         .add_path_parameter("aggs")?
//!         .add_path_parameter("ticker")?
//!         .add_path_parameter("AAPL")?
//!         .add_path_parameter("range")?
//!         .add_path_parameter(Period::new(1, PeriodBasis::Day)?)?
//!         .add_path_parameter("2024-01-02")?
//!         .add_path_parameter("2024-01-31")?;
//!     request.add_query_parameter("adjusted", true).add_sort(SortOrder::Ascending);
//!
//!     let bars: Option<serde_json::Value> = client.send_uncancellable(request).await?;
//!     println!("{:?}", bars);
//!
//!     client.close();
//!     Ok(())
//! }
//! ```
//!
//! ## Rate Limiting
//!
//! The factory picks a limiter from the subscription tier:
//! - Basic / five per minute: 5 requests per one-minute fixed window, callers queue
//! - Unlimited: no client-side throttling
//!
//! ## Error Handling
//!
//! All methods return `Result<T, poly_core::Error>`.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod factory;
pub mod handle;
pub mod limiter;
pub mod request;
pub mod transport;

pub use client::PolygonClient;
pub use factory::ClientFactory;
pub use handle::Handle;
pub use limiter::{
  FixedWindowLimiter, FixedWindowOptions, NoOpLimiter, RateLimitLease, RateLimiter,
  SlidingWindowLimiter, TokenBucketLimiter,
};
pub use poly_core::{ApiLimit, Config, Error, Period, PeriodBasis, Result, SortOrder};
pub use request::{PathParam, QueryValue, Request};
pub use transport::{HttpTransport, ReqwestTransport};
pub use tokio_util::sync::CancellationToken;
