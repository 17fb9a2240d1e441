pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use types::{ApiLimit, Period, PeriodBasis, SortOrder};

/// Base URL for the Polygon REST API
pub const POLYGON_BASE_URL: &str = "https://api.polygon.io";

/// Query parameter carrying the API key, always appended last
pub const API_KEY_PARAM: &str = "apiKey";

/// Requests per window on the basic tier
pub const FIXED_WINDOW_PERMITS: u32 = 5;

/// Basic-tier window length in seconds
pub const FIXED_WINDOW_SECS: u64 = 60;

/// Request timeout used when none is configured
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
