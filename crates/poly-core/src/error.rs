use thiserror::Error;

/// The main error type for poly-* crates
#[derive(Error, Debug)]
pub enum Error {
  /// Configuration error
  #[error("Configuration error: {0}")]
  Config(String),

  /// API key error
  #[error("Failed to retrieve API key: {0}")]
  ApiKey(String),

  /// A path parameter was added after the query section was opened
  #[error("Attempted to add path parameter \"{0}\" after query parameters have been added")]
  Sequencing(String),

  /// The caller's cancellation token fired before the call completed
  #[error("Request cancelled")]
  Cancelled,

  /// The limiter's wait queue is bounded and already full
  #[error(
    "Rate limiter queue is full: {requested} permit(s) requested, {queued} queued, limit {queue_limit}"
  )]
  LimiterSaturated {
    /// Permits requested by the rejected acquisition
    requested: u32,
    /// Permits already waiting in the queue
    queued: usize,
    /// Configured queue capacity in permits
    queue_limit: usize,
  },

  /// The limiter was disposed while (or before) waiting for a permit
  #[error("Rate limiter has been disposed")]
  LimiterClosed,

  /// A single acquisition asked for more permits than the limiter can ever grant
  #[error("Invalid permit count {requested}: limiter grants at most {limit} per acquisition")]
  InvalidPermitCount {
    /// Permits requested
    requested: u32,
    /// Largest acquisition the limiter supports
    limit: u32,
  },

  /// HTTP transport error (connection, TLS, timeout, body read)
  #[error("HTTP error: {0}")]
  Http(String),

  /// The server answered with a non-success status
  #[error("HTTP status {status}: {body}")]
  Status {
    /// HTTP status code
    status: u16,
    /// Response body, truncated
    body: String,
  },

  /// Response body did not match the expected shape
  #[error("Failed to decode response: {0}")]
  Decode(#[from] serde_json::Error),
}

impl Error {
  /// Whether a caller-side retry of the same request might succeed.
  ///
  /// The client itself never retries; this only classifies the failure.
  pub fn is_retryable(&self) -> bool {
    match self {
      Error::Http(_) => true,
      Error::Status { status, .. } => *status == 429 || *status >= 500,
      _ => false,
    }
  }
}

/// Result type alias for poly-* crates
pub type Result<T> = std::result::Result<T, Error>;
