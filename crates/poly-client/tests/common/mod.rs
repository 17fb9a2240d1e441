#![allow(dead_code)]

use async_trait::async_trait;
use poly_client::{CancellationToken, HttpTransport, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::time::Instant;

/// Route test logs through `RUST_LOG` when set
pub fn init_tracing() {
  let _ = tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_test_writer()
    .try_init();
}

/// In-memory transport recording each URL with the (tokio) time it was requested
pub struct StubTransport {
  body: String,
  calls: Mutex<Vec<(String, Instant)>>,
  closed: AtomicBool,
}

impl StubTransport {
  pub fn new(body: &str) -> Arc<Self> {
    Arc::new(Self {
      body: body.to_string(),
      calls: Mutex::new(Vec::new()),
      closed: AtomicBool::new(false),
    })
  }

  pub fn urls(&self) -> Vec<String> {
    self.calls.lock().unwrap().iter().map(|(url, _)| url.clone()).collect()
  }

  pub fn call_times(&self) -> Vec<Instant> {
    self.calls.lock().unwrap().iter().map(|(_, at)| *at).collect()
  }
}

#[async_trait]
impl HttpTransport for StubTransport {
  async fn get(&self, url: &str, _cancel: &CancellationToken) -> Result<String> {
    self.calls.lock().unwrap().push((url.to_string(), Instant::now()));
    Ok(self.body.clone())
  }

  fn close(&self) {
    self.closed.store(true, Ordering::SeqCst);
  }

  fn is_closed(&self) -> bool {
    self.closed.load(Ordering::SeqCst)
  }
}
