mod common;

use common::StubTransport;
use futures::future::join_all;
use poly_client::{
  ApiLimit, ClientFactory, Handle, HttpTransport, PolygonClient, RateLimiter, SlidingWindowLimiter,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

fn stub_client(
  transport: &Arc<StubTransport>,
  limiter: Arc<dyn RateLimiter>,
  owns_limiter: bool,
) -> PolygonClient {
  let transport: Arc<dyn HttpTransport> = transport.clone();
  PolygonClient::new(
    "k",
    "https://api.polygon.io",
    Handle::Owned(transport),
    Handle::new(limiter, owns_limiter),
  )
}

async fn fire(client: &PolygonClient, id: usize) {
  let mut request = client.request();
  request.add_path_parameter("v1").unwrap().add_path_parameter("call").unwrap();
  request.add_query_parameter("id", id as i64);
  let _: Option<serde_json::Value> = client.send_uncancellable(request).await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_unlimited_never_waits_for_permits() {
  common::init_tracing();
  let transport = StubTransport::new("{}");
  let limiter = ClientFactory::limiter_for(ApiLimit::Unlimited).unwrap();
  let client = stub_client(&transport, limiter, true);
  let start = Instant::now();

  join_all((0..100).map(|id| fire(&client, id))).await;

  assert_eq!(transport.urls().len(), 100);
  assert!(transport.call_times().iter().all(|at| *at == start));
  assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_fixed_window_paces_twenty_back_to_back_calls() {
  common::init_tracing();
  let transport = StubTransport::new("{}");
  let limiter = ClientFactory::limiter_for(ApiLimit::FivePerMinute).unwrap();
  let client = stub_client(&transport, limiter, true);
  let start = Instant::now();

  join_all((0..20).map(|id| fire(&client, id))).await;

  let mut offsets: Vec<Duration> = transport.call_times().iter().map(|at| *at - start).collect();
  offsets.sort();
  assert_eq!(offsets.len(), 20);

  // five calls per window, the sixth onwards waits for replenishment
  for (i, offset) in offsets.iter().enumerate() {
    assert_eq!(*offset, Duration::from_secs(60 * (i as u64 / 5)));
  }
  for (i, begin) in offsets.iter().enumerate() {
    let within = offsets[i..].iter().filter(|t| **t < *begin + Duration::from_secs(60)).count();
    assert!(within <= 5, "{} calls within 60s starting at {:?}", within, begin);
  }

  // calls are admitted in the order they arrived
  let ids: Vec<String> = transport.urls();
  for (i, url) in ids.iter().enumerate() {
    assert!(url.contains(&format!("?id={}&", i)), "{} out of order", url);
  }
}

#[tokio::test(start_paused = true)]
async fn test_sliding_window_bounds_every_rolling_minute() {
  let transport = StubTransport::new("{}");
  let limiter: Arc<dyn RateLimiter> =
    Arc::new(SlidingWindowLimiter::new(5, Duration::from_secs(60)).unwrap());
  let client = stub_client(&transport, limiter, true);
  let start = Instant::now();

  join_all((0..3).map(|id| fire(&client, id))).await;
  tokio::time::sleep(Duration::from_secs(45)).await;
  join_all((3..12).map(|id| fire(&client, id))).await;

  let offsets: Vec<Duration> = transport.call_times().iter().map(|at| *at - start).collect();
  for begin in &offsets {
    let within = offsets
      .iter()
      .filter(|t| *t >= begin && **t < *begin + Duration::from_secs(60))
      .count();
    assert!(within <= 5);
  }
  assert_eq!(offsets.len(), 12);
}

#[tokio::test]
async fn test_api_key_is_always_last() {
  let transport = StubTransport::new("{}");
  let limiter = ClientFactory::limiter_for(ApiLimit::Unlimited).unwrap();
  let client = stub_client(&transport, limiter, true);

  for count in 0..8 {
    let mut request = client.request();
    request.add_path_parameter("v3").unwrap();
    for i in 0..count {
      request.add_query_parameter("p", i);
    }
    let _: Option<serde_json::Value> = client.send_uncancellable(request).await.unwrap();
  }

  for url in transport.urls() {
    assert!(url.ends_with("apiKey=k"), "{}", url);
    assert_eq!(url.matches("apiKey=").count(), 1);
    assert_eq!(url.matches('?').count(), 1);
  }
}

#[tokio::test]
async fn test_shared_limiter_outlives_one_client() {
  let limiter = ClientFactory::limiter_for(ApiLimit::Basic).unwrap();
  let first = StubTransport::new("{}");
  let second = StubTransport::new("{}");

  let a = stub_client(&first, limiter.clone(), false);
  let b = stub_client(&second, limiter.clone(), false);

  fire(&a, 0).await;
  a.close();
  assert!(first.is_closed());
  assert!(!limiter.is_disposed());

  fire(&b, 1).await;
  assert_eq!(limiter.available_permits(), Some(3));
  b.close();
  assert!(!limiter.is_disposed());
}
