mod common;

use std::{
  sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
  },
  time::Duration,
};

use common::{Ending, MockTransport, serve_short_body};
use declient_support::{
  ApiClient, ApiError, ArrayFormat, CancellationToken, FailureCategory, Method, StaticTokenProvider, Transport,
  async_trait, path_param,
};
use http::StatusCode;
use serde::{Deserialize, Serialize};

/// Never completes; records when the in-flight future is dropped.
#[derive(Debug, Default)]
struct PendingTransport {
  dropped: Arc<AtomicBool>,
}

struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
  fn drop(&mut self) {
    self.0.store(true, Ordering::SeqCst);
  }
}

#[async_trait]
impl Transport for PendingTransport {
  async fn send(&self, _request: reqwest::Request, _cancel: &CancellationToken) -> Result<reqwest::Response, ApiError> {
    let _guard = DropFlag(Arc::clone(&self.dropped));
    std::future::pending::<Result<reqwest::Response, ApiError>>().await
  }
}

fn client_with(transport: Arc<MockTransport>) -> ApiClient {
  ApiClient::builder()
    .base_url("https://api.example.com")
    .transport(transport)
    .build()
    .unwrap()
}

#[tokio::test]
async fn test_path_and_array_query_formats() {
  struct Case {
    format: ArrayFormat<'static>,
    expected: &'static str,
  }

  let cases = [
    Case {
      format: ArrayFormat::Separator(";"),
      expected: "GET /users/42?tags=a;b",
    },
    Case {
      format: ArrayFormat::RepeatedKey,
      expected: "GET /users/42?tags=a&tags=b",
    },
  ];

  for case in cases {
    let transport = MockTransport::new(StatusCode::OK, "{}");
    let client = client_with(Arc::clone(&transport));
    let tags = vec!["a".to_string(), "b".to_string()];

    let mut request = client.request(Method::GET, format!("/users/{}", path_param(&42)));
    request.query_array("tags", tags.iter(), case.format);
    let _: serde_json::Value = client.execute_json(request, None).await.unwrap();

    assert_eq!(transport.last().request_line(), case.expected);
  }
}

#[tokio::test]
async fn test_base_path_is_preserved() {
  let transport = MockTransport::new(StatusCode::OK, "[]");
  let client = ApiClient::builder()
    .base_url("https://api.example.com/v2/")
    .transport(Arc::clone(&transport) as Arc<dyn declient_support::Transport>)
    .build()
    .unwrap();

  let mut request = client.request(Method::GET, "/items");
  request.query("page", &3).query_opt("filter", None::<&str>);
  let items: Vec<u32> = client.execute_json(request, None).await.unwrap();

  assert!(items.is_empty());
  assert_eq!(transport.last().request_line(), "GET /v2/items?page=3");
}

#[tokio::test]
async fn test_json_body_round_trip() {
  #[derive(Debug, PartialEq, Serialize, Deserialize)]
  struct Item {
    id: u64,
    name: String,
  }

  let transport = MockTransport::new(StatusCode::CREATED, r#"{"id":1,"name":"x"}"#);
  let client = client_with(Arc::clone(&transport));
  let item = Item {
    id: 1,
    name: "x".to_string(),
  };

  let mut request = client.request(Method::POST, "/items");
  request.json_body(&item, "application/json").unwrap();
  let created: Item = client.execute_json(request, None).await.unwrap();

  let sent = transport.last();
  assert_eq!(sent.header("content-type"), Some("application/json"));
  let echoed: Item = serde_json::from_slice(sent.body.as_deref().unwrap()).unwrap();
  assert_eq!(echoed, item);
  assert_eq!(created, item);
}

#[tokio::test]
async fn test_removal_directive_drops_default_pairs() {
  let transport = MockTransport::new(StatusCode::OK, "null");
  let client = ApiClient::builder()
    .base_url("https://api.example.com")
    .transport(Arc::clone(&transport) as Arc<dyn declient_support::Transport>)
    .default_query(vec![
      ("api-version".to_string(), "2024-01-01".to_string()),
      ("tenant".to_string(), "acme".to_string()),
    ])
    .build()
    .unwrap();

  let mut request = client.request(Method::GET, "/reports");
  request.query("q", "sales").remove_query("api-version").remove_query("absent");
  let _: Option<serde_json::Value> = client.execute_json(request, None).await.unwrap();
  assert_eq!(transport.last().request_line(), "GET /reports?tenant=acme&q=sales");

  let request = client.request(Method::GET, "/reports");
  client.execute_unit(request, None).await.unwrap();
  assert_eq!(
    transport.last().request_line(),
    "GET /reports?api-version=2024-01-01&tenant=acme"
  );
}

#[tokio::test]
async fn test_authorization_precedence() {
  struct Case {
    name: &'static str,
    user_header: Option<&'static str>,
    skip_auth: bool,
    expected: Option<&'static str>,
  }

  let cases = [
    Case {
      name: "provider token",
      user_header: None,
      skip_auth: false,
      expected: Some("Bearer secret"),
    },
    Case {
      name: "user header overrides",
      user_header: Some("Basic dXNlcg=="),
      skip_auth: false,
      expected: Some("Basic dXNlcg=="),
    },
    Case {
      name: "skip auth",
      user_header: None,
      skip_auth: true,
      expected: None,
    },
  ];

  for case in cases {
    let transport = MockTransport::new(StatusCode::NO_CONTENT, "");
    let client = ApiClient::builder()
      .base_url("https://api.example.com")
      .transport(Arc::clone(&transport) as Arc<dyn declient_support::Transport>)
      .token_provider(Arc::new(StaticTokenProvider::new("secret")))
      .build()
      .unwrap();

    let mut request = client.request(Method::DELETE, "/session");
    request.header_opt("Authorization", case.user_header);
    if case.skip_auth {
      request.skip_auth();
    }
    client.execute_unit(request, None).await.unwrap();

    assert_eq!(transport.last().header("authorization"), case.expected, "{}", case.name);
  }
}

#[tokio::test]
async fn test_status_error_skips_deserialization() {
  let transport = MockTransport::new(StatusCode::NOT_FOUND, "missing");
  let client = client_with(transport);

  let err = client
    .execute_json::<u64>(client.request(Method::GET, "/users/1"), None)
    .await
    .unwrap_err();

  assert_eq!(err.category(), FailureCategory::Status);
  match err {
    ApiError::Status { status, body } => {
      assert_eq!(status, StatusCode::NOT_FOUND);
      assert_eq!(body, "missing");
    }
    other => panic!("unexpected error: {other}"),
  }
}

#[tokio::test]
async fn test_cancellation_drops_in_flight_request() {
  let transport = Arc::new(PendingTransport::default());
  let dropped = Arc::clone(&transport.dropped);
  let client = ApiClient::builder()
    .base_url("https://api.example.com")
    .transport(transport)
    .build()
    .unwrap();

  let cancel = CancellationToken::new();
  let trigger = cancel.clone();
  tokio::spawn(async move {
    tokio::time::sleep(Duration::from_millis(20)).await;
    trigger.cancel();
  });

  let err = client
    .execute_bytes(client.request(Method::GET, "/slow"), Some(&cancel))
    .await
    .unwrap_err();

  assert_eq!(err.category(), FailureCategory::Cancelled);
  assert!(dropped.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_timeout() {
  let client = ApiClient::builder()
    .base_url("https://api.example.com")
    .transport(Arc::new(PendingTransport::default()))
    .timeout(Duration::from_millis(25))
    .build()
    .unwrap();

  let err = client
    .execute_unit(client.request(Method::GET, "/slow"), None)
    .await
    .unwrap_err();
  assert_eq!(err.category(), FailureCategory::Timeout);
}

#[tokio::test]
async fn test_error_body_read_honours_timeout_and_cancellation() {
  struct Case {
    name: &'static str,
    timeout: Option<Duration>,
    cancel_after: Option<Duration>,
    expected: FailureCategory,
  }

  let cases = [
    Case {
      name: "timeout while reading the error body",
      timeout: Some(Duration::from_millis(300)),
      cancel_after: None,
      expected: FailureCategory::Timeout,
    },
    Case {
      name: "cancelled while reading the error body",
      timeout: None,
      cancel_after: Some(Duration::from_millis(200)),
      expected: FailureCategory::Cancelled,
    },
  ];

  for case in cases {
    let base_url = serve_short_body("503 Service Unavailable", 100, b"{\"err", Ending::Stall).await;
    let client = ApiClient::builder().base_url(base_url).maybe_timeout(case.timeout).build().unwrap();

    let cancel = CancellationToken::new();
    if let Some(delay) = case.cancel_after {
      let trigger = cancel.clone();
      tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        trigger.cancel();
      });
    }

    let err = client
      .execute_unit(client.request(Method::GET, "/health"), Some(&cancel))
      .await
      .unwrap_err();
    assert_eq!(err.category(), case.expected, "case: {}", case.name);
  }
}

#[tokio::test]
async fn test_unreadable_error_body_still_reports_status() {
  let base_url = serve_short_body("500 Internal Server Error", 100, b"oops", Ending::Close).await;
  let client = ApiClient::builder().base_url(base_url).build().unwrap();

  let err = client
    .execute_unit(client.request(Method::GET, "/health"), None)
    .await
    .unwrap_err();

  match err {
    ApiError::Status { status, body } => {
      assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
      assert!(body.is_empty());
    }
    other => panic!("unexpected error: {other}"),
  }
}
