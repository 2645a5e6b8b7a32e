mod common;

use std::{path::Path, time::Duration};

use common::{Ending, serve_short_body};
use declient_support::{ApiClient, ApiError, COPY_BUFFER_SIZE, CancellationToken, FailureCategory, Method};
use wiremock::{
  Mock, MockServer, ResponseTemplate,
  matchers::{method, path},
};

fn payload() -> Vec<u8> {
  (0..COPY_BUFFER_SIZE * 3 + 17).map(|i| (i % 251) as u8).collect()
}

async fn serve(server: &MockServer, status: u16, body: Vec<u8>, expected_calls: u64) {
  Mock::given(method("GET"))
    .and(path("/files/report.bin"))
    .respond_with(ResponseTemplate::new(status).set_body_bytes(body))
    .expect(expected_calls)
    .mount(server)
    .await;
}

fn client_for(server: &MockServer) -> ApiClient {
  ApiClient::builder().base_url(server.uri()).build().unwrap()
}

#[tokio::test]
async fn test_download_is_byte_for_byte() {
  let server = MockServer::start().await;
  let body = payload();
  serve(&server, 200, body.clone(), 1).await;

  let client = client_for(&server);
  let dir = tempfile::tempdir().unwrap();
  let destination = dir.path().join("report.bin");

  let written = client
    .download(client.request(Method::GET, "/files/report.bin"), &destination, true, None)
    .await
    .unwrap();

  assert_eq!(written, body.len() as u64);
  assert_eq!(std::fs::read(&destination).unwrap(), body);
}

#[tokio::test]
async fn test_existing_file_without_overwrite_conflicts() {
  let server = MockServer::start().await;
  serve(&server, 200, payload(), 0).await;

  let client = client_for(&server);
  let dir = tempfile::tempdir().unwrap();
  let destination = dir.path().join("report.bin");
  std::fs::write(&destination, b"original").unwrap();

  let err = client
    .download(client.request(Method::GET, "/files/report.bin"), &destination, false, None)
    .await
    .unwrap_err();

  assert_eq!(err.category(), FailureCategory::Conflict);
  assert!(matches!(err, ApiError::Conflict { ref path } if path == &destination));
  assert_eq!(std::fs::read(&destination).unwrap(), b"original");
}

#[tokio::test]
async fn test_existing_file_with_overwrite_is_replaced() {
  let server = MockServer::start().await;
  let body = payload();
  serve(&server, 200, body.clone(), 1).await;

  let client = client_for(&server);
  let dir = tempfile::tempdir().unwrap();
  let destination = dir.path().join("report.bin");
  std::fs::write(&destination, b"stale contents that are longer than nothing").unwrap();

  client
    .download(client.request(Method::GET, "/files/report.bin"), &destination, true, None)
    .await
    .unwrap();

  assert_eq!(std::fs::read(&destination).unwrap(), body);
}

#[tokio::test]
async fn test_failed_status_creates_no_file() {
  let server = MockServer::start().await;
  serve(&server, 404, b"not here".to_vec(), 1).await;

  let client = client_for(&server);
  let dir = tempfile::tempdir().unwrap();
  let destination = dir.path().join("report.bin");

  let err = client
    .download(client.request(Method::GET, "/files/report.bin"), &destination, false, None)
    .await
    .unwrap_err();

  assert_eq!(err.status().map(|status| status.as_u16()), Some(404));
  assert!(!destination.exists());
}

fn directory_entries(dir: &Path) -> Vec<String> {
  let mut names = std::fs::read_dir(dir)
    .unwrap()
    .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
    .collect::<Vec<_>>();
  names.sort();
  names
}

#[tokio::test]
async fn test_truncated_body_keeps_original_on_overwrite() {
  let base_url = serve_short_body("200 OK", 1000, b"partial", Ending::Close).await;
  let client = ApiClient::builder().base_url(base_url).build().unwrap();
  let dir = tempfile::tempdir().unwrap();
  let destination = dir.path().join("report.bin");
  std::fs::write(&destination, b"precious original").unwrap();

  let err = client
    .download(client.request(Method::GET, "/files/report.bin"), &destination, true, None)
    .await
    .unwrap_err();

  assert_eq!(err.category(), FailureCategory::Transport);
  assert_eq!(std::fs::read(&destination).unwrap(), b"precious original");
  assert_eq!(directory_entries(dir.path()), vec!["report.bin".to_string()]);
}

#[tokio::test]
async fn test_interrupted_download_leaves_nothing_behind() {
  struct Case {
    name: &'static str,
    timeout: Option<Duration>,
    cancel_after: Option<Duration>,
    expected: FailureCategory,
  }

  let cases = [
    Case {
      name: "cancelled mid-stream",
      timeout: None,
      cancel_after: Some(Duration::from_millis(200)),
      expected: FailureCategory::Cancelled,
    },
    Case {
      name: "body stalls past the timeout",
      timeout: Some(Duration::from_millis(300)),
      cancel_after: None,
      expected: FailureCategory::Timeout,
    },
  ];

  for case in cases {
    let base_url = serve_short_body("200 OK", 1000, b"partial", Ending::Stall).await;
    let client = ApiClient::builder().base_url(base_url).maybe_timeout(case.timeout).build().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let destination = dir.path().join("report.bin");

    let token = CancellationToken::new();
    if let Some(delay) = case.cancel_after {
      let token = token.clone();
      tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        token.cancel();
      });
    }

    let err = client
      .download(
        client.request(Method::GET, "/files/report.bin"),
        &destination,
        false,
        Some(&token),
      )
      .await
      .unwrap_err();

    assert_eq!(err.category(), case.expected, "case: {}", case.name);
    assert!(directory_entries(dir.path()).is_empty(), "case: {}", case.name);
  }
}

#[tokio::test]
async fn test_cancelled_overwrite_keeps_original() {
  let base_url = serve_short_body("200 OK", 1000, b"partial", Ending::Stall).await;
  let client = ApiClient::builder().base_url(base_url).build().unwrap();
  let dir = tempfile::tempdir().unwrap();
  let destination = dir.path().join("report.bin");
  std::fs::write(&destination, b"precious original").unwrap();

  let token = CancellationToken::new();
  let canceller = token.clone();
  tokio::spawn(async move {
    tokio::time::sleep(Duration::from_millis(200)).await;
    canceller.cancel();
  });

  let err = client
    .download(
      client.request(Method::GET, "/files/report.bin"),
      &destination,
      true,
      Some(&token),
    )
    .await
    .unwrap_err();

  assert!(matches!(err, ApiError::Cancelled));
  assert_eq!(std::fs::read(&destination).unwrap(), b"precious original");
  assert_eq!(directory_entries(dir.path()), vec!["report.bin".to_string()]);
}
