#![allow(dead_code)]

use std::{
  sync::{Arc, Mutex},
  time::Duration,
};

use declient_support::{ApiError, CancellationToken, Method, Transport, async_trait};
use http::StatusCode;
use tokio::{
  io::{AsyncReadExt, AsyncWriteExt},
  net::TcpListener,
};

#[derive(Debug, Clone)]
pub struct Captured {
  pub method: Method,
  pub url: reqwest::Url,
  pub headers: http::HeaderMap,
  pub body: Option<Vec<u8>>,
}

impl Captured {
  pub fn request_line(&self) -> String {
    match self.url.query() {
      Some(query) => format!("{} {}?{query}", self.method, self.url.path()),
      None => format!("{} {}", self.method, self.url.path()),
    }
  }

  pub fn header(&self, name: &str) -> Option<&str> {
    self.headers.get(name).and_then(|value| value.to_str().ok())
  }
}

#[derive(Debug)]
pub struct MockTransport {
  status: StatusCode,
  body: &'static str,
  captured: Mutex<Vec<Captured>>,
}

impl MockTransport {
  pub fn new(status: StatusCode, body: &'static str) -> Arc<Self> {
    Arc::new(Self {
      status,
      body,
      captured: Mutex::new(vec![]),
    })
  }

  pub fn last(&self) -> Captured {
    self.captured.lock().unwrap().last().cloned().expect("no request captured")
  }

  pub fn captured(&self) -> Vec<Captured> {
    self.captured.lock().unwrap().clone()
  }
}

#[async_trait]
impl Transport for MockTransport {
  async fn send(&self, request: reqwest::Request, _cancel: &CancellationToken) -> Result<reqwest::Response, ApiError> {
    self.captured.lock().unwrap().push(Captured {
      method: request.method().clone(),
      url: request.url().clone(),
      headers: request.headers().clone(),
      body: request.body().and_then(reqwest::Body::as_bytes).map(<[u8]>::to_vec),
    });
    let response = http::Response::builder()
      .status(self.status)
      .header("content-type", "application/json")
      .body(self.body)
      .unwrap();
    Ok(reqwest::Response::from(response))
  }
}

/// What the server does after writing the short body.
#[derive(Debug, Clone, Copy)]
pub enum Ending {
  Close,
  Stall,
}

/// Serves a single response whose `content-length` promises `declared` bytes
/// while only `body` is ever sent. Returns the base url.
pub async fn serve_short_body(status: &'static str, declared: usize, body: &'static [u8], ending: Ending) -> String {
  let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
  let address = listener.local_addr().unwrap();

  tokio::spawn(async move {
    let Ok((mut socket, _)) = listener.accept().await else {
      return;
    };
    let mut request = Vec::new();
    let mut buffer = [0_u8; 1024];
    while !request.windows(4).any(|window| window == b"\r\n\r\n") {
      match socket.read(&mut buffer).await {
        Ok(0) | Err(_) => return,
        Ok(read) => request.extend_from_slice(&buffer[..read]),
      }
    }

    let head = format!(
      "HTTP/1.1 {status}\r\ncontent-type: application/octet-stream\r\ncontent-length: {declared}\r\n\r\n"
    );
    let _ = socket.write_all(head.as_bytes()).await;
    let _ = socket.write_all(body).await;
    let _ = socket.flush().await;

    if let Ending::Stall = ending {
      tokio::time::sleep(Duration::from_secs(30)).await;
    }
  });

  format!("http://{address}")
}
