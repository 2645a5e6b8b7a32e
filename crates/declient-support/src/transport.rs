use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::ApiError;

/// Sends a fully prepared request.
///
/// The client has already resolved the URL, query, headers and body. A
/// transport only moves bytes; it must return promptly with
/// [`ApiError::Cancelled`] once `cancel` fires.
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
  async fn send(&self, request: reqwest::Request, cancel: &CancellationToken) -> Result<reqwest::Response, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
  client: reqwest::Client,
}

impl ReqwestTransport {
  /// # Errors
  ///
  /// Fails when the TLS backend cannot be initialized.
  pub fn new() -> Result<Self, ApiError> {
    let client = reqwest::Client::builder().build()?;
    Ok(Self { client })
  }

  #[must_use]
  pub fn with_client(client: reqwest::Client) -> Self {
    Self { client }
  }
}

#[async_trait]
impl Transport for ReqwestTransport {
  async fn send(&self, request: reqwest::Request, cancel: &CancellationToken) -> Result<reqwest::Response, ApiError> {
    tokio::select! {
      biased;
      () = cancel.cancelled() => Err(ApiError::Cancelled),
      response = self.client.execute(request) => Ok(response?),
    }
  }
}
