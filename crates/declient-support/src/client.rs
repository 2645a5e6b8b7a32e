use std::{future::Future, sync::Arc, time::Duration};

use bytes::Bytes;
use http::{
  HeaderName, HeaderValue, Method,
  header::{AUTHORIZATION, CONTENT_TYPE},
};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{
  ApiError,
  auth::{TokenKind, TokenProvider},
  query::QueryPairs,
  request::{RequestBody, RequestSpec},
  serializer::{ContentSerializer, JsonSerializer, from_value},
  transport::{ReqwestTransport, Transport},
};

const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Shared runtime behind every generated client.
///
/// Cloning is cheap; all clones share the transport, token provider and
/// serializer.
#[derive(Clone)]
pub struct ApiClient {
  inner: Arc<Inner>,
}

struct Inner {
  base_url: Url,
  timeout: Option<Duration>,
  token_kind: TokenKind,
  token_provider: Option<Arc<dyn TokenProvider>>,
  transport: Arc<dyn Transport>,
  serializer: Arc<dyn ContentSerializer>,
  default_query: QueryPairs,
}

impl std::fmt::Debug for ApiClient {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ApiClient")
      .field("base_url", &self.inner.base_url.as_str())
      .field("timeout", &self.inner.timeout)
      .field("token_kind", &self.inner.token_kind)
      .field("authenticated", &self.inner.token_provider.is_some())
      .field("transport", &self.inner.transport)
      .finish_non_exhaustive()
  }
}

#[bon::bon]
impl ApiClient {
  /// # Errors
  ///
  /// Fails when `base_url` is not an absolute URL or the default transport
  /// cannot be created.
  #[builder]
  pub fn new(
    #[builder(into)] base_url: String,
    timeout: Option<Duration>,
    #[builder(default)] token_kind: TokenKind,
    token_provider: Option<Arc<dyn TokenProvider>>,
    transport: Option<Arc<dyn Transport>>,
    serializer: Option<Arc<dyn ContentSerializer>>,
    #[builder(default)] default_query: Vec<(String, String)>,
  ) -> Result<Self, ApiError> {
    let base_url =
      Url::parse(&base_url).map_err(|err| ApiError::invalid_request(format!("invalid base url `{base_url}`: {err}")))?;
    if base_url.cannot_be_a_base() {
      return Err(ApiError::invalid_request(format!("base url `{base_url}` cannot be a base")));
    }

    let transport: Arc<dyn Transport> = match transport {
      Some(transport) => transport,
      None => Arc::new(ReqwestTransport::new()?),
    };

    let mut query = QueryPairs::new();
    for (key, value) in &default_query {
      query.push_raw(key.clone(), value);
    }

    Ok(Self {
      inner: Arc::new(Inner {
        base_url,
        timeout: timeout.filter(|timeout| !timeout.is_zero()),
        token_kind,
        token_provider,
        transport,
        serializer: serializer.unwrap_or_else(|| Arc::new(JsonSerializer)),
        default_query: query,
      }),
    })
  }
}

impl ApiClient {
  #[must_use]
  pub fn base_url(&self) -> &Url {
    &self.inner.base_url
  }

  #[must_use]
  pub fn timeout(&self) -> Option<Duration> {
    self.inner.timeout
  }

  #[must_use]
  pub fn token_kind(&self) -> TokenKind {
    self.inner.token_kind
  }

  #[must_use]
  pub fn request(&self, method: Method, path: impl Into<String>) -> RequestSpec {
    RequestSpec::new(method, path)
  }

  /// Sends the request and decodes a successful response into `T`.
  ///
  /// An empty response body decodes as JSON `null`, so `Option<T>` targets
  /// accept it.
  ///
  /// # Errors
  ///
  /// Returns [`ApiError::Status`] for a non-success status without attempting
  /// to decode the body, and [`ApiError::Deserialize`] when the body does not
  /// match `T`.
  pub async fn execute_json<T: DeserializeOwned>(
    &self,
    spec: RequestSpec,
    cancel: Option<&CancellationToken>,
  ) -> Result<T, ApiError> {
    let fallback = CancellationToken::new();
    let cancel = cancel.unwrap_or(&fallback);

    let response = self.send_checked(spec, cancel).await?;
    let content_type = response
      .headers()
      .get(CONTENT_TYPE)
      .and_then(|value| value.to_str().ok())
      .unwrap_or(DEFAULT_CONTENT_TYPE)
      .to_string();
    let bytes = self.race(cancel, async { response.bytes().await.map_err(ApiError::from) }).await?;

    let value = if bytes.iter().all(u8::is_ascii_whitespace) {
      Value::Null
    } else {
      self.inner.serializer.deserialize(&bytes, &content_type)?
    };
    from_value(value)
  }

  /// # Errors
  ///
  /// Returns [`ApiError::Status`] for a non-success status.
  pub async fn execute_bytes(&self, spec: RequestSpec, cancel: Option<&CancellationToken>) -> Result<Bytes, ApiError> {
    let fallback = CancellationToken::new();
    let cancel = cancel.unwrap_or(&fallback);

    let response = self.send_checked(spec, cancel).await?;
    self.race(cancel, async { response.bytes().await.map_err(ApiError::from) }).await
  }

  /// # Errors
  ///
  /// Returns [`ApiError::Status`] for a non-success status.
  pub async fn execute_unit(&self, spec: RequestSpec, cancel: Option<&CancellationToken>) -> Result<(), ApiError> {
    let fallback = CancellationToken::new();
    let cancel = cancel.unwrap_or(&fallback);

    self.send_checked(spec, cancel).await.map(|_| ())
  }

  /// Prepares and sends the request, converting a non-success status into
  /// [`ApiError::Status`].
  pub(crate) async fn send_checked(
    &self,
    spec: RequestSpec,
    cancel: &CancellationToken,
  ) -> Result<reqwest::Response, ApiError> {
    let request = self.prepare(spec, cancel).await?;
    let method = request.method().clone();
    let url = request.url().clone();
    debug!(%method, %url, "dispatching request");

    let transport = Arc::clone(&self.inner.transport);
    let response = self.race(cancel, transport.send(request, cancel)).await?;

    let status = response.status();
    if status.is_success() {
      debug!(%method, %url, %status, "request succeeded");
      return Ok(response);
    }

    let body = match self
      .race(cancel, async { response.text().await.map_err(ApiError::from) })
      .await
    {
      Ok(body) => body,
      Err(err @ (ApiError::Cancelled | ApiError::Timeout)) => return Err(err),
      Err(err) => {
        debug!(%method, %url, %status, error = %err, "failed to read error body");
        String::new()
      }
    };
    warn!(%method, %url, %status, "request failed");
    Err(ApiError::Status { status, body })
  }

  async fn prepare(&self, spec: RequestSpec, cancel: &CancellationToken) -> Result<reqwest::Request, ApiError> {
    let RequestSpec {
      method,
      path,
      query,
      removals,
      headers,
      body,
      authenticate,
    } = spec;

    let mut url = self.inner.base_url.clone();
    let base_path = url.path().trim_end_matches('/').to_string();
    if path.starts_with('/') {
      url.set_path(&format!("{base_path}{path}"));
    } else {
      url.set_path(&format!("{base_path}/{path}"));
    }

    let mut pairs = self.inner.default_query.clone();
    pairs.extend(&query);
    for key in &removals {
      pairs.remove(key);
    }
    url.set_query(pairs.encode().as_deref());

    let mut request = reqwest::Request::new(method, url);

    if authenticate && let Some(provider) = &self.inner.token_provider {
      let kind = self.inner.token_kind;
      debug!(%kind, "acquiring token");
      let token = self.race(cancel, provider.get_token(kind, cancel)).await?;
      let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;
      value.set_sensitive(true);
      request.headers_mut().insert(AUTHORIZATION, value);
    }

    match body {
      Some(RequestBody::Json { value, content_type }) => {
        let bytes = self.inner.serializer.serialize(&value, &content_type)?;
        request
          .headers_mut()
          .insert(CONTENT_TYPE, HeaderValue::from_str(&content_type)?);
        *request.body_mut() = Some(reqwest::Body::from(bytes));
      }
      Some(RequestBody::Raw { content_type, body }) => {
        request
          .headers_mut()
          .insert(CONTENT_TYPE, HeaderValue::from_str(&content_type)?);
        *request.body_mut() = Some(body);
      }
      None => {}
    }

    for (name, value) in headers {
      let name = HeaderName::from_bytes(name.as_bytes())?;
      let value = HeaderValue::from_str(&value)?;
      request.headers_mut().insert(name, value);
    }

    Ok(request)
  }

  /// Runs `future` against the cancellation token and the configured timeout.
  /// Whichever loses is dropped.
  pub(crate) async fn race<T, F>(&self, cancel: &CancellationToken, future: F) -> Result<T, ApiError>
  where
    F: Future<Output = Result<T, ApiError>>,
  {
    let bounded = async {
      match self.inner.timeout {
        Some(limit) => tokio::time::timeout(limit, future).await.map_err(|_| ApiError::Timeout)?,
        None => future.await,
      }
    };

    tokio::select! {
      biased;
      () = cancel.cancelled() => {
        debug!("request cancelled");
        Err(ApiError::Cancelled)
      }
      result = bounded => result,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_builder_rejects_relative_base_url() {
    let err = ApiClient::builder().base_url("/relative").build().unwrap_err();
    assert!(matches!(err, ApiError::InvalidRequest(_)));
  }

  #[test]
  fn test_zero_timeout_disables() {
    let client = ApiClient::builder()
      .base_url("https://api.example.com")
      .timeout(Duration::ZERO)
      .build()
      .unwrap();
    assert_eq!(client.timeout(), None);
    assert_eq!(client.token_kind(), TokenKind::User);
  }
}
