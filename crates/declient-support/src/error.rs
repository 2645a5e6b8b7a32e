use std::path::PathBuf;

use http::StatusCode;
use strum::Display;

/// Coarse classification of a runtime failure.
///
/// Generated clients surface every failure as an [`ApiError`]; callers that only
/// need to branch on the kind of failure (retry on `Timeout`, re-authenticate on
/// `Auth`, ...) can match on the category instead of the full error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum FailureCategory {
  Transport,
  Status,
  Timeout,
  Cancelled,
  Serialization,
  InvalidRequest,
  Conflict,
  Io,
  Auth,
  NotGenerated,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
  #[error("request failed with status {status}: {body}")]
  Status { status: StatusCode, body: String },

  #[error("request timed out")]
  Timeout,

  #[error("request was cancelled")]
  Cancelled,

  #[error("transport error: {0}")]
  Transport(#[source] reqwest::Error),

  #[error("failed to serialize request body: {0}")]
  Serialize(#[source] serde_json::Error),

  #[error("failed to deserialize response at `{path}`: {source}")]
  Deserialize {
    path: String,
    #[source]
    source: serde_json::Error,
  },

  #[error("invalid request: {0}")]
  InvalidRequest(String),

  #[error("required path parameter `{name}` is null")]
  NullPathParameter { name: String },

  #[error("destination `{}` already exists", .path.display())]
  Conflict { path: PathBuf },

  #[error("i/o error: {0}")]
  Io(#[from] std::io::Error),

  #[error("token provider failed: {0}")]
  Token(String),

  #[error("method `{method}` was not generated: {reason}")]
  NotGenerated {
    method: &'static str,
    reason: &'static str,
  },
}

impl ApiError {
  #[must_use]
  pub fn category(&self) -> FailureCategory {
    match self {
      Self::Status { .. } => FailureCategory::Status,
      Self::Timeout => FailureCategory::Timeout,
      Self::Cancelled => FailureCategory::Cancelled,
      Self::Transport(_) => FailureCategory::Transport,
      Self::Serialize(_) | Self::Deserialize { .. } => FailureCategory::Serialization,
      Self::InvalidRequest(_) | Self::NullPathParameter { .. } => FailureCategory::InvalidRequest,
      Self::Conflict { .. } => FailureCategory::Conflict,
      Self::Io(_) => FailureCategory::Io,
      Self::Token(_) => FailureCategory::Auth,
      Self::NotGenerated { .. } => FailureCategory::NotGenerated,
    }
  }

  /// Status code of a non-success response, if this error carries one.
  #[must_use]
  pub fn status(&self) -> Option<StatusCode> {
    match self {
      Self::Status { status, .. } => Some(*status),
      _ => None,
    }
  }

  pub(crate) fn invalid_request(message: impl Into<String>) -> Self {
    Self::InvalidRequest(message.into())
  }
}

impl From<reqwest::Error> for ApiError {
  fn from(err: reqwest::Error) -> Self {
    if err.is_timeout() {
      Self::Timeout
    } else {
      Self::Transport(err)
    }
  }
}

impl From<http::header::InvalidHeaderValue> for ApiError {
  fn from(err: http::header::InvalidHeaderValue) -> Self {
    Self::invalid_request(format!("invalid header value: {err}"))
  }
}

impl From<http::header::InvalidHeaderName> for ApiError {
  fn from(err: http::header::InvalidHeaderName) -> Self {
    Self::invalid_request(format!("invalid header name: {err}"))
  }
}
