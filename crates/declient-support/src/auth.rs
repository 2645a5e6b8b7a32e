use async_trait::async_trait;
use strum::Display;
use tokio_util::sync::CancellationToken;

use crate::ApiError;

/// Which credential an interface authenticates with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum TokenKind {
  Tenant,
  App,
  #[default]
  User,
}

/// Supplies bearer tokens for outgoing requests.
///
/// Called once per authenticated request, immediately before dispatch, so
/// implementations decide their own caching and refresh policy.
#[async_trait]
pub trait TokenProvider: Send + Sync + std::fmt::Debug {
  async fn get_token(&self, kind: TokenKind, cancel: &CancellationToken) -> Result<String, ApiError>;
}

/// Hands out the same token for every kind.
#[derive(Clone)]
pub struct StaticTokenProvider {
  token: String,
}

impl StaticTokenProvider {
  #[must_use]
  pub fn new(token: impl Into<String>) -> Self {
    Self { token: token.into() }
  }
}

impl std::fmt::Debug for StaticTokenProvider {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("StaticTokenProvider").finish_non_exhaustive()
  }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
  async fn get_token(&self, _kind: TokenKind, cancel: &CancellationToken) -> Result<String, ApiError> {
    if cancel.is_cancelled() {
      return Err(ApiError::Cancelled);
    }
    Ok(self.token.clone())
  }
}
