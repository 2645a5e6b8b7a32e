use std::path::Path;

use declient_support::{ApiError, CancellationToken};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
  pub id: u64,
  pub name: String,
}

/// Users of the example service.
#[allow(async_fn_in_trait)]
pub trait UserApi {
  async fn get_user(&self, id: u64, tags: Vec<String>) -> Result<User, ApiError>;
  async fn list_users(
    &self,
    tags: Vec<String>,
    page: Option<u32>,
    cancel: &CancellationToken,
  ) -> Result<Vec<User>, ApiError>;
  async fn create_user(&self, user: &User, request_id: Option<String>) -> Result<User, ApiError>;
  async fn delete_user(&self, id: u64, flags: Vec<String>) -> Result<(), ApiError>;
  async fn upload_avatar(&self, id: &str, image: Vec<u8>) -> Result<(), ApiError>;
  async fn whoami(&self, authorization: Option<String>) -> Result<User, ApiError>;
  async fn health(&self) -> Result<(), ApiError>;
  async fn download_report(&self, name: &str, destination: &Path) -> Result<u64, ApiError>;
  /// Two bodies cannot be sent, so this one is generated as a stub.
  async fn merge_users(&self, first: User, second: User) -> Result<User, ApiError>;
}
/// HTTP client implementing [`UserApi`].
#[derive(Debug, Clone)]
pub struct UserApiClient {
  client: ::declient_support::ApiClient,
}
impl UserApiClient {
  pub const BASE_URL: &'static str = "https://api.example.com/v1";
  pub const REGISTRY_GROUP: Option<&'static str> = None;
  pub const TIMEOUT_SECS: u64 = 30u64;
  pub const CONTENT_TYPE: &'static str = "application/json";
  pub const TOKEN_KIND: ::declient_support::TokenKind = ::declient_support::TokenKind::App;
  /// Client against [`Self::BASE_URL`].
  pub fn new() -> Result<Self, ::declient_support::ApiError> {
    Self::with_base_url(Self::BASE_URL)
  }
  pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ::declient_support::ApiError> {
    let client = ::declient_support::ApiClient::builder()
      .base_url(base_url)
      .timeout(::std::time::Duration::from_secs(Self::TIMEOUT_SECS))
      .token_kind(Self::TOKEN_KIND)
      .build()?;
    Ok(Self { client })
  }
  /// Wraps a preconfigured runtime client, e.g. one with a token provider.
  #[must_use]
  pub fn with_client(client: ::declient_support::ApiClient) -> Self {
    Self { client }
  }
  #[must_use]
  pub fn client(&self) -> &::declient_support::ApiClient {
    &self.client
  }
}
impl UserApi for UserApiClient {
  async fn get_user(&self, id: u64, tags: Vec<String>) -> Result<User, ApiError> {
    let mut request = self.client.request(
      ::declient_support::Method::GET,
      format!("/users/{}", ::declient_support::path_param(&id)),
    );
    request.query_array("tags", tags.iter(), ::declient_support::ArrayFormat::Separator(";"));
    request.remove_query("api-version");
    Ok(self.client.execute_json::<User>(request, None).await?)
  }
  async fn list_users(
    &self,
    tags: Vec<String>,
    page: Option<u32>,
    cancel: &CancellationToken,
  ) -> Result<Vec<User>, ApiError> {
    let mut request = self.client.request(::declient_support::Method::GET, "/users");
    request.query_array("tags", tags.iter(), ::declient_support::ArrayFormat::RepeatedKey);
    request.query_opt("page", page.as_ref());
    Ok(self.client.execute_json::<Vec<User>>(request, Some(cancel)).await?)
  }
  async fn create_user(&self, user: &User, request_id: Option<String>) -> Result<User, ApiError> {
    let mut request = self.client.request(::declient_support::Method::POST, "/users");
    request.header_opt("x-request-id", request_id.as_ref());
    request.json_body(&user, "application/json")?;
    Ok(self.client.execute_json::<User>(request, None).await?)
  }
  async fn delete_user(&self, id: u64, flags: Vec<String>) -> Result<(), ApiError> {
    let mut request = self.client.request(
      ::declient_support::Method::DELETE,
      format!("/users/{}", ::declient_support::path_param(&id)),
    );
    request.query_array("f", flags.iter(), ::declient_support::ArrayFormat::RepeatedKey);
    request.remove_query("api-version");
    self.client.execute_unit(request, None).await?;
    Ok(())
  }
  async fn upload_avatar(&self, id: &str, image: Vec<u8>) -> Result<(), ApiError> {
    let mut request = self.client.request(
      ::declient_support::Method::PUT,
      format!("/users/{}/avatar", ::declient_support::path_param(&id)),
    );
    request.raw_body("image/png", image);
    self.client.execute_unit(request, None).await?;
    Ok(())
  }
  async fn whoami(&self, authorization: Option<String>) -> Result<User, ApiError> {
    let mut request = self.client.request(::declient_support::Method::GET, "/me");
    request.header_opt("Authorization", authorization.as_ref());
    Ok(self.client.execute_json::<User>(request, None).await?)
  }
  async fn health(&self) -> Result<(), ApiError> {
    let mut request = self.client.request(::declient_support::Method::GET, "/health");
    request.skip_auth();
    self.client.execute_unit(request, None).await?;
    Ok(())
  }
  async fn download_report(&self, name: &str, destination: &Path) -> Result<u64, ApiError> {
    let request = self.client.request(
      ::declient_support::Method::GET,
      format!("/reports/{}", ::declient_support::path_param(&name)),
    );
    Ok(self.client.download(request, &destination, false, None).await?)
  }
  #[allow(unused_variables)]
  async fn merge_users(&self, first: User, second: User) -> Result<User, ApiError> {
    Err(
      ::declient_support::ApiError::NotGenerated {
        method: "merge_users",
        reason: "parameter `second` is a second `#[body]` parameter, `first` already is the body",
      }
      .into(),
    )
  }
}
