use std::path::Path;

use declient_support::{ApiError, CancellationToken};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
  pub id: u64,
  pub name: String,
}

/// Users of the example service.
#[http_api(base_url = "https://api.example.com/v1", timeout = 30, token_kind = "app")]
pub trait UserApi {
  #[get("/users/{id}")]
  #[array_query("api-version")]
  async fn get_user(&self, id: u64, #[array_query(separator = ";")] tags: Vec<String>) -> Result<User, ApiError>;

  #[get("/users")]
  async fn list_users(
    &self,
    tags: Vec<String>,
    page: Option<u32>,
    cancel: &CancellationToken,
  ) -> Result<Vec<User>, ApiError>;

  #[post("/users")]
  async fn create_user(
    &self,
    #[body] user: &User,
    #[header(name = "x-request-id")] request_id: Option<String>,
  ) -> Result<User, ApiError>;

  #[delete("/users/{id}")]
  #[array_query("api-version")]
  async fn delete_user(&self, id: u64, #[query(name = "f")] flags: Vec<String>) -> Result<(), ApiError>;

  #[put("/users/{id}/avatar")]
  #[content_type("image/png")]
  async fn upload_avatar(&self, id: &str, #[body] image: Vec<u8>) -> Result<(), ApiError>;

  #[get("/me")]
  async fn whoami(&self, #[header(name = "Authorization")] authorization: Option<String>) -> Result<User, ApiError>;

  #[get("/health")]
  #[skip_auth]
  async fn health(&self) -> Result<(), ApiError>;

  #[get("/reports/{name}")]
  async fn download_report(
    &self,
    name: &str,
    #[file_path(overwrite = false)] destination: &Path,
  ) -> Result<u64, ApiError>;

  /// Two bodies cannot be sent, so this one is generated as a stub.
  #[post("/users/merge")]
  async fn merge_users(&self, #[body] first: User, #[body] second: User) -> Result<User, ApiError>;
}
