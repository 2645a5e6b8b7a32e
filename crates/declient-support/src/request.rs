use std::fmt::Display;

use http::Method;
use serde::Serialize;
use serde_json::Value;

use crate::{
  ApiError,
  query::{ArrayFormat, QueryPairs},
  serializer::to_value,
};

pub(crate) enum RequestBody {
  Json { value: Value, content_type: String },
  Raw { content_type: String, body: reqwest::Body },
}

impl std::fmt::Debug for RequestBody {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Json { content_type, .. } => f.debug_struct("Json").field("content_type", content_type).finish(),
      Self::Raw { content_type, .. } => f.debug_struct("Raw").field("content_type", content_type).finish(),
    }
  }
}

/// One outgoing call, accumulated by generated method bodies and turned into a
/// concrete request by [`ApiClient`](crate::ApiClient).
///
/// Query pairs added here follow the client's default pairs; removals apply to
/// the combined list after every pair has been added.
#[derive(Debug)]
pub struct RequestSpec {
  pub(crate) method: Method,
  pub(crate) path: String,
  pub(crate) query: QueryPairs,
  pub(crate) removals: Vec<String>,
  pub(crate) headers: Vec<(String, String)>,
  pub(crate) body: Option<RequestBody>,
  pub(crate) authenticate: bool,
}

impl RequestSpec {
  #[must_use]
  pub fn new(method: Method, path: impl Into<String>) -> Self {
    Self {
      method,
      path: path.into(),
      query: QueryPairs::new(),
      removals: vec![],
      headers: vec![],
      body: None,
      authenticate: true,
    }
  }

  pub fn query<V: Display + ?Sized>(&mut self, key: &str, value: &V) -> &mut Self {
    self.query.push(key, value);
    self
  }

  /// Adds the pair only when `value` is present.
  pub fn query_opt<V: Display>(&mut self, key: &str, value: Option<V>) -> &mut Self {
    if let Some(value) = value {
      self.query.push(key, &value);
    }
    self
  }

  pub fn query_array<I>(&mut self, key: &str, values: I, format: ArrayFormat<'_>) -> &mut Self
  where
    I: IntoIterator,
    I::Item: Display,
  {
    self.query.push_array(key, values, format);
    self
  }

  pub fn remove_query(&mut self, key: &str) -> &mut Self {
    self.removals.push(key.to_string());
    self
  }

  /// Sets a header, replacing any earlier value for the same name. Name and
  /// value are validated when the request is prepared.
  pub fn header<V: Display + ?Sized>(&mut self, name: &str, value: &V) -> &mut Self {
    self.headers.push((name.to_string(), value.to_string()));
    self
  }

  /// Sets the header only when `value` is present.
  pub fn header_opt<V: Display>(&mut self, name: &str, value: Option<V>) -> &mut Self {
    if let Some(value) = value {
      self.header(name, &value);
    }
    self
  }

  /// Serializes `body` as the structured request body. A value that
  /// serializes to null produces no body.
  ///
  /// # Errors
  ///
  /// Returns [`ApiError::Serialize`] when `body` cannot be represented as JSON.
  pub fn json_body<T: Serialize + ?Sized>(&mut self, body: &T, content_type: &str) -> Result<&mut Self, ApiError> {
    let value = to_value(body)?;
    self.body = match value {
      Value::Null => None,
      value => Some(RequestBody::Json {
        value,
        content_type: content_type.to_string(),
      }),
    };
    Ok(self)
  }

  pub fn raw_body(&mut self, content_type: &str, body: impl Into<reqwest::Body>) -> &mut Self {
    self.body = Some(RequestBody::Raw {
      content_type: content_type.to_string(),
      body: body.into(),
    });
    self
  }

  pub fn skip_auth(&mut self) -> &mut Self {
    self.authenticate = false;
    self
  }

  #[must_use]
  pub fn method(&self) -> &Method {
    &self.method
  }

  #[must_use]
  pub fn path(&self) -> &str {
    &self.path
  }

  #[must_use]
  pub fn query_pairs(&self) -> &QueryPairs {
    &self.query
  }

  #[must_use]
  pub fn has_body(&self) -> bool {
    self.body.is_some()
  }

  #[must_use]
  pub fn authenticates(&self) -> bool {
    self.authenticate
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_absent_header_is_skipped() {
    let mut spec = RequestSpec::new(Method::GET, "/");
    spec.header_opt("X-Trace", None::<&str>).header("X-Id", &7);
    assert_eq!(spec.headers, vec![("X-Id".to_string(), "7".to_string())]);
  }

  #[test]
  fn test_null_json_body_is_absent() {
    let mut spec = RequestSpec::new(Method::POST, "/items");
    spec.json_body(&None::<u32>, "application/json").unwrap();
    assert!(!spec.has_body());

    spec.json_body(&serde_json::json!({"name": "a"}), "application/json").unwrap();
    assert!(spec.has_body());
  }

  #[test]
  fn test_skip_auth() {
    let mut spec = RequestSpec::new(Method::DELETE, "/session");
    assert!(spec.authenticates());
    spec.skip_auth();
    assert!(!spec.authenticates());
  }
}
