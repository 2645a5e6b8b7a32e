use mediatype::MediaType;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::ApiError;

/// Encodes request bodies and decodes response bodies for a content type.
///
/// The default is [`JsonSerializer`]. Substituting another implementation lets
/// a client speak a different structured format without touching the
/// generated code.
pub trait ContentSerializer: Send + Sync + std::fmt::Debug {
  fn serialize(&self, value: &Value, content_type: &str) -> Result<Vec<u8>, ApiError>;

  fn deserialize(&self, bytes: &[u8], content_type: &str) -> Result<Value, ApiError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl ContentSerializer for JsonSerializer {
  fn serialize(&self, value: &Value, content_type: &str) -> Result<Vec<u8>, ApiError> {
    if !is_json_content_type(content_type) {
      return Err(ApiError::invalid_request(format!(
        "cannot encode a structured body as `{content_type}`"
      )));
    }
    serde_json::to_vec(value).map_err(ApiError::Serialize)
  }

  fn deserialize(&self, bytes: &[u8], _content_type: &str) -> Result<Value, ApiError> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|err| ApiError::Deserialize {
      path: err.path().to_string(),
      source: err.into_inner(),
    })
  }
}

pub(crate) fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<Value, ApiError> {
  serde_json::to_value(value).map_err(ApiError::Serialize)
}

/// Converts a decoded document into the caller's type, reporting the JSON path
/// of the first mismatch.
pub(crate) fn from_value<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
  serde_path_to_error::deserialize(value).map_err(|err| ApiError::Deserialize {
    path: err.path().to_string(),
    source: err.into_inner(),
  })
}

/// `application/json`, `text/json` and any `+json` suffix. Parameters such as
/// `charset` are ignored.
#[must_use]
pub fn is_json_content_type(content_type: &str) -> bool {
  let lowered = content_type.trim().to_ascii_lowercase();
  let Ok(media) = MediaType::parse(&lowered) else {
    return false;
  };
  let suffix = media.suffix.as_ref().map(mediatype::Name::as_str);
  matches!(
    (media.ty.as_str(), media.subty.as_str(), suffix),
    ("application" | "text", "json", _) | (_, _, Some("json"))
  )
}
