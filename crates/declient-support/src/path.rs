use std::fmt::Display;

use crate::{ApiError, encoding::percent_encode_path_segment};

/// Renders one path placeholder value as an encoded path segment.
#[must_use]
pub fn path_param<T: Display + ?Sized>(value: &T) -> String {
  percent_encode_path_segment(&value.to_string())
}

/// Like [`path_param`] for an optional value.
///
/// # Errors
///
/// Returns [`ApiError::NullPathParameter`] when `value` is `None`.
pub fn path_param_opt<T: Display>(name: &str, value: Option<T>) -> Result<String, ApiError> {
  value
    .map(|value| path_param(&value))
    .ok_or_else(|| ApiError::NullPathParameter { name: name.to_string() })
}
